use anyhow::{anyhow, Context, Result};
use const_format::concatcp;
use core::str;
use rspotify::{
    prelude::{BaseClient, OAuthClient},
    scopes, AuthCodePkceSpotify, Config, Credentials, OAuth,
};
use std::collections::HashSet;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use tracing::{debug, info, warn};

use crate::{
    client::SpotifyLibrary,
    config::{self, ClientCredentials},
    ui,
};

const CALLBACK_SERVER_PORT: u16 = 8888;
const CALLBACK_URI: &str = concatcp!("http://127.0.0.1:", CALLBACK_SERVER_PORT, "/callback");

const CALLBACK_PAGE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
    <body style='font-family: sans-serif; display: flex; align-items: center; height: 100vh;'>\
    <h1 style='margin: auto;'>All set, head back to the terminal to start ranking.</h1>\
    </body>";

/// Reading the follow list is all we ever do
///
/// A cached token granted for other scopes is ignored, which sends the user through the flow again
fn scopes() -> HashSet<String> {
    scopes!("user-follow-read")
}

/// Redirect and scopes shared by cached and fresh authorizations
fn oauth() -> OAuth {
    OAuth {
        redirect_uri: CALLBACK_URI.to_string(),
        scopes: scopes(),
        ..Default::default()
    }
}

/// Cache tokens in the data dir and let rspotify refresh them
fn config() -> Config {
    Config {
        token_cached: true,
        token_refreshing: true,
        cache_path: config::tokens_path(),
        ..Default::default()
    }
}

/// Client id to use for this run
///
/// The environment wins over the saved credentials, so a different app can be used without
/// re-authorizing from scratch.
fn client_id() -> Result<Option<String>> {
    if let Some(id) = config::env_client_id() {
        debug!("Using client id from {}", config::CLIENT_ID_ENV);
        return Ok(Some(id));
    }

    Ok(config::load_credentials()?.map(|creds| creds.client_id))
}

/// Authorize from cache if possible, otherwise run the full flow
pub async fn authorize() -> Result<SpotifyLibrary> {
    match load_cached().await? {
        Some(library) => Ok(library),
        None => run_flow().await,
    }
}

/// Build a library from the cached token, refreshing it when it expired
///
/// Ok(None) means a fresh authorization is needed:
/// - There is no client id or no cached token
/// - The cached token was granted for different scopes
///
/// Err means a token is cached but unreadable, or refreshing it failed
pub async fn load_cached() -> Result<Option<SpotifyLibrary>> {
    if !config::tokens_path().exists() {
        return Ok(None);
    }

    let Some(client_id) = client_id()? else {
        return Ok(None);
    };

    let spotify =
        AuthCodePkceSpotify::with_config(Credentials::new_pkce(&client_id), oauth(), config());

    match spotify.read_token_cache(true).await {
        Ok(Some(token)) => {
            let expired = token.is_expired();

            *spotify
                .token
                .lock()
                .await
                .map_err(|_| anyhow!("Failed locking the token"))? = Some(token);

            if expired {
                info!("Cached token expired, refreshing");
                spotify
                    .refresh_token()
                    .await
                    .context("Failed to refresh token")?;
            }

            Ok(Some(SpotifyLibrary::new(spotify)))
        }
        Ok(None) => {
            debug!("No usable cached token");
            Ok(None)
        }
        Err(e) => Err(e).context("Failed reading cached tokens, try re-authorizing"),
    }
}

/// Authorize from scratch, asking for a client id unless the environment has one
pub async fn run_flow() -> Result<SpotifyLibrary> {
    let client_id = match config::env_client_id() {
        Some(id) => id,
        None => ui::collect_client_id(CALLBACK_URI).context("Failed collecting credentials")?,
    };

    authorize_spotify(Credentials::new_pkce(&client_id), oauth()).await
}

/// PKCE authorization code flow
///
/// The client id is saved up front so a later run can reuse the cached token with it. The
/// code comes from the local callback server, or from a pasted URL if the port is taken.
async fn authorize_spotify(creds: Credentials, oauth: OAuth) -> Result<SpotifyLibrary> {
    config::save_credentials(&ClientCredentials {
        client_id: creds.id.clone(),
    })?;

    let mut spotify = AuthCodePkceSpotify::with_config(creds, oauth, config());

    let authorize_url = spotify
        .get_authorize_url(None)
        .context("Failed building the authorization URL")?;

    println!("\nOpen this link to let spotirank read who you follow:\n{}\n", authorize_url);
    if let Err(e) = open::that(&authorize_url) {
        debug!("Could not launch a browser: {e}");
        println!("Couldn't open a browser, please open the link yourself.\n");
    }

    let callback_url = match run_callback_server().await {
        Ok(url) => url,
        Err(e) => {
            warn!("Callback server unavailable: {e:#}");
            ui::collect_callback_url().context("Failed reading the callback URL")?
        }
    };

    let code = spotify
        .parse_response_code(&callback_url)
        .context("The callback URL carries no authorization code")?;

    spotify
        .request_token(&code)
        .await
        .context("Failed requesting token")?;
    spotify
        .write_token_cache()
        .await
        .context("Failed caching the token")?;

    println!("Authorized, the token is cached for next time.");

    Ok(SpotifyLibrary::new(spotify))
}

/// Serve exactly one request on the redirect port and hand back the full URL it hit
///
/// The browser gets a short page telling the user to go back to the terminal.
async fn run_callback_server() -> Result<String> {
    let listener = TcpListener::bind(("127.0.0.1", CALLBACK_SERVER_PORT))
        .await
        .context("Failed binding the callback port")?;

    debug!("Waiting for the authorization callback on port {CALLBACK_SERVER_PORT}");

    let (mut socket, peer) = listener
        .accept()
        .await
        .context("Failed accepting the callback connection")?;
    debug!(%peer, "Callback connection accepted");

    // The request line is all we need, it fits easily
    let mut buffer = [0u8; 2048];
    let n = socket
        .read(&mut buffer)
        .await
        .context("Failed reading the callback request")?;

    let request = str::from_utf8(&buffer[..n]).context("Callback request is not UTF-8")?;
    let path = request_path(request).context("Callback request has no request line")?;

    socket
        .write_all(CALLBACK_PAGE)
        .await
        .context("Failed answering the browser")?;

    Ok(format!("http://127.0.0.1:{}{}", CALLBACK_SERVER_PORT, path))
}

/// Path and query of the request line, e.g. "/callback?code=..."
fn request_path(request: &str) -> Option<&str> {
    request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
}
