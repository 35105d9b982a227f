use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, io::ErrorKind, path::PathBuf};
use tracing::debug;

/// Environment variable that overrides the saved client id
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CLIENT_ID";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
}

/// Get the directory where data should be stored
pub fn data_dir() -> PathBuf {
    // Store in conventional place or next to binary
    let mut data_dir = dirs::data_dir().unwrap_or(PathBuf::from("./"));
    data_dir.push("spotirank");
    data_dir
}

/// Get the tokens storage path
pub fn tokens_path() -> PathBuf {
    data_dir().join("tokens.json")
}

/// Get the client credentials storage path
pub fn credentials_path() -> PathBuf {
    data_dir().join("credentials.json")
}

/// Ensure the data directory is created
pub fn ensure_dir() -> Result<()> {
    fs::create_dir_all(data_dir()).context("Failed creating data directory")
}

/// Client id from the environment, if one is set and not blank
pub fn env_client_id() -> Option<String> {
    env::var(CLIENT_ID_ENV)
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Read the saved client credentials
///
/// Returns Ok(None) if nothing was saved yet
pub fn load_credentials() -> Result<Option<ClientCredentials>> {
    let creds_str = match fs::read_to_string(credentials_path()) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).context("Failed reading stored client credentials, try re-authorizing")
        }
    };

    let creds = parse_credentials(&creds_str)?;

    Ok(Some(creds))
}

fn parse_credentials(creds_str: &str) -> Result<ClientCredentials> {
    serde_json::from_str::<ClientCredentials>(creds_str)
        .context("Failed deserializing stored client credentials, try re-authorizing")
}

/// Save the client credentials for future runs
pub fn save_credentials(creds: &ClientCredentials) -> Result<()> {
    ensure_dir()?;

    let creds_str =
        serde_json::to_string(creds).context("Failed serializing client credentials")?;

    fs::write(credentials_path(), creds_str).context("Failed saving client credentials")
}

/// Remove saved credentials and tokens
///
/// Returns whether anything was actually removed
pub fn clear() -> Result<bool> {
    let mut removed = false;

    for path in [tokens_path(), credentials_path()] {
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed saved file");
                removed = true;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed removing {}", path.display()))
            }
        }
    }

    Ok(removed)
}
