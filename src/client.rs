use std::{future::Future, pin::Pin};

use rspotify::{prelude::OAuthClient, AuthCodePkceSpotify};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    model::Artist,
};

/// Largest page the followed-artists endpoint hands out
pub const MAX_PAGE_SIZE: u32 = 50;

/// Anything that can list the artists a user follows
pub trait ArtistSource {
    fn followed_artists<'a>(
        &'a self,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Artist>>> + Send + 'a>>;
}

// Reads the followed artists of an authorized account
pub struct SpotifyLibrary {
    client: AuthCodePkceSpotify,
}

impl SpotifyLibrary {
    pub fn new(client: AuthCodePkceSpotify) -> Self {
        Self { client }
    }
}

impl ArtistSource for SpotifyLibrary {
    /// Fetch a single page of followed artists, in the order the API returns them
    fn followed_artists<'a>(
        &'a self,
        limit: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Artist>>> + Send + 'a>> {
        Box::pin(async move {
            let limit = limit.clamp(1, MAX_PAGE_SIZE);

            let page = self
                .client
                .current_user_followed_artists(None, Some(limit))
                .await
                .map_err(Error::Retrieval)?;

            info!(
                fetched = page.items.len(),
                total = ?page.total,
                "Fetched followed artists"
            );

            let artists: Vec<Artist> = page.items.into_iter().map(Artist::from).collect();

            for artist in &artists {
                debug!(name = %artist.name, followers = artist.followers, "Followed artist");
            }

            Ok(artists)
        })
    }
}
