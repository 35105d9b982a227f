use std::fmt::{Display, Formatter};

use rspotify::model::FullArtist;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
    pub followers: u32,
}

impl From<FullArtist> for Artist {
    fn from(artist: FullArtist) -> Self {
        Self {
            name: artist.name,
            followers: artist.followers.total,
        }
    }
}

impl Display for Artist {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Which side of a head-to-head the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Option "1", the front of the left half
    Left,
    /// Option "2", the front of the right half
    Right,
}

impl Choice {
    /// Parse a line typed at the comparison prompt
    ///
    /// Only an exact "2" picks the right side. Anything else, including an empty line or
    /// garbage, counts as "1". The line terminator is stripped, nothing else is.
    pub fn from_response(line: &str) -> Self {
        match line.trim_end_matches(['\n', '\r']) {
            "2" => Choice::Right,
            _ => Choice::Left,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RankedArtist {
    pub rank: usize,
    pub name: String,
}

impl RankedArtist {
    /// Number a final ordering, starting at 1
    pub fn enumerate(names: Vec<String>) -> Vec<RankedArtist> {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| RankedArtist { rank: i + 1, name })
            .collect()
    }
}
