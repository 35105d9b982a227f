use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Spotify authorization failed")]
    Auth(#[source] anyhow::Error),

    #[error("Failed fetching followed artists")]
    Retrieval(#[source] rspotify::ClientError),

    #[error("Input was closed before the ranking finished")]
    InputClosed,

    #[error("Failed talking to the terminal")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code reported to the shell for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Auth(_) | Error::Retrieval(_) => 2,
            Error::InputClosed => 3,
            Error::Io(_) => 1,
        }
    }
}
