//! Error taxonomy shared by the queue controller, the like reconciler and the
//! external collaborators.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Catalog search failed upstream or returned a non-success response.
    #[error("search failed: {message}")]
    SearchFailed { message: String },

    /// A liked-songs store call failed.
    #[error("liked store unavailable: {message}")]
    StoreUnavailable { message: String },

    /// A player command was issued before the player handle was attached.
    #[error("player is not ready")]
    PlayerNotReady,

    #[error("index {index} is out of range for a queue of {len} tracks")]
    OutOfRange { index: usize, len: usize },

    /// There is no queue or no current track to act on.
    #[error("nothing to play")]
    NotReady,

    #[error("cannot seek to {target}s in a track of {duration}s")]
    InvalidSeek { target: f64, duration: f64 },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn search(message: impl Into<String>) -> Self {
        Self::SearchFailed { message: message.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
