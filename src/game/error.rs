//! Game client error definitions.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while playing a game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The caller's cancellation token fired.
    #[error("game request cancelled")]
    Cancelled,

    /// The request could not be completed.
    #[error(transparent)]
    Transport(TransportError),

    /// The endpoint URL could not be built.
    #[error("invalid game URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a non-OK HTTP status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The server reported that the session timed out.
    #[error("session timed out at {url}")]
    Timeout { url: String, response: String },

    /// The server reported a non-OK completion.
    #[error("{description} at {url}")]
    Api {
        url: String,
        response: String,
        description: String,
    },

    /// The response body was not the expected JSON.
    #[error("undecodable response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl GameError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GameError::Cancelled)
    }
}

impl From<TransportError> for GameError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Cancelled => GameError::Cancelled,
            other => GameError::Transport(other),
        }
    }
}

impl From<url::ParseError> for GameError {
    fn from(e: url::ParseError) -> Self {
        GameError::InvalidUrl(e.to_string())
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
