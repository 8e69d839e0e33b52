//! Discovery error definitions.

use thiserror::Error;

use crate::server::UnknownCode;
use crate::transport::TransportError;

/// Errors surfaced by server discovery and selection.
///
/// `Clone` so that one failed directory fetch can be reported to every caller
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The caller's cancellation token fired.
    #[error("server discovery cancelled")]
    Cancelled,

    /// The directory request could not be completed.
    #[error("directory request failed: {0}")]
    Transport(TransportError),

    /// The directory endpoint answered with a non-OK status.
    #[error("directory request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The directory document could not be parsed.
    #[error("malformed directory document: {0}")]
    Malformed(String),

    /// The directory names a language or subject this build does not know.
    #[error("directory contains an {0}")]
    UnsupportedCode(#[from] UnknownCode),
}

impl DiscoveryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DiscoveryError::Cancelled)
    }
}

impl From<TransportError> for DiscoveryError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Cancelled => DiscoveryError::Cancelled,
            other => DiscoveryError::Transport(other),
        }
    }
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
