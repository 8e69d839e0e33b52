//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! Directory fetch / health probe / game request
//!     → Transport::get(url, cancel)
//!         - http.rs  (reqwest client, races the cancellation token)
//!         - timed.rs (optional decorator: duration logging + metrics)
//!     → HttpResponse { status, body } or TransportError
//! ```
//!
//! # Design Decisions
//! - Only GET is needed by the remote service
//! - Non-200 statuses are responses, not errors; callers decide
//! - Cancellation is a distinct error so callers never confuse it with failure

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod http;
#[cfg(test)]
pub mod mock;
pub mod timed;

pub use http::ReqwestTransport;
pub use timed::TimedTransport;

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for `200 OK` only.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Errors raised by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The caller's cancellation token fired before the request completed.
    #[error("request cancelled")]
    Cancelled,

    /// Connection, protocol or body read failure.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The configured request deadline elapsed.
    #[error("request to {url} timed out")]
    Timeout { url: String },
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// Asynchronous HTTP GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, cancel: &CancellationToken)
        -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, TransportError> {
        (**self).get(url, cancel).await
    }
}
