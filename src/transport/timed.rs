//! Timing decorator for any transport.

use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::observability::metrics;
use crate::transport::{HttpResponse, Transport, TransportError};

/// Logs and records the duration of every request made through `inner`.
#[derive(Debug, Clone)]
pub struct TimedTransport<T> {
    inner: T,
}

impl<T> TimedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for TimedTransport<T> {
    async fn get(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, TransportError> {
        let start = Instant::now();
        let result = self.inner.get(url, cancel).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    url = %url,
                    status = response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request completed"
                );
                metrics::record_request(response.status, elapsed);
            }
            Err(e) => {
                tracing::info!(
                    url = %url,
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request failed"
                );
                metrics::record_request(0, elapsed);
            }
        }

        result
    }
}
