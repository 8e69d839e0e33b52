//! Liveness probe against a single game server.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::HealthCheckConfig;
use crate::observability::metrics;
use crate::transport::{Transport, TransportError};

pub struct HealthProber {
    transport: Arc<dyn Transport>,
    path: String,
    timeout: Duration,
}

impl HealthProber {
    pub fn new(transport: Arc<dyn Transport>, config: &HealthCheckConfig) -> Self {
        Self {
            transport,
            path: config.path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// URL probed for `server_url`.
    pub fn probe_url(&self, server_url: &str) -> String {
        format!("{}{}", server_url.trim_end_matches('/'), self.path)
    }

    /// Probe `server_url`.
    ///
    /// `Ok(true)` iff the server answered `200 OK` within the probe timeout.
    /// The only error is [`TransportError::Cancelled`].
    pub async fn probe(
        &self,
        server_url: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let url = self.probe_url(server_url);
        let healthy = match time::timeout(self.timeout, self.transport.get(&url, cancel)).await {
            Ok(Ok(response)) => {
                let success = response.is_ok();
                if !success {
                    tracing::warn!(url = %url, status = response.status, "Health check failed: non-OK status");
                }
                success
            }
            Ok(Err(TransportError::Cancelled)) => return Err(TransportError::Cancelled),
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "Health check failed: transport error");
                false
            }
            Err(_) => {
                tracing::warn!(url = %url, "Health check failed: timeout");
                false
            }
        };

        metrics::record_probe(healthy);
        Ok(healthy)
    }
}
