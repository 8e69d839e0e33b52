//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Server directory published by the game service.
pub const DEFAULT_DISCOVERY_URL: &str =
    "https://global3.akinator.com/ws/instances_v2.php?media_id=14&footprint=cd8e6509f3420878e18d75b9831b317f&mode=https";

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Server directory location.
    pub discovery: DiscoveryConfig,

    /// Liveness probe settings.
    pub health_check: HealthCheckConfig,

    /// HTTP client settings.
    pub transport: TransportConfig,

    /// Logging and timing settings.
    pub observability: ObservabilityConfig,
}

/// Server directory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// URL of the directory document.
    pub url: String,

    /// Deadline for the directory request in seconds.
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DISCOVERY_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path appended to a server URL to probe it.
    pub path: String,

    /// Probe timeout in seconds. A timed out probe counts as unhealthy.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/answer".to_string(),
            timeout_secs: 5,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("akinator-client/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Wrap the transport so every request logs its duration.
    pub timing_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "akinator_client=info".to_string(),
            timing_enabled: false,
        }
    }
}
