//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Locator, prober, directory fetch, transport produce:
//!     → tracing events (structured fields)
//!     → metrics.rs (counters, gauges, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the binary
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - Metric updates are no-ops until a recorder exists

pub mod logging;
pub mod metrics;
