//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Locator walks candidates
//!     → probe.rs: GET {server_url}/answer
//!     → 200 → state.rs: Unknown → Healthy
//!     → anything else → state.rs: Unhealthy, entry evicted from cache
//! ```
//!
//! # Design Decisions
//! - One probe decides; there are no thresholds and no re-probation
//! - Probe failures are never errors, only cancellation propagates
//! - Health state is per descriptor, not per base

pub mod probe;
pub mod state;

pub use probe::HealthProber;
pub use state::{AtomicHealth, HealthState};
