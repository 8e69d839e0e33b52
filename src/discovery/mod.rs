//! Server discovery subsystem.
//!
//! # Data Flow
//! ```text
//! First search on a locator:
//!     → cache.rs ensure_populated (single lock, double-checked)
//!     → directory.rs fetch: GET discovery endpoint → XML → ServerDescriptors
//!     → cache.rs stores one entry per descriptor, keyed by discovery order
//!
//! Later searches:
//!     → cache.rs snapshot (filtered, discovery order)
//!     → locator marks entries healthy or evicts them
//! ```
//!
//! # Design Decisions
//! - The directory is fetched once per locator; failures are not cached
//! - Unknown language or subject codes fail the whole fetch
//! - Cache entries never leave the crate

pub(crate) mod cache;
pub mod directory;
pub mod error;

pub use directory::{parse_directory, DirectoryFetcher};
pub use error::DiscoveryError;
