//! Server location subsystem.
//!
//! # Data Flow
//! ```text
//! search(language, type) / search_language / search_by_base / search_all
//!     → query.rs (criteria)
//!     → discovery cache: ensure populated, snapshot matching entries
//!     → order: known healthy first, then discovery order
//!     → walk: healthy → return | unknown → probe
//!         probe ok   → mark healthy, return
//!         probe fail → evict, next
//!     → None when every candidate failed
//! ```
//!
//! # Design Decisions
//! - One locator owns one cache; no process-wide singleton
//! - No healthy server is `Ok(None)`, never an error
//! - search_all fans out per server type and orders by type, not completion

pub mod query;
pub mod server_locator;

pub use query::ServerQuery;
pub use server_locator::ServerLocator;
