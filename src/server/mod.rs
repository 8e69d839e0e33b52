//! Game server model.
//!
//! # Data Flow
//! ```text
//! Directory document (discovery/directory.rs)
//!     → codes resolved to Language / ServerType (types.rs)
//!     → ServerDescriptor per primary and mirror URL
//!     → cached and selected by the locator
//!     → handed to the game client
//! ```
//!
//! # Design Decisions
//! - Language and ServerType are closed vocabularies fixed at build time
//! - Descriptors are immutable values; health lives in the cache entry

pub mod types;

pub use types::{Language, ServerDescriptor, ServerType, UnknownCode};
