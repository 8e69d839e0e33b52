//! Game session subsystem.
//!
//! # Data Flow
//! ```text
//! ServerLocator → ServerDescriptor
//!     → GameClient::attach(transport, server, UserSession)
//!     → answer / undo_answer / exclusion / guess / search_character / hall_of_fame
//!         → urls.rs builds the endpoint URL from the session fields
//!         → Transport::get
//!         → response.rs checks the {completion, parameters} envelope
//!         → session step propagates from the response
//! ```
//!
//! # Design Decisions
//! - The client attaches to an existing session; it never scrapes tokens
//! - Only envelope and the fields needed for questions or guesses are modeled
//! - UserSession is serializable so a game can be resumed later
//! - The hall of fame is an XML document outside the JSON envelope

pub mod client;
pub mod error;
pub mod response;
pub mod session;
pub mod types;
pub mod urls;

pub use client::GameClient;
pub use error::GameError;
pub use session::UserSession;
pub use types::{AnswerOption, Guess, HallOfFameEntry, Question};
