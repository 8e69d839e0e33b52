//! Akinator game client library

pub mod config;
pub mod discovery;
pub mod game;
pub mod health;
pub mod locator;
pub mod observability;
pub mod server;
pub mod transport;

pub use config::schema::ClientConfig;
pub use discovery::DiscoveryError;
pub use game::{GameClient, GameError, UserSession};
pub use locator::{ServerLocator, ServerQuery};
pub use server::{Language, ServerDescriptor, ServerType};
pub use transport::{HttpResponse, ReqwestTransport, TimedTransport, Transport, TransportError};
