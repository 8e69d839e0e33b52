//! Selection criteria.

use crate::server::{Language, ServerDescriptor, ServerType};

/// Criteria a descriptor must satisfy. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
    pub language: Option<Language>,
    pub server_type: Option<ServerType>,
    pub base_id: Option<String>,
}

impl ServerQuery {
    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }

    pub fn base(base_id: impl Into<String>) -> Self {
        Self {
            base_id: Some(base_id.into()),
            ..Self::default()
        }
    }

    pub fn with_server_type(mut self, server_type: ServerType) -> Self {
        self.server_type = Some(server_type);
        self
    }

    pub fn matches(&self, server: &ServerDescriptor) -> bool {
        self.language.map_or(true, |l| l == server.language)
            && self.server_type.map_or(true, |t| t == server.server_type)
            && self.base_id.as_deref().map_or(true, |b| b == server.base_id)
    }
}
