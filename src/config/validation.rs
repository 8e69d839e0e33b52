//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for values serde cannot reject.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.discovery.url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "discovery.url",
            format!("unsupported scheme `{}`", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("discovery.url", e.to_string())),
    }

    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::new("health_check.path", "must start with `/`"));
    }

    let timeouts = [
        ("discovery.timeout_secs", config.discovery.timeout_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("transport.connect_timeout_secs", config.transport.connect_timeout_secs),
        ("transport.request_timeout_secs", config.transport.request_timeout_secs),
    ];
    for (field, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if config.transport.user_agent.trim().is_empty() {
        errors.push(ValidationError::new("transport.user_agent", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
