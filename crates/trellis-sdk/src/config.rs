//! SDK Configuration
//!
//! Defines configuration options for Trellis containers.

use serde::{Deserialize, Serialize};

/// Maximum length of a container name.
const MAX_NAME_LEN: usize = 64;

/// Container configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container name; also names the container's execution context
    pub name: String,

    /// Log a warning when two hosted extensions share a kind (default: false)
    pub warn_on_duplicate_kinds: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            warn_on_duplicate_kinds: false,
        }
    }
}

impl ContainerConfig {
    /// Create a new container config with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Enable warnings for duplicate extension kinds
    pub fn with_duplicate_kind_warnings(mut self) -> Self {
        self.warn_on_duplicate_kinds = true;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.name.is_empty() {
            return Err(ConfigValidationError::MissingName);
        }

        if self.name.len() > MAX_NAME_LEN {
            return Err(ConfigValidationError::InvalidValue {
                field: "name".into(),
                message: format!("must be at most {MAX_NAME_LEN} characters"),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("name is required")]
    MissingName,

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
