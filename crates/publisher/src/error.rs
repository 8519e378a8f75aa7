//! Publisher error types

use thiserror::Error;

/// Publisher-specific errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Publisher creation error
    #[error("failed to create publisher '{name}': {message}")]
    PublisherCreation { name: String, message: String },

    /// Contract-level error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl PublishError {
    pub fn publisher_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublisherCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, PublishError>;
