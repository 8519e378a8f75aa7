//! Trigger sync error types

use thiserror::Error;

/// Rig errors
#[derive(Debug, Error)]
pub enum RigError {
    /// The messaging runtime was not initialized before load
    #[error("messaging runtime not initialized, unable to load rig '{rig}'")]
    RuntimeNotInitialized { rig: String },

    /// No camera with that name in the rig
    #[error("rig '{rig}' has no camera named '{camera}'")]
    UnknownCamera { rig: String, camera: String },
}

/// Result alias
pub type Result<T> = std::result::Result<T, RigError>;
