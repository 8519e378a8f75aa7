//! Sim harness error types

use thiserror::Error;

/// Harness construction errors
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Two cameras with the same name
    #[error("duplicate camera name '{name}'")]
    DuplicateCamera { name: String },

    /// Zero width or height, or a frame too large to allocate
    #[error("camera '{camera}' has invalid geometry {width}x{height}")]
    InvalidGeometry {
        camera: String,
        width: u32,
        height: u32,
    },

    /// Step or render period not representable as a positive duration
    #[error("simulation timing {field} = {value} is out of range")]
    InvalidTiming { field: &'static str, value: f64 },

    /// Failed to start a background thread
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, HarnessError>;
