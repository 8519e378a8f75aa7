//! Frames in and messages out.
//!
//! `RawFrame` is what a camera hands to its frame-ready callback.
//! `ImageMessage` and `CameraInfoMessage` are what the bridge publishes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CameraId, CameraRole, SimTime};

/// Pixel format tag as reported by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PixelFormat {
    L8,
    L16,
    #[default]
    R8G8B8,
    B8G8R8,
    BayerRggb8,
    BayerBggr8,
    BayerGbrg8,
    BayerGrbg8,
    /// Tag the bridge has no encoding for
    Unknown(String),
}

impl PixelFormat {
    /// Parse a simulator format tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "L8" | "L_INT8" => Self::L8,
            "L16" | "L_INT16" => Self::L16,
            "R8G8B8" | "RGB_INT8" => Self::R8G8B8,
            "B8G8R8" | "BGR_INT8" => Self::B8G8R8,
            "BAYER_RGGB8" => Self::BayerRggb8,
            "BAYER_BGGR8" => Self::BayerBggr8,
            "BAYER_GBRG8" => Self::BayerGbrg8,
            "BAYER_GRBG8" => Self::BayerGrbg8,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Canonical simulator tag
    pub fn as_tag(&self) -> &str {
        match self {
            Self::L8 => "L8",
            Self::L16 => "L16",
            Self::R8G8B8 => "R8G8B8",
            Self::B8G8R8 => "B8G8R8",
            Self::BayerRggb8 => "BAYER_RGGB8",
            Self::BayerBggr8 => "BAYER_BGGR8",
            Self::BayerGbrg8 => "BAYER_GBRG8",
            Self::BayerGrbg8 => "BAYER_GRBG8",
            Self::Unknown(tag) => tag,
        }
    }

    /// Middleware encoding name. Unknown tags fall back to `bgr8`.
    pub fn encoding(&self) -> &'static str {
        match self {
            Self::L8 => "mono8",
            Self::L16 => "mono16",
            Self::R8G8B8 => "rgb8",
            Self::B8G8R8 | Self::Unknown(_) => "bgr8",
            Self::BayerRggb8 => "bayer_rggb8",
            Self::BayerBggr8 => "bayer_bggr8",
            Self::BayerGbrg8 => "bayer_gbrg8",
            Self::BayerGrbg8 => "bayer_grbg8",
        }
    }

    /// Bytes per pixel
    pub fn depth(&self) -> u32 {
        match self {
            Self::L8
            | Self::BayerRggb8
            | Self::BayerBggr8
            | Self::BayerGbrg8
            | Self::BayerGrbg8 => 1,
            Self::L16 => 2,
            Self::R8G8B8 | Self::B8G8R8 | Self::Unknown(_) => 3,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for PixelFormat {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<PixelFormat> for String {
    fn from(format: PixelFormat) -> Self {
        format.as_tag().to_string()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Raw frame delivered by a camera's frame-ready callback
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Pixel buffer (zero-copy)
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel
    pub depth: u32,
    pub format: PixelFormat,
}

impl RawFrame {
    /// Row stride in bytes, saturating at `u32::MAX`
    pub fn step(&self) -> u32 {
        self.width.saturating_mul(self.depth)
    }
}

/// Message header
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Per-camera sequence number, starting at 1
    pub seq: u64,
    /// Simulation time the camera last updated (seconds)
    pub stamp: SimTime,
    pub frame_id: String,
}

/// Image message handed to the publisher
#[derive(Debug, Clone)]
pub struct ImageMessage {
    pub header: Header,
    pub topic: String,
    pub camera: CameraId,
    pub role: Option<CameraRole>,
    pub width: u32,
    pub height: u32,
    pub encoding: &'static str,
    pub step: u32,
    pub data: Bytes,
}

/// Camera info message published alongside every image
#[derive(Debug, Clone)]
pub struct CameraInfoMessage {
    pub header: Header,
    pub topic: String,
    pub camera: CameraId,
    pub role: Option<CameraRole>,
    pub width: u32,
    pub height: u32,
    /// Stereo baseline in meters (0.0 for the reference camera)
    pub baseline: f64,
}
