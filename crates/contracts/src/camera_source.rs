//! Simulator-side sensor abstraction
//!
//! A rig is one parent sensor owning N cameras. The parent carries the
//! activity flag the simulator uses to decide whether to update the sensor
//! at all, and the update time shared by every camera rendered in one cycle.
//! Each camera carries its own enable flag (the shutter trigger), its own
//! render time, and one frame-ready callback slot.

use std::sync::Arc;

use crate::{PixelFormat, RawFrame, SimTime};

/// Largest frame buffer a camera may produce (1 GiB)
pub const MAX_FRAME_BYTES: usize = 1 << 30;

/// Frame-ready callback type
///
/// Invoked from the simulator's per-camera update thread.
pub type FrameCallback = Arc<dyn Fn(RawFrame) + Send + Sync>;

/// Image geometry a camera was configured with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel
    pub depth: u32,
    pub format: PixelFormat,
}

impl ImageGeometry {
    /// Row stride in bytes, `None` if it does not fit a `u32`
    pub fn step(&self) -> Option<u32> {
        self.width.checked_mul(self.depth)
    }

    /// Frame buffer size in bytes.
    ///
    /// `None` on overflow or past `MAX_FRAME_BYTES`.
    pub fn frame_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.depth as usize)
            .filter(|&len| len <= MAX_FRAME_BYTES)
    }
}

/// A single camera inside a rig
pub trait CameraSource: Send + Sync {
    /// Camera name as declared in the simulator
    fn name(&self) -> &str;

    fn geometry(&self) -> ImageGeometry;

    /// Simulation time of this camera's last render
    fn last_update_time(&self) -> SimTime;

    /// Enable or disable frame production (the trigger gate)
    fn set_enabled(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Register the frame-ready callback
    ///
    /// A camera holds one callback; registering again replaces it.
    fn connect_new_frame(&self, callback: FrameCallback);

    /// Remove the frame-ready callback. Idempotent.
    fn disconnect_new_frame(&self);
}

/// Parent sensor grouping the cameras of one rig
pub trait RigSensor: Send + Sync {
    fn name(&self) -> &str;

    /// Cameras in declaration order
    fn cameras(&self) -> Vec<Arc<dyn CameraSource>>;

    fn is_active(&self) -> bool;

    fn set_active(&self, active: bool);

    /// Simulation time of the rig's last update cycle
    ///
    /// Every camera rendered in one cycle sees the same value.
    fn last_update_time(&self) -> SimTime;
}
