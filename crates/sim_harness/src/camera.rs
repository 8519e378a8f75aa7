//! Mock camera
//!
//! Implements `CameraSource`. Like the simulator, a disabled camera is not
//! rendered at all: `render` neither advances its update time nor delivers
//! a frame.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use contracts::{CameraSource, FrameCallback, ImageGeometry, PixelFormat, RawFrame, SimTime};
use tracing::{trace, warn};

#[derive(Default)]
struct CameraState {
    last_update_time: SimTime,
    callback: Option<FrameCallback>,
}

/// Mock camera
pub struct MockCamera {
    name: String,
    geometry: ImageGeometry,
    enabled: AtomicBool,
    state: Mutex<CameraState>,
    frames_rendered: AtomicU64,
}

impl MockCamera {
    pub fn new(name: impl Into<String>, width: u32, height: u32, format: PixelFormat) -> Self {
        let depth = format.depth();
        Self {
            name: name.into(),
            geometry: ImageGeometry {
                width,
                height,
                depth,
                format,
            },
            enabled: AtomicBool::new(false),
            state: Mutex::new(CameraState::default()),
            frames_rendered: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CameraState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Render one frame at `sim_time`.
    ///
    /// Returns `false` if the camera is disabled, nothing is attached, or
    /// the geometry is too large to allocate a frame for.
    pub fn render(&self, sim_time: SimTime) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let callback = {
            let mut state = self.lock();
            state.last_update_time = sim_time;
            state.callback.clone()
        };
        let Some(callback) = callback else {
            return false;
        };

        let counter = self.frames_rendered() + 1;
        let Some(frame) = self.make_frame(counter) else {
            warn!(
                camera = %self.name,
                width = self.geometry.width,
                height = self.geometry.height,
                "frame exceeds buffer limit, not rendered"
            );
            return false;
        };
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);

        // callback runs outside the lock; it may call back into set_enabled
        callback(frame);
        trace!(camera = %self.name, sim_time, frame = counter, "frame rendered");
        true
    }

    /// Hand a frame to the callback, bypassing the enable gate
    pub fn deliver(&self, frame: RawFrame) -> bool {
        let callback = self.lock().callback.clone();
        match callback {
            Some(callback) => {
                callback(frame);
                true
            }
            None => false,
        }
    }

    /// Force the update time without rendering
    pub fn set_last_update_time(&self, sim_time: SimTime) {
        self.lock().last_update_time = sim_time;
    }

    pub fn has_callback(&self) -> bool {
        self.lock().callback.is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered.load(Ordering::Relaxed)
    }

    /// A frame filled with a value derived from `counter`.
    ///
    /// `None` if the geometry has no valid buffer size.
    pub fn make_frame(&self, counter: u64) -> Option<RawFrame> {
        let g = &self.geometry;
        let len = g.frame_len()?;
        Some(RawFrame {
            data: Bytes::from(vec![(counter % 251) as u8; len]),
            width: g.width,
            height: g.height,
            depth: g.depth,
            format: g.format.clone(),
        })
    }
}

impl CameraSource for MockCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn geometry(&self) -> ImageGeometry {
        self.geometry.clone()
    }

    fn last_update_time(&self) -> SimTime {
        self.lock().last_update_time
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn connect_new_frame(&self, callback: FrameCallback) {
        self.lock().callback = Some(callback);
    }

    fn disconnect_new_frame(&self) {
        self.lock().callback = None;
    }
}

impl std::fmt::Debug for MockCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCamera")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
