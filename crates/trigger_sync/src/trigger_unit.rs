//! Per-camera trigger state machine.
//!
//! ```text
//!            trigger()                 frame
//! Disarmed ───────────► Armed ─────────────────► Capturing
//!    ▲                   ▲                           │
//!    │                   └── trigger() during ───────┤
//!    │                       capture                 │
//!    └───────────────────────────────────────────────┘
//!                        publish done
//! ```
//!
//! A frame that arrives while the unit is not armed is ignored. A triggered
//! camera never re-arms itself; only `trigger()` does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    CameraId, CameraInfoMessage, CameraRole, CameraSource, FramePublisher, Header,
    ImageGeometry, ImageMessage, RawFrame, RigParams, RigSensor, SimClock, SimTime,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::sync_state::SyncState;

/// Trigger state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    /// Next rendered frame will be published
    Armed,
    /// A frame is being published right now
    Capturing,
    /// Waiting for an external trigger
    Disarmed,
}

/// What a unit did with a delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Published,
    /// Unit was not armed; nothing was published
    Ignored,
}

/// Topics and frame id a unit publishes under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicBinding {
    pub image_topic: String,
    pub camera_info_topic: String,
    pub frame_id: String,
}

impl TopicBinding {
    /// Resolve topics for a role. Unclassified cameras get no suffix.
    pub fn resolve(params: &RigParams, role: Option<CameraRole>) -> Self {
        let suffix = role.map(CameraRole::suffix).unwrap_or("");
        let namespace = format!("{}{}", params.camera_name, suffix);
        Self {
            image_topic: format!("{}/{}", namespace, params.image_topic_name),
            camera_info_topic: format!("{}/{}", namespace, params.camera_info_topic_name),
            frame_id: format!("{}{}", params.frame_name, suffix),
        }
    }
}

/// Handles shared by every unit of a rig
#[derive(Clone)]
pub struct UnitContext {
    pub sync: Arc<SyncState>,
    pub parent: Arc<dyn RigSensor>,
    pub clock: Arc<dyn SimClock>,
    pub publisher: Arc<dyn FramePublisher>,
}

#[derive(Debug)]
struct UnitState {
    trigger: TriggerState,
    rearm_pending: bool,
    last_update_time: SimTime,
    sensor_update_time: SimTime,
    seq: u64,
}

/// Diagnostic view of a unit
#[derive(Debug, Clone, Serialize)]
pub struct UnitSnapshot {
    pub camera: String,
    pub role: Option<CameraRole>,
    pub baseline: f64,
    pub state: TriggerState,
    pub last_update_time: SimTime,
    pub sensor_update_time: SimTime,
    pub frames_published: u64,
    pub frames_ignored: u64,
    pub binding: TopicBinding,
}

/// Trigger unit for one camera
pub struct TriggerUnit {
    id: CameraId,
    camera: Arc<dyn CameraSource>,
    role: Option<CameraRole>,
    baseline: f64,
    geometry: ImageGeometry,
    binding: TopicBinding,
    ctx: UnitContext,
    state: Mutex<UnitState>,
    frames_published: AtomicU64,
    frames_ignored: AtomicU64,
}

impl TriggerUnit {
    /// Load a unit for `camera`.
    ///
    /// Every unit goes through this one constructor; the role only selects
    /// the baseline and topic suffix. Units start armed with the camera
    /// enabled, so the first rendered frame is published.
    pub fn load(
        camera: Arc<dyn CameraSource>,
        role: Option<CameraRole>,
        baseline: f64,
        params: &RigParams,
        ctx: UnitContext,
    ) -> Self {
        let id = CameraId::from(camera.name());
        let geometry = camera.geometry();
        let binding = TopicBinding::resolve(params, role);

        camera.set_enabled(true);

        Self {
            id,
            camera,
            role,
            baseline,
            geometry,
            binding,
            ctx,
            state: Mutex::new(UnitState {
                trigger: TriggerState::Armed,
                rearm_pending: false,
                last_update_time: 0.0,
                sensor_update_time: 0.0,
                seq: 0,
            }),
            frames_published: AtomicU64::new(0),
            frames_ignored: AtomicU64::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, UnitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frame-ready handler.
    ///
    /// Runs on the camera's update thread and returns once the frame and
    /// its camera info have been handed to the publisher.
    pub fn on_new_frame(&self, frame: RawFrame) -> FrameOutcome {
        let seq = {
            let mut state = self.lock_state();
            if state.trigger != TriggerState::Armed {
                let current = state.trigger;
                drop(state);
                self.frames_ignored.fetch_add(1, Ordering::Relaxed);
                observability::record_frame_ignored(&self.id);
                debug!(camera = %self.id, state = ?current, "frame ignored, unit not armed");
                return FrameOutcome::Ignored;
            }
            state.trigger = TriggerState::Capturing;
            state.seq += 1;
            state.seq
        };

        // Stamp with the parent sensor's update time so both halves of a
        // stereo pair share a stamp regardless of callback timing.
        let sensor_update_time = self.ctx.parent.last_update_time();
        let cur_time = self.ctx.clock.sim_time();

        self.publish_image(frame, seq, sensor_update_time);
        self.publish_camera_info(seq, sensor_update_time);

        let rearmed = {
            let mut state = self.lock_state();
            state.sensor_update_time = sensor_update_time;
            state.last_update_time = cur_time;
            if std::mem::take(&mut state.rearm_pending) {
                state.trigger = TriggerState::Armed;
                true
            } else {
                state.trigger = TriggerState::Disarmed;
                self.camera.set_enabled(false);
                false
            }
        };

        self.frames_published.fetch_add(1, Ordering::Relaxed);
        observability::record_frame_published(&self.id, role_label(self.role));
        observability::record_capture_skew_ms(&self.id, (cur_time - sensor_update_time) * 1000.0);
        trace!(
            camera = %self.id,
            seq,
            stamp = sensor_update_time,
            sim_time = cur_time,
            rearmed,
            "frame published"
        );

        FrameOutcome::Published
    }

    fn publish_image(&self, frame: RawFrame, seq: u64, stamp: SimTime) {
        let image = ImageMessage {
            header: Header {
                seq,
                stamp,
                frame_id: self.binding.frame_id.clone(),
            },
            topic: self.binding.image_topic.clone(),
            camera: self.id.clone(),
            role: self.role,
            width: frame.width,
            height: frame.height,
            encoding: frame.format.encoding(),
            step: frame.step(),
            data: frame.data,
        };
        self.ctx.publisher.publish_image(image);
    }

    fn publish_camera_info(&self, seq: u64, stamp: SimTime) {
        let info = CameraInfoMessage {
            header: Header {
                seq,
                stamp,
                frame_id: self.binding.frame_id.clone(),
            },
            topic: self.binding.camera_info_topic.clone(),
            camera: self.id.clone(),
            role: self.role,
            width: self.geometry.width,
            height: self.geometry.height,
            baseline: self.baseline,
        };
        self.ctx.publisher.publish_camera_info(info);
    }

    /// External re-arm.
    ///
    /// Returns `true` if the unit was disarmed or mid-capture (the re-arm
    /// then applies once the frame in flight completes), `false` if it was
    /// already armed.
    pub fn trigger(&self) -> bool {
        let mut state = self.lock_state();
        let armed = match state.trigger {
            TriggerState::Disarmed => {
                state.trigger = TriggerState::Armed;
                self.camera.set_enabled(true);
                true
            }
            TriggerState::Capturing => {
                state.rearm_pending = true;
                true
            }
            TriggerState::Armed => false,
        };
        drop(state);

        if armed {
            observability::record_trigger(&self.id);
        }
        armed
    }

    /// A subscriber connected to this camera's topics
    pub fn subscriber_connected(&self) -> u32 {
        self.ctx.sync.connect(self.ctx.parent.as_ref())
    }

    /// A subscriber disconnected from this camera's topics
    pub fn subscriber_disconnected(&self) -> u32 {
        self.ctx.sync.disconnect(self.ctx.parent.as_ref())
    }

    /// Detach the frame-ready callback from the camera
    pub fn detach(&self) {
        self.camera.disconnect_new_frame();
    }

    pub fn name(&self) -> &str {
        &self.id
    }

    pub fn camera_id(&self) -> &CameraId {
        &self.id
    }

    pub fn role(&self) -> Option<CameraRole> {
        self.role
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn binding(&self) -> &TopicBinding {
        &self.binding
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn state(&self) -> TriggerState {
        self.lock_state().trigger
    }

    /// Whether the next frame will be published
    pub fn is_enabled(&self) -> bool {
        self.state() == TriggerState::Armed
    }

    /// Simulation time captured when the last frame was handled
    pub fn last_update_time(&self) -> SimTime {
        self.lock_state().last_update_time
    }

    /// Camera update time the last frame was stamped with
    pub fn sensor_update_time(&self) -> SimTime {
        self.lock_state().sensor_update_time
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published.load(Ordering::Relaxed)
    }

    pub fn frames_ignored(&self) -> u64 {
        self.frames_ignored.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        let state = self.lock_state();
        UnitSnapshot {
            camera: self.id.to_string(),
            role: self.role,
            baseline: self.baseline,
            state: state.trigger,
            last_update_time: state.last_update_time,
            sensor_update_time: state.sensor_update_time,
            frames_published: self.frames_published(),
            frames_ignored: self.frames_ignored(),
            binding: self.binding.clone(),
        }
    }
}

impl std::fmt::Debug for TriggerUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerUnit")
            .field("camera", &self.id)
            .field("role", &self.role)
            .field("baseline", &self.baseline)
            .field("state", &self.state())
            .finish()
    }
}

pub(crate) fn role_label(role: Option<CameraRole>) -> &'static str {
    role.map(CameraRole::as_str).unwrap_or("none")
}
