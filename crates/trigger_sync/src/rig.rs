//! Rig 加载与外部控制
//!
//! `RigController::load` 检查中间件运行时、识别相机角色、为每个相机创建
//! `TriggerUnit` 并挂接帧回调。返回的 `Rig` 是所有 unit 的唯一所有者。

use std::sync::{Arc, Weak};

use contracts::{
    CameraRole, FramePublisher, MiddlewareRuntime, RawFrame, RigParams, RigSensor, SimClock,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::classify::{baseline_for, classify};
use crate::error::{Result, RigError};
use crate::sync_state::{SyncSnapshot, SyncState};
use crate::trigger_unit::{role_label, TriggerUnit, UnitContext, UnitSnapshot};

/// 加载 rig 所需的外部句柄
#[derive(Clone)]
pub struct LoadContext {
    pub runtime: Arc<dyn MiddlewareRuntime>,
    pub clock: Arc<dyn SimClock>,
    pub publisher: Arc<dyn FramePublisher>,
}

impl LoadContext {
    pub fn new(
        runtime: Arc<dyn MiddlewareRuntime>,
        clock: Arc<dyn SimClock>,
        publisher: Arc<dyn FramePublisher>,
    ) -> Self {
        Self {
            runtime,
            clock,
            publisher,
        }
    }
}

/// Rig loader
pub struct RigController;

impl RigController {
    /// 加载 rig
    ///
    /// 运行时未初始化时记录 fatal 日志并返回错误，不创建任何 unit，
    /// 也不挂接任何回调。
    #[instrument(
        name = "rig_load",
        skip(sensor, params, ctx),
        fields(rig = %sensor.name(), camera_name = %params.camera_name)
    )]
    pub fn load(sensor: Arc<dyn RigSensor>, params: &RigParams, ctx: &LoadContext) -> Result<Rig> {
        if !ctx.runtime.is_initialized() {
            error!(
                fatal = true,
                rig = %sensor.name(),
                "messaging runtime has not been initialized, unable to load rig"
            );
            return Err(RigError::RuntimeNotInitialized {
                rig: sensor.name().to_string(),
            });
        }

        let cameras = sensor.cameras();
        if cameras.is_empty() {
            warn!(rig = %sensor.name(), "rig has no cameras, nothing will be published");
        }

        let sync = Arc::new(SyncState::new());
        let unit_ctx = UnitContext {
            sync: sync.clone(),
            parent: sensor.clone(),
            clock: ctx.clock.clone(),
            publisher: ctx.publisher.clone(),
        };

        let mut units = Vec::with_capacity(cameras.len());
        for camera in cameras {
            let role = classify(camera.name());
            let baseline = baseline_for(role, params.hack_baseline);

            let geometry = camera.geometry();
            if !geometry.format.is_known() {
                warn!(
                    camera = %camera.name(),
                    format = %geometry.format,
                    "unsupported pixel format, publishing as bgr8"
                );
            }
            if role.is_none() {
                debug!(camera = %camera.name(), "camera matches no role keyword");
            }

            let unit = Arc::new(TriggerUnit::load(
                camera.clone(),
                role,
                baseline,
                params,
                unit_ctx.clone(),
            ));

            let weak: Weak<TriggerUnit> = Arc::downgrade(&unit);
            camera.connect_new_frame(Arc::new(move |frame: RawFrame| {
                if let Some(unit) = weak.upgrade() {
                    unit.on_new_frame(frame);
                }
            }));

            info!(
                camera = %unit.name(),
                role = role_label(role),
                baseline,
                image_topic = %unit.binding().image_topic,
                "trigger unit loaded"
            );
            units.push(unit);
        }

        info!(units = units.len(), "rig loaded");

        Ok(Rig {
            name: sensor.name().to_string(),
            sensor,
            sync,
            units,
        })
    }
}

/// A loaded rig
///
/// Dropping the rig detaches every frame callback.
pub struct Rig {
    name: String,
    sensor: Arc<dyn RigSensor>,
    sync: Arc<SyncState>,
    units: Vec<Arc<TriggerUnit>>,
}

/// Diagnostic view of a rig
#[derive(Debug, Clone, Serialize)]
pub struct RigSnapshot {
    pub name: String,
    pub active: bool,
    pub sync: SyncSnapshot,
    pub units: Vec<UnitSnapshot>,
}

impl Rig {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units in camera declaration order
    pub fn units(&self) -> &[Arc<TriggerUnit>] {
        &self.units
    }

    /// First unit with the given role
    pub fn unit_by_role(&self, role: CameraRole) -> Option<&Arc<TriggerUnit>> {
        self.units.iter().find(|u| u.role() == Some(role))
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&Arc<TriggerUnit>> {
        self.units.iter().find(|u| u.name() == name)
    }

    fn require(&self, camera: &str) -> Result<&Arc<TriggerUnit>> {
        self.unit_by_name(camera)
            .ok_or_else(|| RigError::UnknownCamera {
                rig: self.name.clone(),
                camera: camera.to_string(),
            })
    }

    /// Re-arm every unit. Returns how many were newly armed.
    pub fn trigger_all(&self) -> usize {
        let armed = self.units.iter().filter(|u| u.trigger()).count();
        observability::record_trigger_pulse(armed);
        debug!(rig = %self.name, armed, "trigger pulse");
        armed
    }

    /// Re-arm one camera
    pub fn trigger(&self, camera: &str) -> Result<bool> {
        Ok(self.require(camera)?.trigger())
    }

    /// A subscriber connected to one of the rig's camera topics
    pub fn subscriber_connected(&self, camera: &str) -> Result<u32> {
        let count = self.require(camera)?.subscriber_connected();
        observability::record_connection_count(&self.name, count);
        info!(rig = %self.name, camera, connections = count, "subscriber connected");
        Ok(count)
    }

    /// A subscriber disconnected from one of the rig's camera topics
    pub fn subscriber_disconnected(&self, camera: &str) -> Result<u32> {
        let count = self.require(camera)?.subscriber_disconnected();
        observability::record_connection_count(&self.name, count);
        info!(rig = %self.name, camera, connections = count, "subscriber disconnected");
        Ok(count)
    }

    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    pub fn is_active(&self) -> bool {
        self.sensor.is_active()
    }

    pub fn snapshot(&self) -> RigSnapshot {
        RigSnapshot {
            name: self.name.clone(),
            active: self.sensor.is_active(),
            sync: self.sync.snapshot(),
            units: self.units.iter().map(|u| u.snapshot()).collect(),
        }
    }

    /// Detach all callbacks and drop the units
    pub fn unload(self) {
        drop(self);
    }
}

impl Drop for Rig {
    fn drop(&mut self) {
        for unit in &self.units {
            unit.detach();
        }
        debug!(rig = %self.name, units = self.units.len(), "rig unloaded");
    }
}

impl std::fmt::Debug for Rig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rig")
            .field("name", &self.name)
            .field("units", &self.units)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger_unit::test_support::*;
    use crate::trigger_unit::TriggerState;
    use contracts::CameraSource;
    use std::fmt;
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Debug)]
    struct LoggedEvent {
        level: Level,
        message: String,
        fatal: Option<bool>,
    }

    /// Layer that keeps every event it sees
    #[derive(Clone, Default)]
    struct EventLog(Arc<Mutex<Vec<LoggedEvent>>>);

    #[derive(Default)]
    struct EventFields {
        message: String,
        fatal: Option<bool>,
    }

    impl Visit for EventFields {
        fn record_bool(&mut self, field: &Field, value: bool) {
            if field.name() == "fatal" {
                self.fatal = Some(value);
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = format!("{:?}", value);
            }
        }
    }

    impl<S: Subscriber> Layer<S> for EventLog {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = EventFields::default();
            event.record(&mut fields);
            self.0.lock().unwrap().push(LoggedEvent {
                level: *event.metadata().level(),
                message: fields.message,
                fatal: fields.fatal,
            });
        }
    }

    fn load_logged(h: &Harness, ctx: &LoadContext) -> (Result<Rig>, Vec<LoggedEvent>) {
        let log = EventLog::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let result = tracing::subscriber::with_default(subscriber, || {
            RigController::load(h.rig.clone(), &params(None), ctx)
        });
        let events = std::mem::take(&mut *log.0.lock().unwrap());
        (result, events)
    }

    struct Harness {
        rig: Arc<TestRig>,
        clock: Arc<FixedClock>,
        publisher: Arc<RecordingPublisher>,
        ctx: LoadContext,
    }

    fn harness(names: &[&str]) -> Harness {
        let rig = TestRig::new(names);
        let clock = Arc::new(FixedClock(Mutex::new(0.0)));
        let publisher = Arc::new(RecordingPublisher::default());
        let ctx = LoadContext::new(Arc::new(true), clock.clone(), publisher.clone());
        Harness {
            rig,
            clock,
            publisher,
            ctx,
        }
    }

    fn params(baseline: Option<f64>) -> RigParams {
        RigParams {
            camera_name: "stereo".into(),
            hack_baseline: baseline,
            ..Default::default()
        }
    }

    #[test]
    fn test_uninitialized_runtime_loads_nothing() {
        let h = harness(&["cam_left", "cam_right"]);
        let ctx = LoadContext::new(Arc::new(false), h.clock.clone(), h.publisher.clone());

        let err = RigController::load(h.rig.clone(), &params(None), &ctx).unwrap_err();
        assert!(matches!(err, RigError::RuntimeNotInitialized { .. }));

        for camera in &h.rig.cameras {
            assert!(camera.callback.lock().unwrap().is_none());
            assert!(!camera.is_enabled());
            assert!(!camera.fire());
        }
        assert!(h.publisher.images.lock().unwrap().is_empty());
    }

    #[test]
    fn test_uninitialized_runtime_logs_single_fatal_error() {
        let h = harness(&["cam_left", "cam_right"]);
        let ctx = LoadContext::new(Arc::new(false), h.clock.clone(), h.publisher.clone());

        let (result, events) = load_logged(&h, &ctx);
        assert!(result.is_err());

        let fatal: Vec<_> = events
            .iter()
            .filter(|e| e.level == Level::ERROR && e.fatal == Some(true))
            .collect();
        assert_eq!(fatal.len(), 1, "events: {events:?}");
        assert!(fatal[0].message.contains("has not been initialized"));
        assert!(events.iter().all(|e| e.level != Level::ERROR || e.fatal == Some(true)));
        assert!(!events.iter().any(|e| e.message.contains("trigger unit loaded")));
        assert!(!events.iter().any(|e| e.message == "rig loaded"));
    }

    #[test]
    fn test_load_logs_each_unit() {
        let h = harness(&["cam_left", "cam_right"]);

        let (result, events) = load_logged(&h, &h.ctx);
        assert!(result.is_ok());

        let loaded = events
            .iter()
            .filter(|e| e.message.contains("trigger unit loaded"))
            .count();
        assert_eq!(loaded, 2);
        assert!(!events.iter().any(|e| e.level == Level::ERROR));
    }

    #[test]
    fn test_roles_and_baselines() {
        let h = harness(&["stereo_left_sensor", "stereo_right_sensor"]);
        let rig = RigController::load(h.rig.clone(), &params(Some(0.07)), &h.ctx).unwrap();

        let left = rig.unit_by_role(CameraRole::Reference).unwrap();
        let right = rig.unit_by_role(CameraRole::Secondary).unwrap();
        assert_eq!(left.name(), "stereo_left_sensor");
        assert_eq!(left.baseline(), 0.0);
        assert_eq!(right.name(), "stereo_right_sensor");
        assert_eq!(right.baseline(), 0.07);
        assert_eq!(right.binding().image_topic, "stereo/right/image_raw");
    }

    #[test]
    fn test_empty_rig_loads() {
        let h = harness(&[]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();
        assert!(rig.units().is_empty());
        assert_eq!(rig.trigger_all(), 0);
    }

    #[test]
    fn test_shared_state_across_cameras() {
        let h = harness(&["cam_left", "cam_right"]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();

        assert!(!rig.is_active());
        assert_eq!(rig.subscriber_connected("cam_left").unwrap(), 1);
        assert_eq!(rig.subscriber_connected("cam_right").unwrap(), 2);
        assert!(rig.is_active());

        // a disconnect through either camera hits the same counter
        assert_eq!(rig.subscriber_disconnected("cam_right").unwrap(), 1);
        assert!(rig.is_active());
        assert_eq!(rig.subscriber_disconnected("cam_right").unwrap(), 0);
        assert!(!rig.is_active());
        assert_eq!(rig.sync_state().connection_count(), 0);
    }

    #[test]
    fn test_unknown_camera() {
        let h = harness(&["cam_left"]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();
        let err = rig.trigger("nope").unwrap_err();
        assert!(matches!(err, RigError::UnknownCamera { .. }));
        assert!(rig.subscriber_connected("nope").is_err());
    }

    #[test]
    fn test_first_frame_pair_shares_stamp() {
        let h = harness(&["stereo_left_sensor", "stereo_right_sensor"]);
        let rig = RigController::load(h.rig.clone(), &params(Some(0.07)), &h.ctx).unwrap();

        // one rig update cycle; the cameras rendered at different times
        h.rig.set_update_time(2.5);
        h.rig.cameras[0].set_update_time(2.49);
        h.rig.cameras[1].set_update_time(2.5333);
        *h.clock.0.lock().unwrap() = 2.501;
        assert!(h.rig.cameras[0].fire());
        *h.clock.0.lock().unwrap() = 2.503;
        assert!(h.rig.cameras[1].fire());

        let images = h.publisher.images.lock().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].header.stamp, 2.5);
        assert_eq!(images[1].header.stamp, 2.5);

        let infos = h.publisher.infos.lock().unwrap();
        assert_eq!(infos[0].baseline, 0.0);
        assert_eq!(infos[1].baseline, 0.07);

        for unit in rig.units() {
            assert_eq!(unit.state(), TriggerState::Disarmed);
        }
        for camera in &h.rig.cameras {
            assert!(!camera.is_enabled());
        }
    }

    #[test]
    fn test_trigger_all_rearms_disarmed_units() {
        let h = harness(&["cam_left", "cam_right"]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();
        assert_eq!(rig.trigger_all(), 0);

        h.rig.cameras[0].fire();
        assert_eq!(rig.trigger_all(), 1);
        assert!(rig.trigger("cam_left").is_ok());

        for camera in &h.rig.cameras {
            assert!(camera.is_enabled());
        }
    }

    #[test]
    fn test_drop_detaches_callbacks() {
        let h = harness(&["cam_left", "cam_right"]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();
        assert!(h.rig.cameras[0].callback.lock().unwrap().is_some());

        rig.unload();

        for camera in &h.rig.cameras {
            assert!(!camera.fire());
        }
        assert!(h.publisher.images.lock().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let h = harness(&["cam_left"]);
        let rig = RigController::load(h.rig.clone(), &params(None), &h.ctx).unwrap();
        rig.subscriber_connected("cam_left").unwrap();

        let snapshot = rig.snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.sync.connection_count, 1);
        assert_eq!(snapshot.units[0].state, TriggerState::Armed);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["units"][0]["role"], "reference");
    }
}
