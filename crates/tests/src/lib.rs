//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 模拟 rig → 触发单元 → 发布端 的完整链路
//! - 立体相机的时间戳一致性
//! - 基于后台仿真线程的端到端运行（无需真实模拟器）

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{RigSensor, SimulationConfig};
    use publisher::{ChannelPublisher, MessageReceiver, PublishedMessage};
    use sim_harness::{MockRigSensor, MockRuntime, RigFactory, SimulationClock};
    use trigger_sync::{LoadContext, Rig, RigController};

    pub const STEREO_TOML: &str = r#"
[rig]
name = "stereo_camera"
camera_name = "stereo"
frame_name = "stereo_link"
hack_baseline = 0.07

[[cameras]]
name = "stereo_left_sensor"
width = 8
height = 4
format = "R8G8B8"

[[cameras]]
name = "stereo_right_sensor"
width = 8
height = 4
format = "R8G8B8"

[simulation]
step_sec = 0.001
render_rate_hz = 100.0

[trigger]
rate_hz = 50.0

[publisher]
kind = "channel"
queue_capacity = 256
"#;

    pub struct Harness {
        pub config: SimulationConfig,
        pub sensor: Arc<MockRigSensor>,
        pub clock: Arc<SimulationClock>,
        pub runtime: Arc<MockRuntime>,
        pub receiver: MessageReceiver,
        pub ctx: LoadContext,
    }

    impl Harness {
        pub fn new(toml: &str) -> Self {
            let config = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
            let sensor = RigFactory::build(&config).unwrap();
            let clock = Arc::new(SimulationClock::new());
            let runtime = Arc::new(MockRuntime::new(true));
            let (channel, receiver) =
                ChannelPublisher::bounded("test", config.publisher.queue_capacity).unwrap();
            let ctx = LoadContext::new(runtime.clone(), clock.clone(), Arc::new(channel));
            Self {
                config,
                sensor,
                clock,
                runtime,
                receiver,
                ctx,
            }
        }

        pub fn stereo() -> Self {
            Self::new(STEREO_TOML)
        }

        pub fn load(&self) -> trigger_sync::Result<Rig> {
            let sensor: Arc<dyn RigSensor> = self.sensor.clone();
            RigController::load(sensor, &self.config.rig, &self.ctx)
        }

        /// Render one camera in an update cycle of the parent at `t`
        pub fn render(&self, camera: &str, t: f64) -> bool {
            self.sensor.set_last_update_time(t);
            self.sensor.camera(camera).unwrap().render(t)
        }

        pub fn drain(&self) -> Vec<PublishedMessage> {
            let mut out = Vec::new();
            while let Ok(message) = self.receiver.try_recv() {
                out.push(message);
            }
            out
        }
    }
}

#[cfg(test)]
mod stereo_tests {
    use contracts::{CameraRole, CameraSource};
    use publisher::{PublishedMessage, StereoPairer};
    use trigger_sync::{FrameOutcome, RigError, TriggerState};

    use crate::support::Harness;

    const LEFT: &str = "stereo_left_sensor";
    const RIGHT: &str = "stereo_right_sensor";

    #[test]
    fn test_stereo_roles_and_baseline() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();

        let left = rig.unit_by_role(CameraRole::Reference).unwrap();
        let right = rig.unit_by_role(CameraRole::Secondary).unwrap();
        assert_eq!(left.name(), LEFT);
        assert_eq!(right.name(), RIGHT);
        assert_eq!(left.baseline(), 0.0);
        assert_eq!(right.baseline(), 0.07);

        harness.clock.set(0.52);
        assert!(harness.render(LEFT, 0.5));
        assert!(harness.render(RIGHT, 0.5));

        let messages = harness.drain();
        assert_eq!(messages.len(), 4);

        let topics: Vec<&str> = messages.iter().map(|m| m.topic()).collect();
        assert_eq!(
            topics,
            [
                "stereo/left/image_raw",
                "stereo/left/camera_info",
                "stereo/right/image_raw",
                "stereo/right/camera_info",
            ]
        );

        for message in &messages {
            match message {
                PublishedMessage::Image(image) => {
                    assert_eq!(image.header.stamp, 0.5);
                    assert_eq!(image.encoding, "rgb8");
                    assert_eq!(image.step, 24);
                    assert_eq!(image.data.len(), 8 * 4 * 3);
                }
                PublishedMessage::CameraInfo(info) => {
                    assert_eq!(info.header.stamp, 0.5);
                    let expected = if info.role == Some(CameraRole::Secondary) {
                        0.07
                    } else {
                        0.0
                    };
                    assert_eq!(info.baseline, expected);
                    assert!(info.header.frame_id.starts_with("stereo_link/"));
                }
            }
        }
    }

    #[test]
    fn test_uninitialized_runtime_constructs_nothing() {
        let harness = Harness::stereo();
        harness.runtime.set_initialized(false);

        let err = harness.load().unwrap_err();
        assert!(matches!(err, RigError::RuntimeNotInitialized { .. }));

        for camera in harness.sensor.mock_cameras() {
            assert!(!camera.has_callback());
            assert!(!camera.is_enabled());
        }
    }

    #[test]
    fn test_one_frame_per_trigger() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();
        let left_camera = harness.sensor.camera(LEFT).unwrap();

        assert!(harness.render(LEFT, 0.1));
        assert!(!left_camera.is_enabled());

        // disabled camera is not rendered by the simulator
        assert!(!harness.render(LEFT, 0.2));

        // a late frame on the same thread is ignored
        assert!(left_camera.deliver(left_camera.make_frame(9).unwrap()));
        let left = rig.unit_by_name(LEFT).unwrap();
        assert_eq!(left.frames_published(), 1);
        assert_eq!(left.frames_ignored(), 1);
        assert_eq!(left.state(), TriggerState::Disarmed);

        // image + camera info of the single capture
        assert_eq!(harness.drain().len(), 2);
    }

    #[test]
    fn test_trigger_rearms_for_next_capture() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();

        harness.render(LEFT, 0.1);
        harness.render(RIGHT, 0.1);
        harness.drain();

        // nothing is armed, both are re-armed
        assert_eq!(rig.trigger_all(), 2);
        assert_eq!(rig.trigger_all(), 0);

        harness.clock.set(0.21);
        assert!(harness.render(RIGHT, 0.2));
        assert!(harness.render(LEFT, 0.2));

        let images: Vec<_> = harness
            .drain()
            .into_iter()
            .filter_map(|m| match m {
                PublishedMessage::Image(image) => Some(image),
                PublishedMessage::CameraInfo(_) => None,
            })
            .collect();
        assert_eq!(images.len(), 2);
        for image in &images {
            assert_eq!(image.header.seq, 2);
            assert_eq!(image.header.stamp, 0.2);
        }

        let unit = rig.unit_by_name(LEFT).unwrap();
        assert_eq!(unit.sensor_update_time(), 0.2);
        assert_eq!(unit.last_update_time(), 0.21);
    }

    #[test]
    fn test_pairing_after_capture() {
        let harness = Harness::stereo();
        let _rig = harness.load().unwrap();
        let mut pairer = StereoPairer::new(4, 0.0005);

        harness.render(RIGHT, 0.3);
        harness.render(LEFT, 0.3);

        let mut pairs = Vec::new();
        for message in harness.drain() {
            if let PublishedMessage::Image(image) = message {
                pairs.extend(pairer.push(image));
            }
        }
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].reference.camera.as_str(), LEFT);
        assert_eq!(pairs[0].skew_ms(), 0.0);
    }

    #[test]
    fn test_pair_stamped_with_parent_update_time() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();
        let mut pairer = StereoPairer::new(4, 0.0);

        // the cameras finish rendering at slightly different times
        harness.sensor.set_last_update_time(0.4);
        assert!(harness.sensor.camera(RIGHT).unwrap().render(0.41));
        assert!(harness.sensor.camera(LEFT).unwrap().render(0.39));

        let mut pairs = Vec::new();
        for message in harness.drain() {
            match message {
                PublishedMessage::Image(image) => {
                    assert_eq!(image.header.stamp, 0.4);
                    pairs.extend(pairer.push(image));
                }
                PublishedMessage::CameraInfo(info) => assert_eq!(info.header.stamp, 0.4),
            }
        }
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].skew_ms(), 0.0);
        for unit in rig.units() {
            assert_eq!(unit.sensor_update_time(), 0.4);
        }
    }

    #[test]
    fn test_update_cycle_renders_armed_cameras() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();

        // inactive parent is not updated
        assert_eq!(harness.sensor.update(0.6), 0);
        assert!(harness.drain().is_empty());

        rig.subscriber_connected(LEFT).unwrap();
        assert_eq!(harness.sensor.update(0.6), 2);
        assert_eq!(harness.drain().len(), 4);

        // both cameras disarmed themselves after capturing
        assert_eq!(harness.sensor.update(0.7), 0);
        rig.subscriber_disconnected(LEFT).unwrap();
    }

    #[test]
    fn test_subscribers_drive_rig_activity() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();
        assert!(!rig.is_active());

        assert_eq!(rig.subscriber_connected(LEFT).unwrap(), 1);
        assert!(rig.is_active());
        assert_eq!(rig.subscriber_connected(RIGHT).unwrap(), 2);

        assert_eq!(rig.subscriber_disconnected(LEFT).unwrap(), 1);
        assert!(rig.is_active());
        assert_eq!(rig.subscriber_disconnected(RIGHT).unwrap(), 0);
        assert!(!rig.is_active());

        assert!(matches!(
            rig.subscriber_connected("rear_camera"),
            Err(RigError::UnknownCamera { .. })
        ));
    }

    #[test]
    fn test_unload_detaches_cameras() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();
        rig.unload();

        for camera in harness.sensor.mock_cameras() {
            assert!(!camera.has_callback());
        }
        assert!(!harness.render(LEFT, 1.0));
        assert!(harness.drain().is_empty());
    }

    #[test]
    fn test_frames_before_load_are_not_published() {
        let harness = Harness::stereo();
        let camera = harness.sensor.camera(LEFT).unwrap();
        camera.set_enabled(true);
        assert!(!camera.render(0.1));

        let rig = harness.load().unwrap();
        let outcome = rig.unit_by_name(LEFT).unwrap().on_new_frame(camera.make_frame(1).unwrap());
        assert_eq!(outcome, FrameOutcome::Published);
    }
}

#[cfg(test)]
mod mono_tests {
    use crate::support::Harness;
    use publisher::PublishedMessage;

    const MONO_TOML: &str = r#"
[rig]
name = "front"
camera_name = "front_camera"
frame_name = "front_link"
hack_baseline = 0.5

[[cameras]]
name = "front_sensor"
width = 2
height = 2
format = "L8"
"#;

    #[test]
    fn test_unclassified_camera_publishes_without_suffix() {
        let harness = Harness::new(MONO_TOML);
        let rig = harness.load().unwrap();
        let unit = &rig.units()[0];
        assert_eq!(unit.role(), None);
        assert_eq!(unit.baseline(), 0.0);

        harness.render("front_sensor", 0.4);
        let messages = harness.drain();
        assert_eq!(messages[0].topic(), "front_camera/image_raw");
        match &messages[1] {
            PublishedMessage::CameraInfo(info) => {
                assert_eq!(info.header.frame_id, "front_link");
                assert_eq!(info.baseline, 0.0);
            }
            other => panic!("expected camera info, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use observability::RigMetricsAggregator;
    use publisher::{PublishedMessage, StereoPairer};
    use sim_harness::SimulationDriver;

    use crate::support::Harness;

    /// End-to-end test: SimulationDriver -> TriggerUnit -> ChannelPublisher -> StereoPairer
    ///
    /// 验证完整的数据流：
    /// 1. 后台线程推进仿真时钟并渲染已启用的相机
    /// 2. 每个触发单元只发布一帧，然后关闭相机
    /// 3. 固定频率的外部触发重新启用相机
    /// 4. 消费端按时间戳配对左右图像
    #[tokio::test]
    async fn test_e2e_triggered_stereo() {
        let harness = Harness::stereo();
        let rig = harness.load().unwrap();
        for unit in rig.units() {
            rig.subscriber_connected(unit.name()).unwrap();
        }

        let driver = SimulationDriver::start(
            harness.sensor.clone(),
            harness.clock.clone(),
            &harness.config.simulation,
        )
        .unwrap();

        let mut pairer = StereoPairer::new(16, 0.0005);
        let mut aggregator = RigMetricsAggregator::new();
        let mut ticker = tokio::time::interval(Duration::from_millis(20));
        let target_pairs = 5;

        let run = async {
            while pairer.matched() < target_pairs {
                tokio::select! {
                    _ = ticker.tick() => {
                        aggregator.observe_trigger_pulse(rig.trigger_all());
                    }
                    message = harness.receiver.recv() => match message.unwrap() {
                        PublishedMessage::Image(image) => {
                            aggregator.observe_image(&image);
                            if let Some(pair) = pairer.push(image) {
                                aggregator.observe_pair(pair.skew_ms());
                            }
                        }
                        PublishedMessage::CameraInfo(info) => aggregator.observe_camera_info(&info),
                    },
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("stereo pairs within timeout");

        tokio::task::spawn_blocking(move || driver.stop()).await.unwrap();

        let summary = aggregator.summary();
        assert!(summary.pairs_matched >= target_pairs);
        assert_eq!(summary.pair_skew_ms.max, 0.0);

        // no camera published more than once per trigger window
        for unit in rig.units() {
            assert!(unit.frames_published() <= summary.trigger_pulses + 1);
        }

        for unit in rig.units() {
            rig.subscriber_disconnected(unit.name()).unwrap();
        }
        assert!(!rig.is_active());
    }
}
