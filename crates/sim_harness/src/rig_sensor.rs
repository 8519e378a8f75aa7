//! Mock parent sensor

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{CameraSource, RigSensor, SimTime};
use tracing::trace;

use crate::camera::MockCamera;

/// Parent sensor owning the mock cameras of one rig
#[derive(Debug)]
pub struct MockRigSensor {
    name: String,
    cameras: Vec<Arc<MockCamera>>,
    active: AtomicBool,
    /// `f64` bits of the last update cycle's time
    update_time: AtomicU64,
}

impl MockRigSensor {
    pub fn new(name: impl Into<String>, cameras: Vec<Arc<MockCamera>>) -> Self {
        Self {
            name: name.into(),
            cameras,
            active: AtomicBool::new(false),
            update_time: AtomicU64::new(0.0f64.to_bits()),
        }
    }

    /// Concrete camera handles, in declaration order
    pub fn mock_cameras(&self) -> &[Arc<MockCamera>] {
        &self.cameras
    }

    pub fn camera(&self, name: &str) -> Option<&Arc<MockCamera>> {
        self.cameras.iter().find(|c| c.name() == name)
    }

    /// Record an update cycle without rendering
    pub fn set_last_update_time(&self, sim_time: SimTime) {
        self.update_time.store(sim_time.to_bits(), Ordering::Release);
    }

    /// Run one update cycle at `sim_time`.
    ///
    /// An inactive sensor is skipped entirely. Otherwise the cycle time is
    /// recorded first, then every enabled camera renders. Returns the number
    /// of frames delivered.
    pub fn update(&self, sim_time: SimTime) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.set_last_update_time(sim_time);

        let delivered = self.cameras.iter().filter(|c| c.render(sim_time)).count();
        trace!(rig = %self.name, sim_time, delivered, "rig updated");
        delivered
    }
}

impl RigSensor for MockRigSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn cameras(&self) -> Vec<Arc<dyn CameraSource>> {
        self.cameras
            .iter()
            .map(|c| c.clone() as Arc<dyn CameraSource>)
            .collect()
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    fn last_update_time(&self) -> SimTime {
        f64::from_bits(self.update_time.load(Ordering::Acquire))
    }
}
