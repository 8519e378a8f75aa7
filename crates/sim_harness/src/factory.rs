//! RigFactory - builds a mock rig from configuration

use std::collections::HashSet;
use std::sync::Arc;

use contracts::SimulationConfig;
use tracing::{info, instrument};

use crate::camera::MockCamera;
use crate::error::{HarnessError, Result};
use crate::rig_sensor::MockRigSensor;

/// Builds mock rigs
pub struct RigFactory;

impl RigFactory {
    /// Build the parent sensor and its cameras in declaration order
    #[instrument(
        name = "rig_factory_build",
        skip(config),
        fields(rig = %config.rig.name, cameras = config.cameras.len())
    )]
    pub fn build(config: &SimulationConfig) -> Result<Arc<MockRigSensor>> {
        let mut seen = HashSet::new();
        let mut cameras = Vec::with_capacity(config.cameras.len());

        for spec in &config.cameras {
            if !seen.insert(spec.name.as_str()) {
                return Err(HarnessError::DuplicateCamera {
                    name: spec.name.clone(),
                });
            }
            // frame_len also rejects buffers too large to allocate
            if spec.width == 0 || spec.height == 0 || spec.geometry().frame_len().is_none() {
                return Err(HarnessError::InvalidGeometry {
                    camera: spec.name.clone(),
                    width: spec.width,
                    height: spec.height,
                });
            }
            cameras.push(Arc::new(MockCamera::new(
                spec.name.clone(),
                spec.width,
                spec.height,
                spec.format.clone(),
            )));
        }

        info!(cameras = cameras.len(), "mock rig built");
        Ok(Arc::new(MockRigSensor::new(config.rig.name.clone(), cameras)))
    }
}
