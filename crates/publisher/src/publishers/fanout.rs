//! FanoutPublisher - forwards every message to several publishers

use std::sync::Arc;

use contracts::{CameraInfoMessage, FramePublisher, ImageMessage};

/// Publisher that fans out to a list of publishers in order
pub struct FanoutPublisher {
    name: String,
    targets: Vec<Arc<dyn FramePublisher>>,
}

impl FanoutPublisher {
    pub fn new(name: impl Into<String>, targets: Vec<Arc<dyn FramePublisher>>) -> Self {
        Self {
            name: name.into(),
            targets,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl FramePublisher for FanoutPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish_image(&self, image: ImageMessage) {
        // pixel data is `Bytes`, so clones share the buffer
        if let Some((last, rest)) = self.targets.split_last() {
            for target in rest {
                target.publish_image(image.clone());
            }
            last.publish_image(image);
        }
    }

    fn publish_camera_info(&self, info: CameraInfoMessage) {
        if let Some((last, rest)) = self.targets.split_last() {
            for target in rest {
                target.publish_camera_info(info.clone());
            }
            last.publish_camera_info(info);
        }
    }
}
