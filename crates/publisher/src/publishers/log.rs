//! LogPublisher - logs message summaries via tracing

use std::sync::Arc;

use contracts::{CameraInfoMessage, FramePublisher, ImageMessage};
use tracing::{debug, info};

use crate::metrics::PublishMetrics;

/// Publisher that logs message summaries for debugging
pub struct LogPublisher {
    name: String,
    metrics: Arc<PublishMetrics>,
}

impl LogPublisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metrics: Arc::new(PublishMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<PublishMetrics> {
        &self.metrics
    }
}

impl FramePublisher for LogPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish_image(&self, image: ImageMessage) {
        self.metrics.record_image();
        info!(
            publisher = %self.name,
            topic = %image.topic,
            frame_id = %image.header.frame_id,
            seq = image.header.seq,
            stamp = image.header.stamp,
            width = image.width,
            height = image.height,
            encoding = image.encoding,
            bytes = image.data.len(),
            "image published"
        );
    }

    fn publish_camera_info(&self, info: CameraInfoMessage) {
        self.metrics.record_camera_info();
        debug!(
            publisher = %self.name,
            topic = %info.topic,
            seq = info.header.seq,
            stamp = info.header.stamp,
            baseline = info.baseline,
            "camera info published"
        );
    }
}
