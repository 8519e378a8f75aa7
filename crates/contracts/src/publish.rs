//! FramePublisher trait - outbound interface to the messaging layer

use crate::{CameraInfoMessage, ImageMessage};

/// Publish path into the middleware.
///
/// Both calls are fire-and-forget: they run on the camera's update thread,
/// must not block for long, and report nothing back. Delivery failures are
/// the implementation's business.
pub trait FramePublisher: Send + Sync {
    /// Publisher name (used for logging/metrics)
    fn name(&self) -> &str;

    fn publish_image(&self, image: ImageMessage);

    fn publish_camera_info(&self, info: CameraInfoMessage);
}
