//! Publisher implementations
//!
//! Contains LogPublisher, ChannelPublisher, and FanoutPublisher.

mod channel;
mod fanout;
mod log;

pub use self::channel::{ChannelPublisher, MessageReceiver, PublishedMessage};
pub use self::fanout::FanoutPublisher;
pub use self::log::LogPublisher;

#[cfg(test)]
pub(crate) mod fixtures {
    use bytes::Bytes;
    use contracts::{CameraInfoMessage, CameraRole, Header, ImageMessage, SimTime};

    pub fn image(camera: &str, role: Option<CameraRole>, stamp: SimTime) -> ImageMessage {
        ImageMessage {
            header: Header {
                seq: 1,
                stamp,
                frame_id: "camera_link".into(),
            },
            topic: format!("stereo/{}/image_raw", camera),
            camera: camera.into(),
            role,
            width: 2,
            height: 1,
            encoding: "mono8",
            step: 2,
            data: Bytes::from_static(&[1, 2]),
        }
    }

    pub fn info(camera: &str, stamp: SimTime) -> CameraInfoMessage {
        CameraInfoMessage {
            header: Header {
                seq: 1,
                stamp,
                frame_id: "camera_link".into(),
            },
            topic: format!("stereo/{}/camera_info", camera),
            camera: camera.into(),
            role: None,
            width: 2,
            height: 1,
            baseline: 0.0,
        }
    }
}
