//! ChannelPublisher - hands messages to a bounded async channel
//!
//! The producer side never blocks: when the queue is full the message is
//! dropped and counted.

use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::{CameraInfoMessage, FramePublisher, ImageMessage};
use tracing::{trace, warn};

use crate::error::{PublishError, Result};
use crate::metrics::PublishMetrics;

/// A message as seen by the channel consumer
#[derive(Debug, Clone)]
pub enum PublishedMessage {
    Image(ImageMessage),
    CameraInfo(CameraInfoMessage),
}

impl PublishedMessage {
    pub fn topic(&self) -> &str {
        match self {
            Self::Image(image) => &image.topic,
            Self::CameraInfo(info) => &info.topic,
        }
    }
}

/// Consumer end of a `ChannelPublisher`
pub type MessageReceiver = Receiver<PublishedMessage>;

/// Publisher backed by a bounded channel
pub struct ChannelPublisher {
    name: String,
    tx: Sender<PublishedMessage>,
    metrics: Arc<PublishMetrics>,
}

impl ChannelPublisher {
    /// Create a publisher and its consumer end
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Result<(Self, MessageReceiver)> {
        let name = name.into();
        if capacity == 0 {
            return Err(PublishError::publisher_creation(
                name,
                "queue_capacity must be > 0",
            ));
        }

        let (tx, rx) = bounded(capacity);
        let publisher = Self {
            name,
            tx,
            metrics: Arc::new(PublishMetrics::new()),
        };
        Ok((publisher, rx))
    }

    pub fn metrics(&self) -> &Arc<PublishMetrics> {
        &self.metrics
    }

    /// Current queue length
    pub fn queue_len(&self) -> usize {
        self.tx.len()
    }

    /// Send without blocking. Returns false if the message was dropped.
    fn send(&self, message: PublishedMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => {
                trace!(publisher = %self.name, queue_len = self.tx.len(), "message queued");
                true
            }
            Err(TrySendError::Full(message)) => {
                self.metrics.record_dropped();
                observability::record_publish_dropped(&self.name);
                warn!(
                    publisher = %self.name,
                    topic = %message.topic(),
                    "queue full, message dropped"
                );
                false
            }
            Err(TrySendError::Closed(message)) => {
                self.metrics.record_closed();
                trace!(
                    publisher = %self.name,
                    topic = %message.topic(),
                    "consumer closed, message discarded"
                );
                false
            }
        }
    }
}

impl FramePublisher for ChannelPublisher {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish_image(&self, image: ImageMessage) {
        if self.send(PublishedMessage::Image(image)) {
            self.metrics.record_image();
        }
    }

    fn publish_camera_info(&self, info: CameraInfoMessage) {
        if self.send(PublishedMessage::CameraInfo(info)) {
            self.metrics.record_camera_info();
        }
    }
}
