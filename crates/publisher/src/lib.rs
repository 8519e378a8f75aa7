//! # Publisher
//!
//! Middleware 发布端适配。
//!
//! 负责：
//! - `FramePublisher` 实现：日志、有界通道、fan-out
//! - 发布计数 (`PublishMetrics`)
//! - 下游按时间戳配对左右图像 (`StereoPairer`)
//!
//! 发布调用运行在相机的更新线程上，任何实现都不得阻塞。

pub mod error;
pub mod metrics;
pub mod pairing;
pub mod publishers;

use std::sync::Arc;

use contracts::{FramePublisher, PublisherConfig, PublisherKind};
use tracing::{info, instrument};

pub use error::{PublishError, Result};
pub use metrics::{PublishMetrics, PublishSnapshot};
pub use pairing::{StereoPair, StereoPairer};
pub use publishers::{
    ChannelPublisher, FanoutPublisher, LogPublisher, MessageReceiver, PublishedMessage,
};

/// A constructed publisher plus, for channel publishers, the consumer end
pub struct PublisherEndpoint {
    pub publisher: Arc<dyn FramePublisher>,
    pub receiver: Option<MessageReceiver>,
    pub metrics: Arc<PublishMetrics>,
}

/// Create a publisher from configuration
#[instrument(
    name = "publisher_create",
    skip(config),
    fields(name = %name, kind = ?config.kind)
)]
pub fn create_publisher(name: &str, config: &PublisherConfig) -> Result<PublisherEndpoint> {
    let endpoint = match config.kind {
        PublisherKind::Log => {
            let publisher = LogPublisher::new(name);
            let metrics = publisher.metrics().clone();
            PublisherEndpoint {
                publisher: Arc::new(publisher),
                receiver: None,
                metrics,
            }
        }
        PublisherKind::Channel => {
            let (publisher, receiver) = ChannelPublisher::bounded(name, config.queue_capacity)?;
            let metrics = publisher.metrics().clone();
            PublisherEndpoint {
                publisher: Arc::new(publisher),
                receiver: Some(receiver),
                metrics,
            }
        }
    };

    info!(publisher = %name, kind = ?config.kind, "publisher created");
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_log_publisher() {
        let endpoint = create_publisher("log", &PublisherConfig::default()).unwrap();
        assert_eq!(endpoint.publisher.name(), "log");
        assert!(endpoint.receiver.is_none());
    }

    #[test]
    fn test_create_channel_publisher() {
        let config = PublisherConfig {
            kind: PublisherKind::Channel,
            queue_capacity: 4,
        };
        let endpoint = create_publisher("chan", &config).unwrap();
        assert!(endpoint.receiver.is_some());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = PublisherConfig {
            kind: PublisherKind::Channel,
            queue_capacity: 0,
        };
        let err = create_publisher("chan", &config).err().unwrap();
        assert!(matches!(err, PublishError::PublisherCreation { .. }));
    }
}
