//! Pipeline orchestrator - loads the rig, drives the simulation and runs
//! the trigger cadence.
//!
//! The consumer end of the publisher plays the subscriber: it connects one
//! subscription per camera so the rig goes active, then pairs images by stamp.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{FramePublisher, RigSensor, SimTime, SimulationConfig};
use observability::RigMetricsAggregator;
use publisher::{
    ChannelPublisher, FanoutPublisher, MessageReceiver, PublishMetrics, PublishedMessage,
    StereoPairer,
};
use sim_harness::{MockRuntime, RigFactory, SimulationClock, SimulationDriver};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use trigger_sync::{LoadContext, Rig, RigController};

use super::PipelineStats;

/// Pending images kept per side while waiting for a partner
const PAIR_WINDOW: usize = 16;

/// Queue size of the consumer channel when the configured publisher logs only
const CONSUMER_QUEUE: usize = 64;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated simulation configuration
    pub config: SimulationConfig,

    /// Stop after this long (None = until shutdown)
    pub duration: Option<Duration>,

    /// Stop after this many stereo pairs (None = unlimited)
    pub max_pairs: Option<u64>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Stamp tolerance for stereo pairing, in seconds
    pub pair_tolerance: SimTime,

    /// Whether the messaging runtime reports itself initialized
    pub runtime_initialized: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

struct PublisherSetup {
    publisher: Arc<dyn FramePublisher>,
    receiver: MessageReceiver,
    published: Arc<PublishMetrics>,
    consumer: Arc<PublishMetrics>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the duration elapses or enough pairs are seen
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.config;
        let trigger_period = config.trigger.period().with_context(|| {
            format!("Trigger rate {} Hz has no usable period", config.trigger.rate_hz)
        })?;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let clock = Arc::new(SimulationClock::new());
        let sensor = RigFactory::build(config).context("Failed to build simulated rig")?;
        let setup = build_publisher(config)?;

        let runtime = Arc::new(MockRuntime::new(self.config.runtime_initialized));
        let ctx = LoadContext::new(runtime, clock.clone(), setup.publisher.clone());
        let rig_sensor: Arc<dyn RigSensor> = sensor.clone();
        let rig = RigController::load(rig_sensor, &config.rig, &ctx)
            .with_context(|| format!("Failed to load rig '{}'", config.rig.name))?;

        info!(
            rig = %rig.name(),
            units = rig.units().len(),
            "Rig loaded"
        );

        connect_subscribers(&rig)?;

        let driver = SimulationDriver::start(sensor, clock.clone(), &config.simulation)
            .context("Failed to start simulation")?;

        let mut aggregator = RigMetricsAggregator::new();
        let mut pairer = StereoPairer::new(PAIR_WINDOW, self.config.pair_tolerance);

        let mut ticker = tokio::time::interval(trigger_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let duration = self.config.duration;
        let deadline = async move {
            match duration {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let armed = rig.trigger_all();
                    aggregator.observe_trigger_pulse(armed);
                    debug!(armed, sim_time = clock.now(), "trigger pulse");
                }
                message = setup.receiver.recv() => match message {
                    Ok(PublishedMessage::Image(image)) => {
                        aggregator.observe_image(&image);
                        if let Some(pair) = pairer.push(image) {
                            aggregator.observe_pair(pair.skew_ms());
                            if self.config.max_pairs.is_some_and(|max| pairer.matched() >= max) {
                                info!(pairs = pairer.matched(), "Reached max pairs limit");
                                break;
                            }
                        }
                    }
                    Ok(PublishedMessage::CameraInfo(camera_info)) => {
                        aggregator.observe_camera_info(&camera_info);
                    }
                    Err(_) => {
                        warn!("Publisher channel closed");
                        break;
                    }
                },
                _ = &mut deadline => {
                    info!("Run duration reached");
                    break;
                }
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping pipeline...");
                    break;
                }
            }
        }

        // render threads join on a blocking thread
        tokio::task::spawn_blocking(move || driver.stop())
            .await
            .context("Simulation driver panicked")?;

        disconnect_subscribers(&rig);

        let snapshot = rig.snapshot();
        let frames_ignored = snapshot.units.iter().map(|u| u.frames_ignored).sum();
        rig.unload();

        let metrics = aggregator.summary();
        Ok(PipelineStats {
            duration: start_time.elapsed(),
            sim_time: clock.now(),
            images: metrics.total_images,
            camera_infos: metrics.total_camera_infos,
            pairs: pairer.matched(),
            unmatched: pairer.unmatched(),
            trigger_pulses: metrics.trigger_pulses,
            frames_ignored,
            published: setup.published.snapshot(),
            consumer: setup.consumer.snapshot(),
            metrics,
            rig: snapshot,
        })
    }
}

/// Build the configured publisher plus a channel end for the consumer
fn build_publisher(config: &SimulationConfig) -> Result<PublisherSetup> {
    let name = config.rig.name.as_str();
    let endpoint = publisher::create_publisher(name, &config.publisher)
        .context("Failed to create publisher")?;

    if let Some(receiver) = endpoint.receiver {
        return Ok(PublisherSetup {
            publisher: endpoint.publisher,
            receiver,
            consumer: endpoint.metrics.clone(),
            published: endpoint.metrics,
        });
    }

    let (channel, receiver) = ChannelPublisher::bounded(
        format!("{name}-consumer"),
        config.publisher.queue_capacity.max(CONSUMER_QUEUE),
    )
    .context("Failed to create consumer channel")?;
    let consumer = channel.metrics().clone();
    let channel: Arc<dyn FramePublisher> = Arc::new(channel);
    let fanout = FanoutPublisher::new(name, vec![endpoint.publisher, channel]);

    Ok(PublisherSetup {
        publisher: Arc::new(fanout),
        receiver,
        published: endpoint.metrics,
        consumer,
    })
}

fn connect_subscribers(rig: &Rig) -> Result<()> {
    for unit in rig.units() {
        let count = rig.subscriber_connected(unit.name())?;
        debug!(camera = %unit.name(), connections = count, "subscriber connected");
    }
    Ok(())
}

fn disconnect_subscribers(rig: &Rig) {
    for unit in rig.units() {
        if let Err(e) = rig.subscriber_disconnected(unit.name()) {
            warn!(camera = %unit.name(), error = %e, "failed to disconnect subscriber");
        }
    }
}
