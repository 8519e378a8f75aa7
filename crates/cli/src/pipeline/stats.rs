//! Pipeline statistics and metrics.

use std::time::Duration;

use contracts::SimTime;
use observability::MetricsSummary;
use publisher::PublishSnapshot;
use trigger_sync::RigSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Simulation time when the run stopped
    pub sim_time: SimTime,

    /// Images seen by the consumer
    pub images: u64,

    /// Camera infos seen by the consumer
    pub camera_infos: u64,

    /// Stereo pairs matched by stamp
    pub pairs: u64,

    /// Images dropped without a partner
    pub unmatched: u64,

    /// Trigger pulses sent to the rig
    pub trigger_pulses: u64,

    /// Frames that arrived while a unit was not armed
    pub frames_ignored: u64,

    /// Counters of the configured publisher
    pub published: PublishSnapshot,

    /// Counters of the channel feeding the consumer
    pub consumer: PublishSnapshot,

    pub metrics: MetricsSummary,

    /// Final rig state, taken before unload
    pub rig: RigSnapshot,
}

impl PipelineStats {
    /// Stereo pairs per wall-clock second
    pub fn pair_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.pairs as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of images that found no partner, in percent
    pub fn unmatched_rate(&self) -> f64 {
        if self.images > 0 {
            (self.unmatched as f64 / self.images as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Rig Sync Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Sim time: {:.3}s", self.sim_time);
        println!("   ├─ Trigger pulses: {}", self.trigger_pulses);
        println!("   ├─ Images: {}", self.images);
        println!("   ├─ Camera infos: {}", self.camera_infos);
        println!("   ├─ Stereo pairs: {} ({:.2}/s)", self.pairs, self.pair_rate());
        println!(
            "   ├─ Unmatched images: {} ({:.2}%)",
            self.unmatched,
            self.unmatched_rate()
        );
        println!("   └─ Frames ignored while disarmed: {}", self.frames_ignored);

        println!("\n📤 Publishing");
        println!(
            "   ├─ Published: {} images, {} camera infos",
            self.published.images, self.published.camera_infos
        );
        println!(
            "   └─ Consumer queue: {} dropped, {} closed",
            self.consumer.dropped, self.consumer.closed
        );

        println!("\n📷 Cameras ({})", self.rig.name);
        let last = self.rig.units.len().saturating_sub(1);
        for (i, unit) in self.rig.units.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            let role = unit
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   {} {} [{}] baseline={:.3} published={} ignored={} state={:?}",
                branch,
                unit.camera,
                role,
                unit.baseline,
                unit.frames_published,
                unit.frames_ignored,
                unit.state
            );
        }

        println!("\n{}", self.metrics);
    }
}
