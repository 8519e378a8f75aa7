//! Trigger sync 指标收集模块
//!
//! 记录触发、发帧、丢帧、订阅计数，并在内存中聚合发布结果。

use std::collections::HashMap;

use contracts::{CameraInfoMessage, ImageMessage, SimTime};
use metrics::{counter, gauge, histogram};

/// 记录一帧已发布
pub fn record_frame_published(camera: &str, role: &str) {
    counter!(
        "rig_sync_frames_published_total",
        "camera" => camera.to_string(),
        "role" => role.to_string()
    )
    .increment(1);
}

/// 记录未触发状态下收到的帧
pub fn record_frame_ignored(camera: &str) {
    counter!(
        "rig_sync_frames_ignored_total",
        "camera" => camera.to_string()
    )
    .increment(1);
}

/// 记录单个相机被重新触发
pub fn record_trigger(camera: &str) {
    counter!(
        "rig_sync_triggers_total",
        "camera" => camera.to_string()
    )
    .increment(1);
}

/// 记录一次 trigger_all 脉冲及其重新触发的相机数
pub fn record_trigger_pulse(armed: usize) {
    counter!("rig_sync_trigger_pulses_total").increment(1);
    gauge!("rig_sync_last_pulse_armed").set(armed as f64);
}

/// 记录当前订阅连接数
pub fn record_connection_count(rig: &str, count: u32) {
    gauge!(
        "rig_sync_connection_count",
        "rig" => rig.to_string()
    )
    .set(count as f64);
}

/// 相机渲染时间与处理时刻仿真时间之差 (毫秒)
pub fn record_capture_skew_ms(camera: &str, skew_ms: f64) {
    histogram!(
        "rig_sync_capture_skew_ms",
        "camera" => camera.to_string()
    )
    .record(skew_ms);
}

/// 立体对左右图像时间戳之差 (毫秒)
pub fn record_pair_skew_ms(skew_ms: f64) {
    counter!("rig_sync_pairs_total").increment(1);
    histogram!("rig_sync_pair_skew_ms").record(skew_ms.abs());
}

/// 记录发布端因队列满而丢弃的消息
pub fn record_publish_dropped(publisher: &str) {
    counter!(
        "rig_sync_publish_dropped_total",
        "publisher" => publisher.to_string()
    )
    .increment(1);
}

/// 发布结果聚合器
///
/// 在内存中聚合已发布的消息，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RigMetricsAggregator {
    /// 图像总数
    pub total_images: u64,

    /// CameraInfo 总数
    pub total_camera_infos: u64,

    /// 匹配成功的立体对
    pub pairs_matched: u64,

    /// 触发脉冲次数
    pub trigger_pulses: u64,

    /// 脉冲重新触发的相机总数
    pub units_armed: u64,

    /// 各相机图像数
    pub images_per_camera: HashMap<String, u64>,

    /// 各相机相邻两帧时间戳间隔 (毫秒)
    pub interval_stats: HashMap<String, RunningStats>,

    /// 立体对时间戳差 (毫秒)
    pub pair_skew_stats: RunningStats,

    last_stamp: HashMap<String, SimTime>,
}

impl RigMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条已发布的图像
    pub fn observe_image(&mut self, image: &ImageMessage) {
        self.total_images += 1;
        let camera = image.camera.to_string();

        if let Some(prev) = self.last_stamp.insert(camera.clone(), image.header.stamp) {
            self.interval_stats
                .entry(camera.clone())
                .or_default()
                .push((image.header.stamp - prev) * 1000.0);
        }
        *self.images_per_camera.entry(camera).or_insert(0) += 1;
    }

    pub fn observe_camera_info(&mut self, _info: &CameraInfoMessage) {
        self.total_camera_infos += 1;
    }

    /// 记录一个匹配成功的立体对
    pub fn observe_pair(&mut self, skew_ms: f64) {
        self.pairs_matched += 1;
        self.pair_skew_stats.push(skew_ms.abs());
    }

    pub fn observe_trigger_pulse(&mut self, armed: usize) {
        self.trigger_pulses += 1;
        self.units_armed += armed as u64;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_images: self.total_images,
            total_camera_infos: self.total_camera_infos,
            pairs_matched: self.pairs_matched,
            trigger_pulses: self.trigger_pulses,
            units_armed: self.units_armed,
            pair_skew_ms: StatsSummary::from(&self.pair_skew_stats),
            images_per_camera: self.images_per_camera.clone(),
            frame_interval_ms: self
                .interval_stats
                .iter()
                .map(|(camera, stats)| (camera.clone(), StatsSummary::from(stats)))
                .collect(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_images: u64,
    pub total_camera_infos: u64,
    pub pairs_matched: u64,
    pub trigger_pulses: u64,
    pub units_armed: u64,
    pub pair_skew_ms: StatsSummary,
    pub images_per_camera: HashMap<String, u64>,
    pub frame_interval_ms: HashMap<String, StatsSummary>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Rig Sync Summary ===")?;
        writeln!(f, "Images published: {}", self.total_images)?;
        writeln!(f, "Camera infos published: {}", self.total_camera_infos)?;
        writeln!(
            f,
            "Trigger pulses: {} (units armed: {})",
            self.trigger_pulses, self.units_armed
        )?;
        writeln!(f, "Stereo pairs: {}", self.pairs_matched)?;
        writeln!(f, "Pair skew (ms): {}", self.pair_skew_ms)?;

        if !self.images_per_camera.is_empty() {
            let mut cameras: Vec<_> = self.images_per_camera.iter().collect();
            cameras.sort();
            writeln!(f, "Per camera:")?;
            for (camera, count) in cameras {
                match self.frame_interval_ms.get(camera) {
                    Some(interval) => {
                        writeln!(f, "  {}: {} images, interval(ms) {}", camera, count, interval)?
                    }
                    None => writeln!(f, "  {}: {} images", camera, count)?,
                }
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
