//! SimulationConfig - Config Loader 输出
//!
//! 描述完整的运行配置：rig 参数、相机、仿真步进、触发节奏、发布方式。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ImageGeometry, PixelFormat};

/// 完整的运行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rig 插件参数
    pub rig: RigParams,

    /// 相机定义列表（声明顺序即加载顺序）
    #[serde(default)]
    pub cameras: Vec<CameraSpec>,

    /// 仿真时钟与渲染设置
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// 外部触发节奏
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// 发布方式
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// Rig 插件参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigParams {
    /// 父传感器名称
    #[serde(default = "default_rig_name")]
    pub name: String,

    /// Topic 命名空间
    #[serde(default = "default_camera_name", alias = "cameraName")]
    pub camera_name: String,

    /// 坐标系名称
    #[serde(default = "default_frame_name", alias = "frameName")]
    pub frame_name: String,

    #[serde(default = "default_image_topic", alias = "imageTopicName")]
    pub image_topic_name: String,

    #[serde(default = "default_camera_info_topic", alias = "cameraInfoTopicName")]
    pub camera_info_topic_name: String,

    /// 右相机基线 (米)，缺省为 0.0
    #[serde(default, alias = "hackBaseline")]
    pub hack_baseline: Option<f64>,
}

impl Default for RigParams {
    fn default() -> Self {
        Self {
            name: default_rig_name(),
            camera_name: default_camera_name(),
            frame_name: default_frame_name(),
            image_topic_name: default_image_topic(),
            camera_info_topic_name: default_camera_info_topic(),
            hack_baseline: None,
        }
    }
}

fn default_rig_name() -> String {
    "multicamera".to_string()
}

fn default_camera_name() -> String {
    "multicamera".to_string()
}

fn default_frame_name() -> String {
    "world".to_string()
}

fn default_image_topic() -> String {
    "image_raw".to_string()
}

fn default_camera_info_topic() -> String {
    "camera_info".to_string()
}

/// 相机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSpec {
    /// 相机名称（用于角色识别）
    pub name: String,

    /// 图像宽度，必须 > 0
    pub width: u32,

    /// 图像高度，必须 > 0
    pub height: u32,

    /// 像素格式
    #[serde(default)]
    pub format: PixelFormat,
}

impl CameraSpec {
    pub fn geometry(&self) -> ImageGeometry {
        ImageGeometry {
            width: self.width,
            height: self.height,
            depth: self.format.depth(),
            format: self.format.clone(),
        }
    }
}

/// 仿真设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// 仿真时钟步长 (秒)
    #[serde(default = "default_step_sec")]
    pub step_sec: f64,

    /// 每个相机的渲染频率 (Hz)
    #[serde(default = "default_render_rate")]
    pub render_rate_hz: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            step_sec: default_step_sec(),
            render_rate_hz: default_render_rate(),
        }
    }
}

impl SimulationSettings {
    /// 时钟步长对应的实际时长，不可表示或为零时返回 `None`
    pub fn step_interval(&self) -> Option<Duration> {
        positive_duration(self.step_sec)
    }

    /// 渲染周期
    pub fn render_period(&self) -> Option<Duration> {
        positive_duration(1.0 / self.render_rate_hz)
    }
}

fn default_step_sec() -> f64 {
    0.001
}

fn default_render_rate() -> f64 {
    30.0
}

/// 外部触发节奏
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// 触发频率 (Hz)，必须 > 0
    #[serde(default = "default_trigger_rate")]
    pub rate_hz: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_trigger_rate(),
        }
    }
}

impl TriggerConfig {
    /// 触发周期
    pub fn period(&self) -> Option<Duration> {
        positive_duration(1.0 / self.rate_hz)
    }
}

fn default_trigger_rate() -> f64 {
    10.0
}

/// A non-zero `Duration` of `secs` seconds, `None` when out of range
fn positive_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
}

/// 发布配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub kind: PublisherKind,

    /// 通道容量 (仅 channel)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: PublisherKind::default(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

/// 发布方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    /// 仅记录日志
    #[default]
    Log,
    /// 发送到有界通道
    Channel,
}
