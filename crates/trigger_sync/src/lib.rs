//! # Trigger Sync
//!
//! Shutter synchronization for a rig of triggered cameras.
//!
//! 负责：
//! - 按名称关键字识别相机角色 (left → reference, right → secondary)
//! - 每个相机一个 `TriggerUnit`：收帧 → 发布 → 解除触发
//! - 所有相机共享一个 `SyncState`（订阅计数 + was_active）
//! - 显式的外部重新触发接口
//!
//! ## 使用示例
//!
//! ```ignore
//! use trigger_sync::{LoadContext, RigController};
//!
//! let ctx = LoadContext::new(Arc::new(true), clock, publisher);
//! let rig = RigController::load(sensor, &params, &ctx)?;
//!
//! // external cadence policy
//! rig.trigger_all();
//! ```

mod classify;
mod error;
mod rig;
mod sync_state;
mod trigger_unit;

pub use classify::{baseline_for, classify, classify_all, ROLE_KEYWORDS};
pub use error::{Result, RigError};
pub use rig::{LoadContext, Rig, RigController, RigSnapshot};
pub use sync_state::{SyncSnapshot, SyncState};
pub use trigger_unit::{
    FrameOutcome, TopicBinding, TriggerState, TriggerUnit, UnitContext, UnitSnapshot,
};

pub use contracts::{CameraRole, RigParams};
