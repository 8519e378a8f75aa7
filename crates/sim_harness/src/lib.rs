//! # Sim Harness
//!
//! 仿真器替身：无需真实仿真器即可驱动 rig。
//!
//! 负责：
//! - `SimulationClock`：手动推进的仿真时钟
//! - `MockRigSensor` / `MockCamera`：父传感器与相机
//! - `MockRuntime`：可设置的中间件就绪标志
//! - `RigFactory`：按配置构建 mock rig
//! - `SimulationDriver`：后台时钟步进与按帧率更新 rig

mod camera;
mod clock;
mod driver;
mod error;
mod factory;
mod rig_sensor;
mod runtime;

pub use camera::MockCamera;
pub use clock::SimulationClock;
pub use driver::SimulationDriver;
pub use error::{HarnessError, Result};
pub use factory::RigFactory;
pub use rig_sensor::MockRigSensor;
pub use runtime::MockRuntime;
