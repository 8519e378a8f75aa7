//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! camera roles, raw frames, outbound messages, and the traits standing in
//! for the simulator, the middleware runtime and the publish path.
//! Business crates depend on this crate only, never on each other's internals.
//!
//! ## Time Model
//! - Simulation time in seconds (`f64`) is the only clock
//! - Image stamps come from the camera's own last update, not from the
//!   moment a callback happens to run

mod camera_id;
mod camera_source;
mod config;
mod error;
mod frame;
mod publish;
mod role;
mod runtime;

pub use camera_id::CameraId;
pub use camera_source::{CameraSource, FrameCallback, ImageGeometry, RigSensor, MAX_FRAME_BYTES};
pub use config::*;
pub use error::*;
pub use frame::*;
pub use publish::FramePublisher;
pub use role::{CameraRole, ROLE_KEYWORDS};
pub use runtime::{MiddlewareRuntime, SimClock, SimTime};
