//! Simulation clock and middleware runtime handles.

/// Simulation time in seconds
pub type SimTime = f64;

/// Source of the simulator's current simulation time
pub trait SimClock: Send + Sync {
    fn sim_time(&self) -> SimTime;
}

/// Readiness of the messaging runtime the bridge publishes into.
///
/// Passed explicitly to the rig loader so the precondition can be checked
/// without a live middleware process.
pub trait MiddlewareRuntime: Send + Sync {
    fn is_initialized(&self) -> bool;
}

/// A plain flag is the simplest runtime handle.
impl MiddlewareRuntime for bool {
    fn is_initialized(&self) -> bool {
        *self
    }
}
