//! Cross-camera shared state.
//!
//! One instance per rig. Every trigger unit holds a handle to it; all
//! reads and writes go through a single mutex held only for the update.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::RigSensor;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    connection_count: u32,
    was_active: bool,
}

/// Point-in-time copy of the shared counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub connection_count: u32,
    pub was_active: bool,
}

/// Subscriber count and activity memory shared by all cameras of a rig
#[derive(Debug, Default)]
pub struct SyncState {
    counters: Mutex<Counters>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    // Counters stay valid even if a holder panicked, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Increment the connection count, returning the new value
    pub fn increment(&self) -> u32 {
        let mut counters = self.lock();
        counters.connection_count = counters.connection_count.saturating_add(1);
        counters.connection_count
    }

    /// Decrement the connection count, returning the new value.
    ///
    /// Saturates at zero; an unmatched decrement is logged and ignored.
    pub fn decrement(&self) -> u32 {
        let mut counters = self.lock();
        if counters.connection_count == 0 {
            warn!("connection count decrement without matching increment");
            return 0;
        }
        counters.connection_count -= 1;
        counters.connection_count
    }

    pub fn connection_count(&self) -> u32 {
        self.lock().connection_count
    }

    pub fn was_active(&self) -> bool {
        self.lock().was_active
    }

    pub fn set_was_active(&self, was_active: bool) {
        self.lock().was_active = was_active;
    }

    /// A subscriber connected to any camera of the rig.
    ///
    /// The first subscriber remembers whether the sensor was active on its
    /// own, then the sensor is forced active.
    pub fn connect(&self, sensor: &dyn RigSensor) -> u32 {
        let mut counters = self.lock();
        if counters.connection_count == 0 {
            counters.was_active = sensor.is_active();
        }
        counters.connection_count = counters.connection_count.saturating_add(1);
        sensor.set_active(true);
        counters.connection_count
    }

    /// A subscriber disconnected.
    ///
    /// When the last one leaves, the sensor goes back to the activity it had
    /// before the first subscriber arrived.
    pub fn disconnect(&self, sensor: &dyn RigSensor) -> u32 {
        let mut counters = self.lock();
        if counters.connection_count == 0 {
            warn!(sensor = %sensor.name(), "disconnect without matching connect");
            return 0;
        }
        counters.connection_count -= 1;
        if counters.connection_count == 0 {
            sensor.set_active(counters.was_active);
        }
        counters.connection_count
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let counters = self.lock();
        SyncSnapshot {
            connection_count: counters.connection_count,
            was_active: counters.was_active,
        }
    }
}
