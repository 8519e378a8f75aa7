//! Manually stepped simulation clock

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{SimClock, SimTime};

/// Shared simulation clock.
///
/// Time is stored as the bit pattern of an `f64` so reads never block.
#[derive(Debug, Default)]
pub struct SimulationClock {
    bits: AtomicU64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(t: SimTime) -> Self {
        Self {
            bits: AtomicU64::new(t.to_bits()),
        }
    }

    pub fn now(&self) -> SimTime {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    pub fn set(&self, t: SimTime) {
        self.bits.store(t.to_bits(), Ordering::Release);
    }

    /// Advance by `dt` seconds, returning the new time
    pub fn advance(&self, dt: SimTime) -> SimTime {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(current) + dt).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => current = actual,
            }
        }
    }
}

impl SimClock for SimulationClock {
    fn sim_time(&self) -> SimTime {
        self.now()
    }
}
