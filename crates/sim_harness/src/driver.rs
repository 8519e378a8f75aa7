//! SimulationDriver - background clock stepping and rig updates
//!
//! One thread steps the clock in real time. A second thread runs the rig's
//! update cycle: once per render period it stamps the parent sensor and
//! renders every enabled camera, so cameras of one rig rendered in the same
//! cycle share the parent's update time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use contracts::{RigSensor, SimTime, SimulationSettings};
use tracing::{debug, error, info, instrument};

use crate::clock::SimulationClock;
use crate::error::{HarnessError, Result};
use crate::rig_sensor::MockRigSensor;

/// Running simulation
pub struct SimulationDriver {
    running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl SimulationDriver {
    /// Start the clock stepper and the rig update thread
    #[instrument(
        name = "simulation_driver_start",
        skip(sensor, clock, settings),
        fields(
            rig = %sensor.name(),
            step_sec = settings.step_sec,
            render_rate_hz = settings.render_rate_hz
        )
    )]
    pub fn start(
        sensor: Arc<MockRigSensor>,
        clock: Arc<SimulationClock>,
        settings: &SimulationSettings,
    ) -> Result<Self> {
        let interval = settings
            .step_interval()
            .ok_or(HarnessError::InvalidTiming {
                field: "simulation.step_sec",
                value: settings.step_sec,
            })?;
        let render_period = settings
            .render_period()
            .ok_or(HarnessError::InvalidTiming {
                field: "simulation.render_rate_hz",
                value: settings.render_rate_hz,
            })?;

        let mut driver = Self {
            running: Arc::new(AtomicBool::new(true)),
            handles: Vec::new(),
        };

        let step = settings.step_sec;
        {
            let running = driver.running.clone();
            let clock = clock.clone();
            let handle = thread::Builder::new()
                .name("sim-clock".into())
                .spawn(move || {
                    while running.load(Ordering::Relaxed) {
                        thread::sleep(interval);
                        clock.advance(step);
                    }
                })?;
            driver.handles.push(handle);
        }

        let rig_name = sensor.name().to_string();
        let running = driver.running.clone();
        let spawned = thread::Builder::new()
            .name(format!("render-{}", rig_name))
            .spawn(move || update_loop(&sensor, &clock, render_period, &running));

        match spawned {
            Ok(handle) => driver.handles.push(handle),
            Err(e) => {
                // the clock thread is joined by Drop
                error!(rig = %rig_name, error = %e, "failed to start update thread");
                return Err(e.into());
            }
        }

        info!(threads = driver.handles.len(), "simulation started");
        Ok(driver)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop all threads and wait for them
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("simulation thread panicked");
            }
        }
        debug!("simulation stopped");
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.shutdown();
        }
    }
}

fn update_loop(
    sensor: &MockRigSensor,
    clock: &SimulationClock,
    render_period: Duration,
    running: &AtomicBool,
) {
    let period: SimTime = render_period.as_secs_f64();
    let poll = (render_period / 4).clamp(Duration::from_micros(500), Duration::from_millis(10));
    let mut last_tick: Option<u64> = None;
    let mut rendered = 0usize;

    debug!(rig = %sensor.name(), period, "update thread started");

    while running.load(Ordering::Relaxed) {
        let tick = (clock.now() / period).floor() as u64;

        if last_tick != Some(tick) {
            last_tick = Some(tick);
            rendered += sensor.update(tick as f64 * period);
        }
        thread::sleep(poll);
    }

    debug!(rig = %sensor.name(), frames = rendered, "update thread stopped");
}
