//! Scheduler configuration.

use crate::SimError;
use tickbus_core::SimTime;

/// Timing of a simulation run, in simulated nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Last simulated time at which a tick may run (inclusive).
    pub run_time: SimTime,

    /// Fixed step between consecutive ticks. Must be non-zero.
    pub dt: SimTime,
}

impl SimConfig {
    /// Create a new configuration.
    pub fn new(run_time: SimTime, dt: SimTime) -> Self {
        Self { run_time, dt }
    }

    /// Set the total run time.
    pub fn with_run_time(mut self, run_time: SimTime) -> Self {
        self.run_time = run_time;
        self
    }

    /// Set the step size.
    pub fn with_dt(mut self, dt: SimTime) -> Self {
        self.dt = dt;
        self
    }

    /// Reject settings that would stall the scheduler.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.dt == 0 {
            return Err(SimError::ZeroStep);
        }
        Ok(())
    }

    /// Number of ticks a full run performs, or `None` if `dt` is zero.
    ///
    /// Ticks happen at `0, dt, 2·dt, ...` up to and including `run_time`.
    pub fn tick_count(&self) -> Option<u64> {
        if self.dt == 0 {
            return None;
        }
        Some(self.run_time / self.dt + 1)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(5, 1)
    }
}
