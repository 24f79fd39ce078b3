//! Fixed-timestep clock
//!
//! The engine advances in fixed ticks; the host loop feeds wall-clock time
//! into [`SimulationTime::accumulate`] to learn how many ticks are due.
//! Hosts that prefer to step by measured frame time use
//! [`SimulationTime::advance_measured`] instead.

use std::time::Duration;

/// Default simulation tick rate (30 Hz)
pub const DEFAULT_TICK_RATE_HZ: u32 = 30;

/// Ticks `accumulate` will hand out for a single call. Anything beyond is
/// dropped so one long stall cannot snowball.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationTime {
    dt: f64,
    tick_duration: Duration,
    tick_count: u64,
    accumulated_time: Duration,
    pending: Duration,
}

impl SimulationTime {
    /// A zero rate is treated as 1 Hz.
    pub fn new(tick_rate_hz: u32) -> Self {
        let dt = 1.0 / f64::from(tick_rate_hz.max(1));
        Self {
            dt,
            tick_duration: Duration::from_secs_f64(dt),
            tick_count: 0,
            accumulated_time: Duration::ZERO,
            pending: Duration::ZERO,
        }
    }

    /// Seconds per tick, as passed to `Simulation::step`.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_duration;
    }

    /// Count a tick whose length is the measured `elapsed` wall time and
    /// return its `dt` in seconds.
    ///
    /// The step is capped at [`MAX_CATCH_UP_TICKS`] fixed ticks so a stall
    /// cannot launch bodies across the plane.
    pub fn advance_measured(&mut self, elapsed: Duration) -> f64 {
        let step = elapsed.min(self.tick_duration * MAX_CATCH_UP_TICKS);
        self.tick_count += 1;
        self.accumulated_time += step;
        step.as_secs_f64()
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }

    /// Add `elapsed` wall time and return how many ticks are now due.
    ///
    /// Remainders smaller than a tick carry over to the next call.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed;
        let mut due = 0;
        while self.pending >= self.tick_duration {
            self.pending -= self.tick_duration;
            due += 1;
            if due == MAX_CATCH_UP_TICKS {
                self.pending = Duration::ZERO;
                break;
            }
        }
        due
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}
