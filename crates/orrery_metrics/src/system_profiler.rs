//! Accumulated timings for named engine phases

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy)]
struct PhaseTiming {
    total: Duration,
    calls: u64,
}

#[derive(Debug, Default)]
pub struct SystemProfiler {
    phases: BTreeMap<&'static str, PhaseTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and add its wall time to the `name` phase.
    pub fn time_system<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let phase = self.phases.entry(name).or_default();
        phase.total += start.elapsed();
        phase.calls += 1;
        result
    }

    pub fn calls(&self, name: &str) -> u64 {
        self.phases.get(name).map(|p| p.calls).unwrap_or(0)
    }

    /// Total time per phase, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.phases.iter().map(|(name, p)| (*name, p.total))
    }
}
