//! Runtime settings

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use orrery_core::time::DEFAULT_TICK_RATE_HZ;
use orrery_core::{EngineConfig, PopulationConfig};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when the settings carry no seed.
pub const SEED_ENV: &str = "ORRERY_SEED";

/// Everything the headless runner needs, loadable from one JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub population: PopulationConfig,
    pub run: RunSettings,
}

/// How the length of each tick is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Every tick advances by exactly `1 / tick_rate_hz`.
    #[default]
    Fixed,
    /// Every tick advances by the wall time since the previous one, paced to
    /// at most `tick_rate_hz`.
    Measured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub tick_rate_hz: u32,
    pub step: StepMode,
    /// Stop after this many ticks; `None` runs until interrupted.
    pub ticks: Option<u64>,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
    /// Log a status line every this many ticks.
    pub report_every: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            step: StepMode::Fixed,
            ticks: Some(300),
            realtime: false,
            report_every: 30,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("malformed settings JSON")?;
        settings.engine.validate()?;
        settings.population.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Seed from the settings, then `ORRERY_SEED`, then 1.
    pub fn seed(&self) -> u64 {
        self.population
            .seed
            .or_else(|| env::var(SEED_ENV).ok().and_then(|s| s.parse().ok()))
            .unwrap_or(1)
    }
}
