//! Engine and population configuration
//!
//! Defaults reproduce the classic 800x500 demo: 100 bodies of mass 20 on a
//! 100-unit grid, pulled down at 10 units/s² and capped at 100 units/s per
//! axis.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, Result, SimError};
use crate::spatial::{grid_dimensions, MAX_GRID_CELLS};

/// Extent of the simulation plane. The origin is the lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plane {
    pub width: f64,
    pub height: f64,
}

impl Plane {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("plane.width", self.width)?;
        ensure_positive("plane.height", self.height)
    }

    /// Inclusive on every edge, matching the reflection test in `boundary`.
    pub fn contains(&self, position: DVec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(800.0, 500.0)
    }
}

/// Physical constants and tuning for [`Simulation`](crate::Simulation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub plane: Plane,
    /// Grid granularity of the spatial index.
    pub cell_size: f64,
    /// Pairwise attraction constant.
    pub attraction: f64,
    /// Uniform downward acceleration.
    pub gravity: f64,
    /// Per-axis velocity cap.
    pub max_speed: f64,
    /// Velocity multiplier applied once per tick after gravity. `1.0` keeps
    /// every bit of momentum.
    pub damping: f64,
    /// Lower bound applied to squared separation before the force division.
    pub separation_floor: f64,
    /// Spread the force phase across the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plane: Plane::default(),
            cell_size: 100.0,
            attraction: 20.0,
            gravity: 10.0,
            max_speed: 100.0,
            damping: 1.0,
            separation_floor: 1e-6,
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.plane.validate()?;
        validate_grid(self.cell_size, self.plane)?;
        ensure_finite("attraction", self.attraction)?;
        ensure_finite("gravity", self.gravity)?;
        ensure_non_negative("max_speed", self.max_speed)?;
        ensure_non_negative("damping", self.damping)?;
        if self.damping > 1.0 {
            return Err(SimError::invalid("damping", self.damping, "must not exceed 1"));
        }
        ensure_positive("separation_floor", self.separation_floor)
    }

    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Cell size and plane must give a grid that is positive and bounded.
pub(crate) fn validate_grid(cell_size: f64, plane: Plane) -> Result<()> {
    ensure_positive("cell_size", cell_size)?;
    plane.validate()?;
    let (cols, rows) = grid_dimensions(cell_size, plane);
    if cols.saturating_mul(rows) > MAX_GRID_CELLS {
        return Err(SimError::invalid(
            "cell_size",
            cell_size,
            "too small for the plane; grid would exceed the cell limit",
        ));
    }
    Ok(())
}

/// How the initial population is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub count: usize,
    pub body_mass: f64,
    /// Exclusive upper bound of each initial velocity component.
    pub max_initial_speed: f64,
    /// Seed for the host's RNG. The engine never reads it: population
    /// builders take whatever generator the caller hands them.
    pub seed: Option<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            count: 100,
            body_mass: 20.0,
            max_initial_speed: 10.0,
            seed: None,
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("body_mass", self.body_mass)?;
        ensure_non_negative("max_initial_speed", self.max_initial_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(PopulationConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        for cell_size in [0.0, -10.0, f64::NAN] {
            let config = EngineConfig {
                cell_size,
                ..Default::default()
            };
            assert_eq!(config.validate().unwrap_err().field(), Some("cell_size"));
        }
    }

    #[test]
    fn rejects_non_positive_plane() {
        let config = EngineConfig {
            plane: Plane::new(800.0, 0.0),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("plane.height"));

        let config = EngineConfig {
            plane: Plane::new(-1.0, 500.0),
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("plane.width"));
    }

    #[test]
    fn rejects_grid_that_is_too_fine() {
        let config = EngineConfig {
            cell_size: 1e-3,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("cell_size"));
    }

    #[test]
    fn rejects_bad_speed_and_floor() {
        let config = EngineConfig {
            max_speed: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("max_speed"));

        let config = EngineConfig {
            separation_floor: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("separation_floor")
        );
    }

    #[test]
    fn damping_must_lie_in_unit_interval() {
        for damping in [-0.1, 1.5, f64::NAN] {
            let config = EngineConfig {
                damping,
                ..Default::default()
            };
            assert_eq!(config.validate().unwrap_err().field(), Some("damping"));
        }
        let config = EngineConfig {
            damping: 0.995,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_mass() {
        let population = PopulationConfig {
            body_mass: 0.0,
            ..Default::default()
        };
        assert_eq!(population.validate().unwrap_err().field(), Some("body_mass"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "cell_size": 50.0, "plane": { "width": 200.0 } }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.cell_size, 50.0);
        assert_eq!(config.plane, Plane::new(200.0, 500.0));
        assert_eq!(config.gravity, 10.0);
        assert_eq!(config.damping, 1.0);
        assert!(config.parallel);
    }

    #[test]
    fn json_is_validated() {
        let err = EngineConfig::from_json(r#"{ "cell_size": 0.0 }"#).unwrap_err();
        assert_eq!(err.field(), Some("cell_size"));

        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }

    #[test]
    fn plane_contains_is_inclusive() {
        let plane = Plane::new(10.0, 5.0);
        assert!(plane.contains(DVec2::new(0.0, 0.0)));
        assert!(plane.contains(DVec2::new(10.0, 5.0)));
        assert!(!plane.contains(DVec2::new(-0.1, 2.0)));
        assert!(!plane.contains(DVec2::new(3.0, 5.1)));
    }
}
