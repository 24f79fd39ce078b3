//! Point-mass bodies

use glam::DVec2;

use crate::error::{ensure_positive, Result};

/// Stable handle of a body: its slot in the engine's body array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point mass. Mass is fixed at creation; position and velocity are
/// advanced by the engine once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub(crate) position: DVec2,
    pub(crate) velocity: DVec2,
    pub(crate) mass: f64,
}

impl Body {
    pub fn new(position: DVec2, velocity: DVec2, mass: f64) -> Result<Self> {
        ensure_positive("body_mass", mass)?;
        Ok(Self {
            position,
            velocity,
            mass,
        })
    }

    /// A body at rest.
    pub fn at_rest(position: DVec2, mass: f64) -> Result<Self> {
        Self::new(position, DVec2::ZERO, mass)
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}
