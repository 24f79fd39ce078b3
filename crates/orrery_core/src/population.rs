//! Random initial populations

use glam::DVec2;
use rand::Rng;

use crate::body::Body;
use crate::config::{Plane, PopulationConfig};
use crate::error::{ensure_non_negative, ensure_positive, Result};

/// Scatter `count` bodies uniformly over `plane`.
///
/// Each velocity component is drawn from `[0, max_initial_speed)`, so every
/// body starts drifting right and up (or is at rest).
pub fn create_population<R: Rng>(
    count: usize,
    plane: Plane,
    max_initial_speed: f64,
    mass: f64,
    rng: &mut R,
) -> Result<Vec<Body>> {
    plane.validate()?;
    ensure_non_negative("max_initial_speed", max_initial_speed)?;
    ensure_positive("body_mass", mass)?;

    (0..count)
        .map(|_| {
            let position = DVec2::new(
                plane.width * rng.gen::<f64>(),
                plane.height * rng.gen::<f64>(),
            );
            let velocity = DVec2::new(
                max_initial_speed * rng.gen::<f64>(),
                max_initial_speed * rng.gen::<f64>(),
            );
            Body::new(position, velocity, mass)
        })
        .collect()
}

/// [`create_population`] driven by a [`PopulationConfig`].
pub fn populate<R: Rng>(
    config: &PopulationConfig,
    plane: Plane,
    rng: &mut R,
) -> Result<Vec<Body>> {
    config.validate()?;
    create_population(
        config.count,
        plane,
        config.max_initial_speed,
        config.body_mass,
        rng,
    )
}
