//! Simulation engine
//!
//! [`Simulation`] owns the body population and the spatial index that
//! matches it. Each call to [`Simulation::step`] works from a frozen
//! snapshot:
//!
//! 1. every body is advanced independently, reading only pre-step
//!    positions and the pre-step index;
//! 2. the new bodies are committed in one go;
//! 3. the index is rebuilt from the committed positions for the next tick.
//!
//! Because step 1 never reads another body's new state, it can fan out over
//! the rayon pool without changing a single bit of the result.

use glam::DVec2;
use orrery_metrics::{time_scope, Counter, SystemProfiler};
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::body::{Body, BodyId};
use crate::boundary::{clamp_speed, reflect};
use crate::config::{EngineConfig, PopulationConfig};
use crate::error::{ensure_positive, Result};
use crate::force::pair_acceleration;
use crate::population::populate;
use crate::spatial::SpatialIndex;

/// Point-in-time summary of the population.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimStats {
    pub bodies: usize,
    /// Largest absolute velocity component over all bodies.
    pub max_velocity_component: f64,
    pub kinetic_energy: f64,
    /// Bodies currently past a plane edge.
    pub outside_plane: usize,
    /// Neighbor pairs evaluated during the last tick.
    pub interactions: u64,
}

pub struct Simulation {
    config: EngineConfig,
    bodies: Vec<Body>,
    index: SpatialIndex,
    tick_count: u64,
    elapsed: f64,
    last_interactions: u64,
    profiler: SystemProfiler,
    counters: Counter,
}

impl Simulation {
    /// Validate `config` and the bodies, then index the initial positions.
    pub fn new(config: EngineConfig, bodies: Vec<Body>) -> Result<Self> {
        config.validate()?;
        for body in &bodies {
            ensure_positive("body_mass", body.mass)?;
        }
        let index = SpatialIndex::build(&bodies, config.cell_size, config.plane)?;

        let (cols, rows) = index.dimensions();
        debug!(
            bodies = bodies.len(),
            cols,
            rows,
            parallel = config.parallel,
            "simulation ready"
        );

        Ok(Self {
            config,
            bodies,
            index,
            tick_count: 0,
            elapsed: 0.0,
            last_interactions: 0,
            profiler: SystemProfiler::new(),
            counters: Counter::new(),
        })
    }

    /// Generate a random population and build a simulation around it.
    pub fn from_population<R: Rng>(
        config: EngineConfig,
        population: &PopulationConfig,
        rng: &mut R,
    ) -> Result<Self> {
        config.validate()?;
        let bodies = populate(population, config.plane, rng)?;
        Self::new(config, bodies)
    }

    /// Advance every body by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, tick = self.tick_count, "stepping with non-positive or non-finite dt");
        }

        let snapshot = &self.bodies;
        let index = &self.index;
        let config = &self.config;
        let (next, interactions) = time_scope!(self.profiler, "integrate", {
            advance_all(snapshot, index, config, dt)
        });

        self.bodies = next;
        let bodies = &self.bodies;
        let index = &mut self.index;
        time_scope!(self.profiler, "rebuild_index", { index.rebuild(bodies) });

        self.tick_count += 1;
        self.elapsed += dt;
        self.last_interactions = interactions;
        self.counters.add("ticks", 1);
        self.counters.add("interactions", interactions);

        trace!(tick = self.tick_count, interactions, "tick complete");
    }

    /// Step `ticks` times with a fixed `dt`.
    pub fn run(&mut self, ticks: u64, dt: f64) {
        for _ in 0..ticks {
            self.step(dt);
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    /// Current positions in body order, for rendering.
    pub fn positions(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.bodies.iter().map(Body::position)
    }

    /// Index of the current positions.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn counters(&self) -> &Counter {
        &self.counters
    }

    pub fn stats(&self) -> SimStats {
        let plane = self.config.plane;
        self.bodies.iter().fold(
            SimStats {
                bodies: self.bodies.len(),
                interactions: self.last_interactions,
                ..SimStats::default()
            },
            |mut stats, body| {
                let v = body.velocity.abs();
                stats.max_velocity_component = stats.max_velocity_component.max(v.max_element());
                stats.kinetic_energy += body.kinetic_energy();
                if !plane.contains(body.position) {
                    stats.outside_plane += 1;
                }
                stats
            },
        )
    }
}

/// Advance every body against the same snapshot. Returns the new bodies in
/// order and the number of neighbor pairs evaluated.
fn advance_all(
    bodies: &[Body],
    index: &SpatialIndex,
    config: &EngineConfig,
    dt: f64,
) -> (Vec<Body>, u64) {
    let advance =
        |(i, body): (usize, &Body)| advance_body(BodyId(i), body, bodies, index, config, dt);

    let (next, counts): (Vec<Body>, Vec<u64>) = if config.parallel {
        bodies.par_iter().enumerate().map(advance).unzip()
    } else {
        bodies.iter().enumerate().map(advance).unzip()
    };
    (next, counts.into_iter().sum())
}

fn advance_body(
    id: BodyId,
    body: &Body,
    snapshot: &[Body],
    index: &SpatialIndex,
    config: &EngineConfig,
    dt: f64,
) -> (Body, u64) {
    // Explicit Euler: position moves with the pre-step velocity.
    let position = body.position + body.velocity * dt;
    let mut velocity = body.velocity;
    velocity.y -= config.gravity * dt;
    velocity *= config.damping;

    let mut interactions = 0;
    for other_id in index.neighbors_of(id) {
        let other = &snapshot[other_id.0];
        let accel = pair_acceleration(
            other.position - body.position,
            body.mass,
            other.mass,
            config.attraction,
            config.separation_floor,
        );
        velocity += accel * dt;
        interactions += 1;
    }

    let velocity = clamp_speed(reflect(position, velocity, config.plane), config.max_speed);
    (
        Body {
            position,
            velocity,
            mass: body.mass,
        },
        interactions,
    )
}
