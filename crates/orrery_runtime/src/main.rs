//! Orrery Runtime
//!
//! Headless host for the simulation: loads settings, seeds a population and
//! drives the engine either at a fixed tick rate or by measured frame time,
//! logging what a renderer would otherwise draw.
//!
//! Usage: `orrery [settings.json]`

mod settings;

use std::env;
use std::path::Path;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use orrery_core::{Simulation, SimulationTime};
use orrery_metrics::TickTimer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use settings::{RunSettings, Settings, StepMode};

/// Bodies whose final position is logged at debug level.
const FINAL_POSITIONS_LOGGED: usize = 5;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Orrery v{}", orrery_core::VERSION);

    let settings = match env::args_os().nth(1) {
        Some(path) => Settings::load(Path::new(&path))?,
        None => Settings::default(),
    };
    let seed = settings.seed();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = Simulation::from_population(settings.engine, &settings.population, &mut rng)
        .context("failed to set up simulation")?;
    let (cols, rows) = sim.index().dimensions();
    info!(
        bodies = sim.bodies().len(),
        seed,
        cols,
        rows,
        "population created"
    );

    let mut clock = SimulationTime::new(settings.run.tick_rate_hz);
    let mut timer = TickTimer::new(120);
    run(&mut sim, &mut clock, &mut timer, &settings.run);

    let stats = sim.stats();
    info!(
        ticks = sim.tick_count(),
        simulated_secs = sim.elapsed(),
        kinetic_energy = stats.kinetic_energy,
        max_velocity = stats.max_velocity_component,
        "simulation finished"
    );
    for (phase, total) in sim.profiler().iter() {
        debug!(
            phase,
            total_ms = total.as_secs_f64() * 1000.0,
            calls = sim.profiler().calls(phase),
            "phase timing"
        );
    }
    for (counter, total) in sim.counters().iter() {
        debug!(counter, total, "counter");
    }
    for (i, p) in sim.positions().take(FINAL_POSITIONS_LOGGED).enumerate() {
        debug!(body = i, x = p.x, y = p.y, "final position");
    }

    Ok(())
}

fn run(
    sim: &mut Simulation,
    clock: &mut SimulationTime,
    timer: &mut TickTimer,
    settings: &RunSettings,
) {
    match settings.step {
        StepMode::Fixed => run_fixed(sim, clock, timer, settings),
        StepMode::Measured => run_measured(sim, clock, timer, settings),
    }
}

fn run_fixed(
    sim: &mut Simulation,
    clock: &mut SimulationTime,
    timer: &mut TickTimer,
    settings: &RunSettings,
) {
    let dt = clock.dt();
    let mut last_frame = Instant::now();

    while !finished(settings, clock) {
        let due = if settings.realtime {
            let now = Instant::now();
            let due = clock.accumulate(now - last_frame);
            last_frame = now;
            if due == 0 {
                thread::sleep(clock.tick_duration() / 4);
                continue;
            }
            due
        } else {
            1
        };

        for _ in 0..due {
            if finished(settings, clock) {
                break;
            }
            timer.begin();
            sim.step(dt);
            timer.end();
            clock.advance_tick();
            maybe_report(sim, clock, timer, settings);
        }
    }
}

/// Step by the wall time between frames, sleeping so frames come no faster
/// than the tick rate.
fn run_measured(
    sim: &mut Simulation,
    clock: &mut SimulationTime,
    timer: &mut TickTimer,
    settings: &RunSettings,
) {
    let mut last_frame = Instant::now();

    while !finished(settings, clock) {
        let since = last_frame.elapsed();
        if since < clock.tick_duration() {
            thread::sleep(clock.tick_duration() - since);
        }
        let now = Instant::now();
        let dt = clock.advance_measured(now.duration_since(last_frame));
        last_frame = now;

        timer.begin();
        sim.step(dt);
        timer.end();
        maybe_report(sim, clock, timer, settings);
    }
}

fn maybe_report(
    sim: &Simulation,
    clock: &SimulationTime,
    timer: &TickTimer,
    settings: &RunSettings,
) {
    if settings.report_every > 0 && clock.tick_count() % settings.report_every == 0 {
        report(sim, timer);
    }
}

fn finished(settings: &RunSettings, clock: &SimulationTime) -> bool {
    settings
        .ticks
        .is_some_and(|limit| clock.tick_count() >= limit)
}

fn report(sim: &Simulation, timer: &TickTimer) {
    let stats = sim.stats();
    let occupancy = sim.index().occupancy();
    let (min_ms, max_ms) = timer.tick_time_range_ms();
    info!(
        tick = sim.tick_count(),
        interactions = stats.interactions,
        occupied_cells = occupancy.occupied_cells,
        largest_bucket = occupancy.largest_bucket,
        off_grid = occupancy.off_grid,
        max_velocity = stats.max_velocity_component,
        kinetic_energy = stats.kinetic_energy,
        outside_plane = stats.outside_plane,
        tick_ms = timer.tick_time_ms(),
        min_ms,
        max_ms,
        ticks_per_sec = timer.ticks_per_second(),
        "status"
    );
}
