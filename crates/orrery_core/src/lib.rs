//! Orrery Core
//!
//! Grid-accelerated point-mass simulation:
//! - Uniform-grid spatial index with 3×3 neighbor queries
//! - Pairwise attraction, uniform downward gravity, explicit Euler steps
//! - Edge reflection and per-axis speed clamping
//! - Fixed-timestep clock for host loops

pub mod body;
pub mod boundary;
pub mod config;
pub mod engine;
pub mod error;
pub mod force;
pub mod population;
pub mod spatial;
pub mod time;

pub use glam;

pub use body::{Body, BodyId};
pub use config::{EngineConfig, Plane, PopulationConfig};
pub use engine::{SimStats, Simulation};
pub use error::{Result, SimError};
pub use population::{create_population, populate};
pub use spatial::{CellCoord, Neighbors, Occupancy, SpatialIndex};
pub use time::SimulationTime;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
