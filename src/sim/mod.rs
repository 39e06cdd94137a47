//! Trajectory simulation module
//!
//! All projectile logic lives here. Nothing in this module renders, blocks
//! or touches the platform:
//! - Caller-supplied `dt` only
//! - Seeded RNG only
//! - Working set iterated in spawn order

pub mod crossing;
pub mod dome;
pub mod engine;
pub mod spawn;
pub mod state;
pub mod tick;

pub use crossing::{Boundary, Crossings, crossed_inward, detect_crossings};
pub use dome::{Dome, Zone, ZoneModel};
pub use engine::{EngineParams, TrajectoryEngine};
pub use spawn::{Cadence, LaunchGeometry, RingHeight, SpawnRequest, SpawnScheduler, VelocityPolicy};
pub use state::{
    DeactivationReason, ImpactMarker, MarkerKind, MarkerLog, Projectile, SimEvent, Trail,
    TrailSegment,
};
pub use tick::{Simulation, tick};
