//! Per-frame simulation tick
//!
//! Binds one spawn scheduler to one trajectory engine and runs the frame
//! order: maybe spawn, advance, drop inactive projectiles.

use super::engine::TrajectoryEngine;
use super::spawn::SpawnScheduler;
use super::state::{MarkerLog, SimEvent};
use crate::config::SimConfig;
use crate::error::SimError;

/// Engine and scheduler driven by one config
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimConfig,
    pub engine: TrajectoryEngine,
    pub scheduler: SpawnScheduler,
    /// Total simulated seconds
    pub elapsed: f32,
    /// Projectiles spawned so far
    pub spawned: u32,
}

impl Simulation {
    /// Validate the config and build a fresh simulation
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let seed = config.effective_seed();
        log::info!(
            "Simulation created: seed={}, launch={:?}, velocity={:?}, cadence={:?} every {}s, gravity={:?}",
            seed,
            config.launch,
            config.velocity,
            config.cadence,
            config.spawn_interval,
            config.gravity
        );
        Ok(Self {
            engine: TrajectoryEngine::new(config.engine_params(), seed)?,
            scheduler: config.scheduler()?,
            config,
            elapsed: 0.0,
            spawned: 0,
        })
    }

    /// Stop the run and hand back its markers
    pub fn shutdown(self) -> MarkerLog {
        log::info!(
            "Simulation stopped after {:.2}s, {} projectile(s) spawned",
            self.elapsed,
            self.spawned
        );
        self.engine.shutdown()
    }
}

/// Advance the simulation by one frame of `dt` seconds
///
/// At most one projectile is spawned per call. A spawn whose launch
/// direction is undefined aborts the frame before anything moves.
pub fn tick(sim: &mut Simulation, dt: f32) -> Result<Vec<SimEvent>, SimError> {
    let mut events = Vec::new();

    if sim.scheduler.update(dt, sim.engine.active_count()) {
        let request = sim.scheduler.next_launch(sim.engine.dome())?;
        let id = sim.engine.spawn(request.position, request.velocity);
        sim.spawned += 1;
        events.push(SimEvent::Spawned {
            id,
            position: request.position,
            velocity: request.velocity,
        });
    }

    events.extend(sim.engine.advance(dt));
    sim.elapsed += dt;

    Ok(events)
}
