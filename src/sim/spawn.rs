//! Spawn scheduling: when to launch, from where, and how fast
//!
//! Launch geometry and velocity policy are independent choices; the
//! scheduler combines them with a cadence and its own seeded RNG.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::dome::Dome;
use super::state::RngState;
use crate::error::SimError;
use crate::{ring_point, spherical_to_cartesian};

/// Vertical placement for ring launches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RingHeight {
    Fixed(f32),
    Range { min: f32, max: f32 },
}

impl RingHeight {
    fn sample(&self, rng: &mut Pcg32) -> f32 {
        match *self {
            RingHeight::Fixed(y) => y,
            RingHeight::Range { min, max } => rng.random_range(min..=max),
        }
    }
}

/// Where new projectiles appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LaunchGeometry {
    /// Horizontal circle of radius `outer + margin` around the vertical axis
    Ring { margin: f32, height: RingHeight },
    /// Sphere of radius `outer + margin` around the center
    Shell { margin: f32 },
    /// Disc of radius `outer`, `margin` above the outer dome apex
    TopDisc { margin: f32 },
}

impl LaunchGeometry {
    /// Sample one launch position
    pub fn sample(&self, dome: &Dome, rng: &mut Pcg32) -> Vec3 {
        match *self {
            LaunchGeometry::Ring { margin, height } => {
                let angle = rng.random_range(0.0..TAU);
                let y = height.sample(rng);
                let offset = ring_point(dome.spawn_radius(margin), angle, 0.0);
                Vec3::new(dome.center.x + offset.x, y, dome.center.z + offset.z)
            }
            LaunchGeometry::Shell { margin } => {
                let polar = rng.random_range(0.0..=PI);
                let azimuth = rng.random_range(0.0..TAU);
                dome.center + spherical_to_cartesian(dome.spawn_radius(margin), polar, azimuth)
            }
            LaunchGeometry::TopDisc { margin } => {
                let r = rng.random_range(0.0..=dome.outer_radius);
                let angle = rng.random_range(0.0..TAU);
                let offset = ring_point(r, angle, 0.0);
                Vec3::new(
                    dome.center.x + offset.x,
                    dome.apex_height() + margin,
                    dome.center.z + offset.z,
                )
            }
        }
    }
}

/// Initial velocity rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VelocityPolicy {
    /// `(0, -speed, 0)`
    StraightDown,
    /// Toward the dome center at `speed`
    AimedAtCenter,
    /// Aimed, then the vertical component is replaced by `vertical`
    AimedWithOverride { vertical: f32 },
}

impl VelocityPolicy {
    /// Initial velocity for a projectile launched at `position`
    ///
    /// Fails when the aim direction is undefined (spawn on the center).
    pub fn initial_velocity(&self, position: Vec3, dome: &Dome, speed: f32) -> Result<Vec3, SimError> {
        match *self {
            VelocityPolicy::StraightDown => Ok(Vec3::new(0.0, -speed, 0.0)),
            VelocityPolicy::AimedAtCenter => Ok(aim_at(position, dome.center)? * speed),
            VelocityPolicy::AimedWithOverride { vertical } => {
                let mut vel = aim_at(position, dome.center)? * speed;
                vel.y = vertical;
                Ok(vel)
            }
        }
    }
}

/// Unit vector from `from` toward `target`
pub fn aim_at(from: Vec3, target: Vec3) -> Result<Vec3, SimError> {
    (target - from)
        .try_normalize()
        .ok_or(SimError::InvalidSpawnGeometry { position: from })
}

/// Check the launch settings the scheduler samples from
///
/// Launch margins are left to the caller: a shell that shrinks onto the
/// center is reported per launch as `InvalidSpawnGeometry`.
pub fn validate_launch(
    launch: &LaunchGeometry,
    velocity: &VelocityPolicy,
    speed: f32,
    interval: f32,
) -> Result<(), SimError> {
    let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

    if !(speed.is_finite() && speed >= 0.0) {
        return invalid(format!("speed {} must be non-negative", speed));
    }
    if !(interval.is_finite() && interval >= 0.0) {
        return invalid(format!("spawn interval {} must be non-negative", interval));
    }
    if let LaunchGeometry::Ring {
        height: RingHeight::Range { min, max },
        ..
    } = *launch
        && !(min.is_finite() && max.is_finite() && min <= max)
    {
        return invalid(format!("ring height range ({}, {}) is invalid", min, max));
    }
    if let VelocityPolicy::AimedWithOverride { vertical } = *velocity
        && !vertical.is_finite()
    {
        return invalid(format!("vertical override {} is not finite", vertical));
    }
    Ok(())
}

/// When the scheduler is allowed to accumulate time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cadence {
    /// Single-projectile mode: the timer only runs while nothing is active
    WhenIdle,
    /// Multi-projectile mode: the timer runs every frame
    #[default]
    Interval,
}

/// A fully initialized launch, ready for the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Decides when to spawn and builds the launch state
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    pub launch: LaunchGeometry,
    pub velocity: VelocityPolicy,
    pub speed: f32,
    pub cadence: Cadence,
    /// Seconds that must be exceeded before the next spawn
    pub interval: f32,
    timer: f32,
    /// One spawn owed at startup
    pending_initial: bool,
    rng: Pcg32,
}

impl SpawnScheduler {
    pub fn new(
        launch: LaunchGeometry,
        velocity: VelocityPolicy,
        speed: f32,
        cadence: Cadence,
        interval: f32,
        spawn_on_start: bool,
        seed: u64,
    ) -> Result<Self, SimError> {
        validate_launch(&launch, &velocity, speed, interval)?;
        Ok(Self {
            launch,
            velocity,
            speed,
            cadence,
            interval,
            timer: 0.0,
            pending_initial: spawn_on_start,
            rng: RngState::new(seed, RngState::SPAWN_STREAM).to_rng(),
        })
    }

    /// Accumulated time since the last spawn
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance the cadence timer; true when a spawn is due this frame
    ///
    /// Emits at most one spawn per call. The timer resets to zero on spawn,
    /// dropping any residual beyond the interval.
    pub fn update(&mut self, dt: f32, active_count: usize) -> bool {
        if self.pending_initial {
            self.pending_initial = false;
            self.timer = 0.0;
            return true;
        }

        if self.cadence == Cadence::WhenIdle && active_count > 0 {
            return false;
        }

        self.timer += dt;
        if self.timer > self.interval {
            self.timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Sample a launch position and its initial velocity
    pub fn next_launch(&mut self, dome: &Dome) -> Result<SpawnRequest, SimError> {
        let position = self.launch.sample(dome, &mut self.rng);
        let velocity = self.velocity.initial_velocity(position, dome, self.speed)?;
        Ok(SpawnRequest { position, velocity })
    }
}
