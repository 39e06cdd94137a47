//! Dome Sim - projectile trajectories over a video dome
//!
//! Core modules:
//! - `sim`: Trajectory engine, spawn scheduler and the per-frame tick
//! - `config`: Simulation configuration and named presets
//! - `export`: Marker snapshot export (CSV / JSON)
//! - `error`: Error type shared by the fallible seams

pub mod config;
pub mod error;
pub mod export;
pub mod sim;

pub use config::{Preset, SimConfig};
pub use error::SimError;

use glam::Vec3;

/// Simulation defaults shared by every preset
pub mod consts {
    /// Host frame rate the original demos were clocked at
    pub const FRAME_RATE: f32 = 30.0;

    /// Inner dome radius (video-textured disc)
    pub const INNER_DOME_RADIUS: f32 = 300.0;
    /// Outer dome radius (transparent hemisphere)
    pub const OUTER_DOME_RADIUS: f32 = 320.0;
    /// Distance between the outer dome and the spawn shell
    pub const SPAWN_MARGIN: f32 = 20.0;

    /// Default projectile speed (units/s)
    pub const PROJECTILE_SPEED: f32 = 100.0;
    /// Default spawn interval (seconds)
    pub const SPAWN_INTERVAL: f32 = 0.5;

    /// Downward acceleration for the lofted-arc variant
    pub const GRAVITY: f32 = 9.8;

    /// Impact marker radius range (drawn uniformly per marker)
    pub const IMPACT_RADIUS_MIN: f32 = 0.3;
    pub const IMPACT_RADIUS_MAX: f32 = 1.0;

    /// Default seed when the config does not pin one
    pub const DEFAULT_SEED: u64 = 0x5eed_d0e5;
}

/// Convert spherical (r, polar, azimuth) to cartesian, Y up
///
/// `polar` is measured from +Y, `azimuth` in the XZ plane from +X.
#[inline]
pub fn spherical_to_cartesian(r: f32, polar: f32, azimuth: f32) -> Vec3 {
    Vec3::new(
        r * polar.sin() * azimuth.cos(),
        r * polar.cos(),
        r * polar.sin() * azimuth.sin(),
    )
}

/// Point on a horizontal circle of radius `r` at height `y`
#[inline]
pub fn ring_point(r: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(r * angle.cos(), y, r * angle.sin())
}

/// Length of the XZ component (distance from the vertical axis)
#[inline]
pub fn horizontal_length(v: Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}
