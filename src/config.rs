//! Simulation configuration and presets
//!
//! Loaded once at startup (JSON file or named preset) and fixed for the run.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::sim::dome::{Dome, ZoneModel};
use crate::sim::engine::EngineParams;
use crate::sim::spawn::{
    Cadence, LaunchGeometry, RingHeight, SpawnScheduler, VelocityPolicy, validate_launch,
};

/// Named configurations matching the demo variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// One projectile at a time, dropped straight down from a disc above the apex
    Plumb,
    /// Ring launches high above the rim, aimed at the center
    Converge,
    /// Fast omnidirectional launches from a spherical shell
    #[default]
    Barrage,
    /// Lofted gravity arcs from ground level toward a raised center
    Lob,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Plumb, Preset::Converge, Preset::Barrage, Preset::Lob];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Plumb => "plumb",
            Preset::Converge => "converge",
            Preset::Barrage => "barrage",
            Preset::Lob => "lob",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plumb" | "drop" => Some(Preset::Plumb),
            "converge" => Some(Preset::Converge),
            "barrage" | "shell" => Some(Preset::Barrage),
            "lob" | "arc" => Some(Preset::Lob),
            _ => None,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; `None` uses `DEFAULT_SEED`
    pub seed: Option<u64>,

    // === Geometry ===
    pub dome: Dome,
    pub zone_model: ZoneModel,

    // === Motion ===
    /// Downward acceleration (units/s²); `None` disables gravity
    pub gravity: Option<f32>,
    /// Height above which projectiles are terminated
    pub ceiling: Option<f32>,

    // === Markers ===
    /// Impact marker radius range (min, max)
    pub impact_radius: (f32, f32),
    /// Ring-buffer length for trails; `None` keeps every point
    pub trail_cap: Option<usize>,
    /// Keep a track of positions inside the inner dome
    pub record_inner_track: bool,

    // === Spawning ===
    pub launch: LaunchGeometry,
    pub velocity: VelocityPolicy,
    /// Launch speed (units/s)
    pub speed: f32,
    pub cadence: Cadence,
    /// Seconds that must be exceeded between spawns
    pub spawn_interval: f32,
    /// Launch one projectile on the first frame
    pub spawn_on_start: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl SimConfig {
    /// Create a config from a preset
    pub fn from_preset(preset: Preset) -> Self {
        let base = Self {
            seed: None,
            dome: Dome::default(),
            zone_model: ZoneModel::ThreeZone,
            gravity: None,
            ceiling: None,
            impact_radius: (IMPACT_RADIUS_MIN, IMPACT_RADIUS_MAX),
            trail_cap: None,
            record_inner_track: false,
            launch: LaunchGeometry::Shell {
                margin: SPAWN_MARGIN,
            },
            velocity: VelocityPolicy::AimedAtCenter,
            speed: PROJECTILE_SPEED,
            cadence: Cadence::Interval,
            spawn_interval: SPAWN_INTERVAL,
            spawn_on_start: false,
        };

        match preset {
            Preset::Plumb => Self {
                zone_model: ZoneModel::TwoZone,
                launch: LaunchGeometry::TopDisc { margin: 10.0 },
                velocity: VelocityPolicy::StraightDown,
                cadence: Cadence::WhenIdle,
                spawn_interval: 1.5,
                spawn_on_start: true,
                ..base
            },
            Preset::Converge => Self {
                launch: LaunchGeometry::Ring {
                    margin: SPAWN_MARGIN,
                    height: RingHeight::Range {
                        min: 350.0,
                        max: 400.0,
                    },
                },
                ..base
            },
            Preset::Barrage => Self {
                speed: 300.0,
                spawn_interval: 0.2,
                ..base
            },
            Preset::Lob => Self {
                dome: Dome::new(
                    Vec3::new(0.0, INNER_DOME_RADIUS / 2.0, 0.0),
                    INNER_DOME_RADIUS,
                    OUTER_DOME_RADIUS,
                ),
                gravity: Some(GRAVITY),
                ceiling: Some(INNER_DOME_RADIUS * 2.0),
                record_inner_track: true,
                launch: LaunchGeometry::Ring {
                    margin: 2.0,
                    height: RingHeight::Fixed(0.0),
                },
                velocity: VelocityPolicy::AimedWithOverride { vertical: 40.0 },
                speed: 30.0,
                cadence: Cadence::WhenIdle,
                spawn_interval: 2.0,
                spawn_on_start: true,
                ..base
            },
        }
    }

    /// Seed actually used for the run
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Check ranges and consistency
    pub fn validate(&self) -> Result<(), SimError> {
        self.engine_params().validate()?;
        validate_launch(&self.launch, &self.velocity, self.speed, self.spawn_interval)?;

        let margin = match self.launch {
            LaunchGeometry::Ring { margin, .. }
            | LaunchGeometry::Shell { margin }
            | LaunchGeometry::TopDisc { margin } => margin,
        };
        if !(margin.is_finite() && margin >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "launch margin {} must be non-negative",
                margin
            )));
        }
        Ok(())
    }

    /// Parameters for the trajectory engine
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            dome: self.dome,
            zone_model: self.zone_model,
            gravity: self.gravity,
            ceiling: self.ceiling,
            impact_radius: self.impact_radius,
            trail_cap: self.trail_cap,
            record_inner_track: self.record_inner_track,
        }
    }

    /// Spawn scheduler for this config
    pub fn scheduler(&self) -> Result<SpawnScheduler, SimError> {
        SpawnScheduler::new(
            self.launch,
            self.velocity,
            self.speed,
            self.cadence,
            self.spawn_interval,
            self.spawn_on_start,
            self.effective_seed(),
        )
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json).inspect_err(|e| {
            log::warn!("Rejected config {}: {}", path.display(), e);
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Preset name or path to a JSON file
    pub fn resolve(arg: &str) -> Result<Self, SimError> {
        match Preset::from_str(arg) {
            Some(preset) => {
                log::info!("Using preset '{}'", preset.as_str());
                Ok(Self::from_preset(preset))
            }
            None => Self::load(arg),
        }
    }

    /// Save as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }
}
