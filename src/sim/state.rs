//! Projectile state and event records
//!
//! Everything the host reads between frames lives here: the projectile
//! records of the working set and the append-only marker lists.

use std::collections::VecDeque;

use glam::Vec3;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::dome::{Dome, Zone, ZoneModel};

/// Position history of a projectile, one point per tick
///
/// Unbounded unless a cap is given; a capped trail drops its oldest points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trail {
    points: VecDeque<Vec3>,
    cap: Option<usize>,
}

impl Trail {
    /// Start a trail at the spawn position
    pub fn new(origin: Vec3, cap: Option<usize>) -> Self {
        let mut points = VecDeque::with_capacity(cap.unwrap_or(64).min(1024));
        points.push_back(origin);
        Self { points, cap }
    }

    /// Append the newest position
    pub fn record(&mut self, pos: Vec3) {
        self.points.push_back(pos);
        if let Some(cap) = self.cap {
            while self.points.len() > cap {
                self.points.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Vec3> {
        self.points.front().copied()
    }

    pub fn last(&self) -> Option<Vec3> {
        self.points.back().copied()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }
}

/// One trail segment, colored by the zone of its midpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub zone: Zone,
}

/// Why a projectile left the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// Reached the ground plane
    Grounded,
    /// Climbed above the escape ceiling
    Escaped,
}

/// A simulated projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Cleared once; an inactive projectile is never updated again
    pub active: bool,
    pub trail: Trail,
    /// Distance from the dome center at the previous tick
    pub prev_distance: f32,
    /// At most one impact marker per projectile
    pub impact_recorded: bool,
    /// Updates survived while active
    pub ticks: u32,
    /// Set together with `active = false`
    pub deactivation: Option<DeactivationReason>,
}

impl Projectile {
    /// New active projectile; `prev_distance` starts from the spawn position
    pub fn new(id: u32, position: Vec3, velocity: Vec3, dome: &Dome, trail_cap: Option<usize>) -> Self {
        Self {
            id,
            position,
            velocity,
            active: true,
            trail: Trail::new(position, trail_cap),
            prev_distance: dome.distance(position),
            impact_recorded: false,
            ticks: 0,
            deactivation: None,
        }
    }

    /// Terminal transition
    pub fn deactivate(&mut self, reason: DeactivationReason) {
        if self.active {
            self.active = false;
            self.deactivation = Some(reason);
        }
    }

    /// Zone of the current position
    pub fn zone(&self, dome: &Dome, model: ZoneModel) -> Zone {
        dome.zone(self.position, model)
    }

    /// Consecutive trail pairs with the zone of their midpoint
    pub fn segments<'a>(
        &'a self,
        dome: &'a Dome,
        model: ZoneModel,
    ) -> impl Iterator<Item = TrailSegment> + 'a {
        self.trail
            .iter()
            .zip(self.trail.iter().skip(1))
            .map(move |(start, end)| TrailSegment {
                start,
                end,
                zone: dome.zone((start + end) * 0.5, model),
            })
    }
}

/// Impact marker left on the ground inside the inner dome footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactMarker {
    pub position: Vec3,
    /// Display radius, fixed at creation
    pub radius: f32,
}

/// Marker categories, in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    OuterEntry,
    InnerEntry,
    Impact,
}

/// Append-only marker lists, shared by every projectile an engine ever spawned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerLog {
    /// Positions where a projectile entered the outer dome
    pub outer_entries: Vec<Vec3>,
    /// Positions where a projectile entered the inner dome
    pub inner_entries: Vec<Vec3>,
    /// Ground impacts inside the inner footprint
    pub impacts: Vec<ImpactMarker>,
    /// Positions sampled while inside the inner dome (when enabled)
    pub inner_track: Vec<Vec3>,
}

impl MarkerLog {
    /// Number of entry and impact markers (the track is not a marker)
    pub fn len(&self) -> usize {
        self.outer_entries.len() + self.inner_entries.len() + self.impacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned { id: u32, position: Vec3, velocity: Vec3 },
    OuterEntry { id: u32, position: Vec3 },
    InnerEntry { id: u32, position: Vec3 },
    Impact { id: u32, position: Vec3, radius: f32 },
    Deactivated { id: u32, reason: DeactivationReason },
}

/// RNG seed and stream, kept so a run can be reproduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    /// Stream used by the trajectory engine (impact radii)
    pub const ENGINE_STREAM: u64 = 1;
    /// Stream used by the spawn scheduler (launch sampling)
    pub const SPAWN_STREAM: u64 = 2;

    pub fn new(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}
