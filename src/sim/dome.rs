//! Dome geometry and zone classification
//!
//! Two concentric shells share one center:
//! - inner radius: the video-textured dome
//! - outer radius: the transparent outer dome
//!
//! Every distance, crossing and impact check measures from `center`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::horizontal_length;

/// Classification of a point by its distance from the dome center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// distance > outer radius
    Outside,
    /// inner radius < distance <= outer radius
    Transitional,
    /// distance <= inner radius
    Inside,
}

impl Zone {
    /// Classify a distance against the two thresholds
    #[inline]
    pub fn classify(distance: f32, inner_radius: f32, outer_radius: f32) -> Self {
        if distance > outer_radius {
            Zone::Outside
        } else if distance > inner_radius {
            Zone::Transitional
        } else {
            Zone::Inside
        }
    }
}

/// How many zones a host distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoneModel {
    /// Outside vs. within the outer dome
    TwoZone,
    /// Outside / between the domes / inside the inner dome
    #[default]
    ThreeZone,
}

impl ZoneModel {
    /// Apply the model to a three-zone classification
    #[inline]
    pub fn apply(&self, zone: Zone) -> Zone {
        match (self, zone) {
            (ZoneModel::TwoZone, Zone::Transitional) => Zone::Inside,
            (_, zone) => zone,
        }
    }
}

/// The two dome shells around a shared center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dome {
    /// Reference point for all radial distances
    pub center: Vec3,
    /// Inner (video) dome radius
    pub inner_radius: f32,
    /// Outer dome radius
    pub outer_radius: f32,
}

impl Default for Dome {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            inner_radius: INNER_DOME_RADIUS,
            outer_radius: OUTER_DOME_RADIUS,
        }
    }
}

impl Dome {
    pub fn new(center: Vec3, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
        }
    }

    /// Euclidean distance from the center
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        (point - self.center).length()
    }

    /// Distance from the vertical axis through the center
    #[inline]
    pub fn horizontal_distance(&self, point: Vec3) -> f32 {
        horizontal_length(point - self.center)
    }

    /// Zone of a point under the given model
    pub fn zone(&self, point: Vec3, model: ZoneModel) -> Zone {
        model.apply(Zone::classify(
            self.distance(point),
            self.inner_radius,
            self.outer_radius,
        ))
    }

    /// Radius of the spawn shell `margin` beyond the outer dome
    #[inline]
    pub fn spawn_radius(&self, margin: f32) -> f32 {
        self.outer_radius + margin
    }

    /// Height of the outer dome apex
    #[inline]
    pub fn apex_height(&self) -> f32 {
        self.center.y + self.outer_radius
    }
}
