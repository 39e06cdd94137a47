//! Threshold crossing predicates
//!
//! A single distance sample cannot tell "crossing inward" from "already
//! inside", so every radial check compares the previous tick's distance
//! with the current one.

use glam::Vec3;

use super::dome::Dome;

/// Which shell a projectile crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Outer,
    Inner,
}

/// Result of comparing two consecutive distance samples against both shells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossings {
    pub outer: bool,
    pub inner: bool,
}

impl Crossings {
    /// Crossed boundaries in detection order (outer first)
    pub fn iter(&self) -> impl Iterator<Item = Boundary> {
        let outer = self.outer.then_some(Boundary::Outer);
        let inner = self.inner.then_some(Boundary::Inner);
        outer.into_iter().chain(inner)
    }
}

/// True when the distance went from strictly outside `radius` to on or inside it
#[inline]
pub fn crossed_inward(prev_distance: f32, distance: f32, radius: f32) -> bool {
    prev_distance > radius && distance <= radius
}

/// Evaluate both shells for one tick
pub fn detect_crossings(dome: &Dome, prev_distance: f32, distance: f32) -> Crossings {
    Crossings {
        outer: crossed_inward(prev_distance, distance, dome.outer_radius),
        inner: crossed_inward(prev_distance, distance, dome.inner_radius),
    }
}

/// Ground plane is y = 0
#[inline]
pub fn reached_ground(position: Vec3) -> bool {
    position.y <= 0.0
}

/// On the ground and within the inner dome's footprint
#[inline]
pub fn is_impact(dome: &Dome, position: Vec3) -> bool {
    reached_ground(position) && dome.horizontal_distance(position) <= dome.inner_radius
}

/// Above the escape ceiling (if one is configured)
#[inline]
pub fn escaped(position: Vec3, ceiling: Option<f32>) -> bool {
    ceiling.is_some_and(|c| position.y > c)
}
