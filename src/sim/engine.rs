//! Trajectory engine
//!
//! Owns the working set and the marker lists. Each `advance` integrates
//! every active projectile once, records crossings and impacts, then drops
//! whatever became inactive.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::crossing::{Boundary, detect_crossings, escaped, is_impact, reached_ground};
use super::dome::{Dome, Zone, ZoneModel};
use super::state::{
    DeactivationReason, ImpactMarker, MarkerLog, Projectile, RngState, SimEvent,
};
use crate::consts::*;
use crate::error::SimError;

/// Parameters the engine needs from the simulation config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    pub dome: Dome,
    pub zone_model: ZoneModel,
    /// Downward acceleration; `None` flies straight
    pub gravity: Option<f32>,
    /// Projectiles above this height are terminated
    pub ceiling: Option<f32>,
    /// Impact marker radius range, inclusive
    pub impact_radius: (f32, f32),
    pub trail_cap: Option<usize>,
    /// Record every position inside the inner dome
    pub record_inner_track: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            dome: Dome::default(),
            zone_model: ZoneModel::default(),
            gravity: None,
            ceiling: None,
            impact_radius: (IMPACT_RADIUS_MIN, IMPACT_RADIUS_MAX),
            trail_cap: None,
            record_inner_track: false,
        }
    }
}

impl EngineParams {
    /// Reject geometry and ranges the integrator cannot work with
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));
        let dome = &self.dome;

        if !dome.center.is_finite() {
            return invalid(format!("dome center {:?} is not finite", dome.center));
        }
        if !(dome.inner_radius.is_finite() && dome.inner_radius > 0.0) {
            return invalid(format!("inner radius {} must be positive", dome.inner_radius));
        }
        if !(dome.outer_radius.is_finite() && dome.outer_radius >= dome.inner_radius) {
            return invalid(format!(
                "outer radius {} must be at least the inner radius {}",
                dome.outer_radius, dome.inner_radius
            ));
        }
        if let Some(g) = self.gravity
            && !(g.is_finite() && g >= 0.0)
        {
            return invalid(format!("gravity {} must be non-negative", g));
        }
        if let Some(c) = self.ceiling
            && !(c.is_finite() && c > 0.0)
        {
            return invalid(format!("ceiling {} must be positive", c));
        }
        let (lo, hi) = self.impact_radius;
        if !(lo.is_finite() && hi.is_finite() && lo >= 0.0 && lo <= hi) {
            return invalid(format!("impact radius range ({}, {}) is invalid", lo, hi));
        }
        if self.trail_cap == Some(0) {
            return invalid("trail cap must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Advances projectiles and accumulates their markers
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    params: EngineParams,
    /// Working set, in spawn order
    projectiles: Vec<Projectile>,
    markers: MarkerLog,
    rng: Pcg32,
    next_id: u32,
    time_ticks: u64,
}

impl TrajectoryEngine {
    /// Create an empty engine, rejecting invalid parameters
    pub fn new(params: EngineParams, seed: u64) -> Result<Self, SimError> {
        params.validate()?;
        Ok(Self {
            params,
            projectiles: Vec::new(),
            markers: MarkerLog::default(),
            rng: RngState::new(seed, RngState::ENGINE_STREAM).to_rng(),
            next_id: 1,
            time_ticks: 0,
        })
    }

    pub fn dome(&self) -> &Dome {
        &self.params.dome
    }

    /// Number of `advance` calls so far
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Current working set
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn active_count(&self) -> usize {
        self.projectiles.iter().filter(|p| p.active).count()
    }

    /// Markers recorded since creation
    pub fn markers(&self) -> &MarkerLog {
        &self.markers
    }

    /// Zone of a projectile's current position under the configured model
    pub fn zone_of(&self, projectile: &Projectile) -> Zone {
        projectile.zone(&self.params.dome, self.params.zone_model)
    }

    /// Allocate a projectile ID
    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a projectile at `position` and add it to the working set
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3) -> u32 {
        let id = self.next_projectile_id();
        let projectile = Projectile::new(
            id,
            position,
            velocity,
            &self.params.dome,
            self.params.trail_cap,
        );
        self.insert(projectile);
        id
    }

    /// Add an externally built projectile to the working set
    pub fn insert(&mut self, projectile: Projectile) {
        if projectile.id >= self.next_id {
            self.next_id = projectile.id + 1;
        }
        log::debug!(
            "Projectile {} spawned at ({:.1}, {:.1}, {:.1})",
            projectile.id,
            projectile.position.x,
            projectile.position.y,
            projectile.position.z
        );
        self.projectiles.push(projectile);
    }

    /// Advance every active projectile by `dt` seconds
    ///
    /// `dt` must be non-negative. Inactive projectiles are removed before
    /// returning; the markers they produced stay.
    pub fn advance(&mut self, dt: f32) -> Vec<SimEvent> {
        self.time_ticks += 1;
        let mut events = Vec::new();

        for projectile in self.projectiles.iter_mut().filter(|p| p.active) {
            step(
                projectile,
                &self.params,
                &mut self.rng,
                &mut self.markers,
                &mut events,
                dt,
            );
        }

        let before = self.projectiles.len();
        self.projectiles.retain(|p| p.active);
        let removed = before - self.projectiles.len();
        if removed > 0 {
            log::debug!(
                "Removed {} inactive projectile(s), {} remaining",
                removed,
                self.projectiles.len()
            );
        }

        events
    }

    /// Copy of the marker lists recorded so far
    pub fn snapshot(&self) -> MarkerLog {
        self.markers.clone()
    }

    /// Consume the engine, keeping only its markers
    pub fn shutdown(self) -> MarkerLog {
        log::info!(
            "Trajectory engine shut down after {} ticks: {} outer entries, {} inner entries, {} impacts, {} projectile(s) in flight",
            self.time_ticks,
            self.markers.outer_entries.len(),
            self.markers.inner_entries.len(),
            self.markers.impacts.len(),
            self.projectiles.len()
        );
        self.markers
    }
}

/// Integrate one projectile for one tick and record what it crossed
fn step(
    projectile: &mut Projectile,
    params: &EngineParams,
    rng: &mut Pcg32,
    markers: &mut MarkerLog,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    let dome = &params.dome;
    let id = projectile.id;

    // Single Euler step; gravity updates velocity first
    if let Some(g) = params.gravity {
        projectile.velocity.y -= g * dt;
    }
    projectile.position += projectile.velocity * dt;
    projectile.trail.record(projectile.position);
    projectile.ticks += 1;

    let position = projectile.position;
    let distance = dome.distance(position);

    let crossings = detect_crossings(dome, projectile.prev_distance, distance);
    for boundary in crossings.iter() {
        match boundary {
            Boundary::Outer => {
                markers.outer_entries.push(position);
                events.push(SimEvent::OuterEntry { id, position });
            }
            Boundary::Inner => {
                markers.inner_entries.push(position);
                events.push(SimEvent::InnerEntry { id, position });
            }
        }
        log::debug!("Projectile {} crossed {:?} dome at distance {:.2}", id, boundary, distance);
    }

    if params.record_inner_track && distance <= dome.inner_radius {
        markers.inner_track.push(position);
    }

    if !projectile.impact_recorded && is_impact(dome, position) {
        let (min, max) = params.impact_radius;
        let radius = rng.random_range(min..=max);
        markers.impacts.push(ImpactMarker { position, radius });
        projectile.impact_recorded = true;
        events.push(SimEvent::Impact { id, position, radius });
        log::debug!("Projectile {} impacted, marker radius {:.2}", id, radius);
    }

    let reason = if reached_ground(position) {
        Some(DeactivationReason::Grounded)
    } else if escaped(position, params.ceiling) {
        Some(DeactivationReason::Escaped)
    } else {
        None
    };
    if let Some(reason) = reason {
        projectile.deactivate(reason);
        events.push(SimEvent::Deactivated { id, reason });
    }

    projectile.prev_distance = distance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> TrajectoryEngine {
        TrajectoryEngine::new(EngineParams::default(), 12345).unwrap()
    }

    fn standalone(position: Vec3, velocity: Vec3, params: &EngineParams) -> Projectile {
        Projectile::new(1, position, velocity, &params.dome, params.trail_cap)
    }

    #[test]
    fn test_straight_fall_scenario() {
        let params = EngineParams::default();
        let mut rng = RngState::new(1, 1).to_rng();
        let mut markers = MarkerLog::default();
        let mut events = Vec::new();
        let mut p = standalone(Vec3::new(0.0, 330.0, 0.0), Vec3::new(0.0, -100.0, 0.0), &params);

        step(&mut p, &params, &mut rng, &mut markers, &mut events, 0.1);
        assert_eq!(p.position.y, 320.0);
        assert_eq!(markers.outer_entries, vec![Vec3::new(0.0, 320.0, 0.0)]);
        assert!(markers.inner_entries.is_empty());

        let mut ticks = 1;
        while p.active {
            step(&mut p, &params, &mut rng, &mut markers, &mut events, 0.1);
            ticks += 1;
            if ticks == 3 {
                assert_eq!(markers.inner_entries, vec![Vec3::new(0.0, 300.0, 0.0)]);
            }
        }

        assert_eq!(ticks, 33);
        assert_eq!(p.position.y, 0.0);
        assert_eq!(p.deactivation, Some(DeactivationReason::Grounded));
        assert_eq!(p.trail.len(), ticks + 1);
        assert_eq!(p.trail.first(), Some(Vec3::new(0.0, 330.0, 0.0)));
        assert_eq!(p.trail.last(), Some(p.position));
        assert_eq!(markers.outer_entries.len(), 1);
        assert_eq!(markers.inner_entries.len(), 1);
        assert_eq!(markers.impacts.len(), 1);
        let r = markers.impacts[0].radius;
        assert!((IMPACT_RADIUS_MIN..=IMPACT_RADIUS_MAX).contains(&r));
    }

    #[test]
    fn test_engine_removes_grounded_projectile_same_cycle() {
        let mut engine = engine();
        let id = engine.spawn(Vec3::new(0.0, 330.0, 0.0), Vec3::new(0.0, -100.0, 0.0));

        for _ in 0..32 {
            engine.advance(0.1);
        }
        assert_eq!(engine.projectiles().len(), 1);
        assert_eq!(engine.projectiles()[0].trail.len(), 33);

        let events = engine.advance(0.1);
        assert!(engine.projectiles().is_empty());
        assert!(events.contains(&SimEvent::Deactivated {
            id,
            reason: DeactivationReason::Grounded
        }));
        assert!(events.iter().any(|e| matches!(e, SimEvent::Impact { .. })));

        // Markers outlive the projectile; further ticks add nothing
        let markers_before = engine.markers().len();
        engine.advance(0.1);
        engine.advance(5.0);
        assert_eq!(engine.markers().len(), markers_before);
        assert_eq!(markers_before, 3);
    }

    #[test]
    fn test_single_outer_crossing_for_inward_pass() {
        // Center lifted so the pass never touches the ground
        let params = EngineParams {
            dome: Dome::new(Vec3::new(0.0, 1000.0, 0.0), 300.0, 320.0),
            ..Default::default()
        };
        let mut engine = TrajectoryEngine::new(params, 7).unwrap();
        let center = engine.dome().center;
        let dir = Vec3::new(1.0, 0.5, -0.25).normalize();
        engine.spawn(center + dir * 400.0, -dir * 30.0);

        let mut first_inside_tick = None;
        for tick in 1..=10 {
            engine.advance(1.0);
            let d = engine.dome().distance(engine.projectiles()[0].position);
            if first_inside_tick.is_none() && d <= 320.0 {
                first_inside_tick = Some(tick);
            }
        }
        // 400 -> 100 in steps of 30
        let d = engine.dome().distance(engine.projectiles()[0].position);
        assert!((d - 100.0).abs() < 1e-2);
        assert_eq!(first_inside_tick, Some(3));
        assert_eq!(engine.markers().outer_entries.len(), 1);
        let marker_d = engine.dome().distance(engine.markers().outer_entries[0]);
        assert!((marker_d - 310.0).abs() < 1e-2);
        assert_eq!(engine.markers().inner_entries.len(), 1);
    }

    #[test]
    fn test_no_crossing_when_spawned_inside() {
        let mut engine = engine();
        // Starts between the shells, drifts sideways at constant radius-ish
        engine.spawn(Vec3::new(0.0, 310.0, 0.0), Vec3::new(1.0, -0.01, 0.0));
        for _ in 0..20 {
            engine.advance(0.1);
        }
        assert!(engine.markers().outer_entries.is_empty());
        assert_eq!(engine.zone_of(&engine.projectiles()[0]), Zone::Transitional);
    }

    #[test]
    fn test_spawn_inside_crossing_at_tick_one_counts_once() {
        let mut engine = engine();
        // Starts on the outer shell exactly: not strictly outside, no marker
        engine.spawn(Vec3::new(0.0, 320.0, 0.0), Vec3::new(0.0, -50.0, 0.0));
        engine.advance(0.1);
        assert!(engine.markers().outer_entries.is_empty());
    }

    #[test]
    fn test_impact_marker_recorded_once() {
        let params = EngineParams::default();
        let mut rng = RngState::new(1, 1).to_rng();
        let mut markers = MarkerLog::default();
        let mut events = Vec::new();
        let mut p = standalone(Vec3::new(10.0, 0.0, 10.0), Vec3::ZERO, &params);

        // Lingering on the ground across several updates
        for _ in 0..5 {
            step(&mut p, &params, &mut rng, &mut markers, &mut events, 0.1);
        }
        assert_eq!(markers.impacts.len(), 1);
        assert!(p.impact_recorded);
        let impacts = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Impact { .. }))
            .count();
        assert_eq!(impacts, 1);
    }

    #[test]
    fn test_ground_outside_footprint_no_impact() {
        let mut engine = engine();
        engine.spawn(Vec3::new(310.0, 5.0, 0.0), Vec3::new(0.0, -100.0, 0.0));
        let events = engine.advance(0.1);
        assert!(engine.markers().impacts.is_empty());
        assert!(engine.projectiles().is_empty());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_gravity_arc_enters_both_domes_and_impacts() {
        let params = EngineParams {
            dome: Dome::new(Vec3::new(0.0, 150.0, 0.0), 300.0, 320.0),
            gravity: Some(GRAVITY),
            ceiling: Some(600.0),
            record_inner_track: true,
            ..Default::default()
        };
        let mut engine = TrajectoryEngine::new(params, 99).unwrap();
        let start = Vec3::new(322.0, 0.0, 0.0);
        let horizontal = (engine.dome().center - start).normalize() * 30.0;
        engine.spawn(start, Vec3::new(horizontal.x, 40.0, horizontal.z));

        let mut all_events = Vec::new();
        for _ in 0..1000 {
            all_events.extend(engine.advance(1.0 / 30.0));
            if engine.projectiles().is_empty() {
                break;
            }
        }

        assert!(engine.projectiles().is_empty());
        assert_eq!(engine.markers().outer_entries.len(), 1);
        assert_eq!(engine.markers().inner_entries.len(), 1);
        assert_eq!(engine.markers().impacts.len(), 1);
        assert!(!engine.markers().inner_track.is_empty());
        assert!(all_events.iter().any(|e| matches!(
            e,
            SimEvent::Deactivated { reason: DeactivationReason::Grounded, .. }
        )));
    }

    #[test]
    fn test_escape_above_ceiling() {
        let params = EngineParams {
            gravity: Some(GRAVITY),
            ceiling: Some(600.0),
            ..Default::default()
        };
        let mut engine = TrajectoryEngine::new(params, 5).unwrap();
        let id = engine.spawn(Vec3::new(400.0, 1.0, 0.0), Vec3::new(0.0, 200.0, 0.0));

        let mut escaped_event = false;
        for _ in 0..400 {
            let events = engine.advance(0.05);
            escaped_event |= events.contains(&SimEvent::Deactivated {
                id,
                reason: DeactivationReason::Escaped,
            });
            if engine.projectiles().is_empty() {
                break;
            }
        }
        assert!(escaped_event);
        assert!(engine.markers().impacts.is_empty());
    }

    #[test]
    fn test_inner_track_disabled_by_default() {
        let mut engine = engine();
        engine.spawn(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, -10.0, 0.0));
        engine.advance(0.1);
        assert!(engine.markers().inner_track.is_empty());
    }

    #[test]
    fn test_inserted_projectile_ids_do_not_collide() {
        let mut engine = engine();
        let dome = *engine.dome();
        engine.insert(Projectile::new(10, Vec3::new(0.0, 500.0, 0.0), Vec3::ZERO, &dome, None));
        let id = engine.spawn(Vec3::new(0.0, 500.0, 0.0), Vec3::ZERO);
        assert_eq!(id, 11);
    }

    #[test]
    fn test_same_seed_same_impact_radii() {
        let run = || {
            let mut engine = engine();
            for i in 0..5 {
                engine.spawn(Vec3::new(i as f32 * 10.0, 5.0, 0.0), Vec3::new(0.0, -100.0, 0.0));
            }
            engine.advance(0.1);
            engine.shutdown()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_snapshot_between_advances_matches_shutdown() {
        let mut engine = engine();
        for i in 0..4 {
            engine.spawn(
                Vec3::new(i as f32 * 20.0, 340.0 + i as f32 * 15.0, 0.0),
                Vec3::new(0.0, -100.0, 0.0),
            );
        }

        for _ in 0..3 {
            engine.advance(0.1);
        }
        let early = engine.snapshot();
        assert_eq!(engine.time_ticks(), 3);
        assert!(!early.outer_entries.is_empty());
        assert!(early.impacts.is_empty());

        for _ in 0..40 {
            engine.advance(0.1);
        }
        let late = engine.snapshot();
        assert_eq!(engine.time_ticks(), 43);
        // Append-only: the early view is a prefix of the later one
        assert!(late.outer_entries.starts_with(&early.outer_entries));
        assert!(late.inner_entries.starts_with(&early.inner_entries));
        assert_eq!(late.impacts.len(), 4);

        // Reading a snapshot leaves the engine untouched
        assert_eq!(engine.snapshot(), late);
        assert_eq!(engine.shutdown(), late);
    }

    #[test]
    fn test_new_rejects_inverted_impact_radius_range() {
        let params = EngineParams {
            impact_radius: (1.0, 0.3),
            ..Default::default()
        };
        assert!(matches!(
            TrajectoryEngine::new(params, 1),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        let inverted = EngineParams {
            dome: Dome::new(Vec3::ZERO, 300.0, 250.0),
            ..Default::default()
        };
        assert!(TrajectoryEngine::new(inverted, 1).is_err());

        let no_trail = EngineParams {
            trail_cap: Some(0),
            ..Default::default()
        };
        assert!(TrajectoryEngine::new(no_trail, 1).is_err());

        let sinking = EngineParams {
            gravity: Some(-9.8),
            ..Default::default()
        };
        assert!(TrajectoryEngine::new(sinking, 1).is_err());
    }

    proptest! {
        #[test]
        fn prop_trail_len_tracks_ticks(
            x in -200.0f32..200.0,
            z in -200.0f32..200.0,
            y in 50.0f32..1000.0,
            speed in 1.0f32..50.0,
            dt in 0.001f32..0.1,
            steps in 1usize..200,
        ) {
            let mut engine = engine();
            let start = Vec3::new(x, y, z);
            engine.spawn(start, Vec3::new(0.0, -speed, 0.0));

            for k in 1..=steps {
                engine.advance(dt);
                let Some(p) = engine.projectiles().first() else { break };
                prop_assert!(p.active);
                prop_assert_eq!(p.trail.len(), k + 1);
                prop_assert_eq!(p.trail.first(), Some(start));
                prop_assert_eq!(p.trail.last(), Some(p.position));
            }
        }

        #[test]
        fn prop_inward_pass_crosses_each_shell_once(
            polar in 0.0f32..std::f32::consts::PI,
            azimuth in 0.0f32..std::f32::consts::TAU,
            start in 330.0f32..600.0,
            speed in 10.0f32..50.0,
            dt in 0.01f32..0.1,
        ) {
            let params = EngineParams {
                dome: Dome::new(Vec3::new(0.0, 1000.0, 0.0), 300.0, 320.0),
                ..Default::default()
            };
            let mut engine = TrajectoryEngine::new(params, 1).unwrap();
            let dir = crate::spherical_to_cartesian(1.0, polar, azimuth);
            let center = engine.dome().center;
            engine.spawn(center + dir * start, -dir * speed);

            // Travel well past the center
            let steps = ((start + 50.0) / (speed * dt)).ceil() as usize;
            for _ in 0..steps {
                engine.advance(dt);
            }
            prop_assert_eq!(engine.markers().outer_entries.len(), 1);
            prop_assert_eq!(engine.markers().inner_entries.len(), 1);
        }
    }
}
