//! Post-publish validation of the road layout.
//!
//! Runs once per `RoadLayoutRebuilt` and checks the guarantees downstream
//! placement relies on: no crossing roads, a connected map, no stranded
//! POIs, and one waypoint per spacing quantum on every road. Violations are
//! logged and counted, never corrected.

use bevy::prelude::*;

use crate::layout::restoration::intersection_count;
use crate::layout::RoadLayout;
use crate::layout_task::RoadLayoutRebuilt;

/// Violation counts from the most recent validation pass. Used by
/// integration tests.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct LayoutInvariantViolations {
    pub crossings: u32,
    pub disconnected: u32,
    pub isolated_pois: u32,
    pub waypoint_mismatches: u32,
    /// Number of layouts validated since startup.
    pub layouts_checked: u32,
}

impl LayoutInvariantViolations {
    pub fn total(&self) -> u32 {
        self.crossings + self.disconnected + self.isolated_pois + self.waypoint_mismatches
    }
}

/// Count violations in `layout` without touching any ECS state.
///
/// `disconnected` and `isolated_pois` can fire on a correctly built layout:
/// the crossing test treats disjoint collinear roads as crossing, so four or
/// more POIs on one line can leave an end POI without roads. Those two
/// counts flag input geometry worth looking at, not builder bugs. Crossings
/// and waypoint mismatches always are bugs.
pub fn check_layout(layout: &RoadLayout) -> LayoutInvariantViolations {
    let mut violations = LayoutInvariantViolations {
        crossings: layout.crossing_connections().len() as u32,
        ..Default::default()
    };

    if !layout.is_connected() {
        violations.disconnected = 1;
    }

    if layout.pois.len() > 1 {
        violations.isolated_pois = (0..layout.pois.len())
            .filter(|&poi| layout.degree(poi) == 0)
            .count() as u32;
    }

    if layout.intersection_spacing > 0.0 {
        let expected: Option<usize> = layout
            .connections
            .iter()
            .map(|c| intersection_count(c.distance, layout.intersection_spacing).ok())
            .sum();
        if expected != Some(layout.intersections.len()) {
            violations.waypoint_mismatches = 1;
        }
    }

    violations
}

/// Validate the freshly published layout.
pub fn validate_road_layout(
    mut rebuilt: EventReader<RoadLayoutRebuilt>,
    layout: Res<RoadLayout>,
    mut violations: ResMut<LayoutInvariantViolations>,
) {
    let Some(event) = rebuilt.read().last() else {
        return;
    };

    let checked = violations.layouts_checked + 1;
    *violations = check_layout(&layout);
    violations.layouts_checked = checked;

    if violations.crossings > 0 {
        warn!(
            "Invariant violation: {} crossing road pair(s) in layout generation {}",
            violations.crossings, event.generation
        );
    }
    if violations.disconnected > 0 {
        warn!(
            "Invariant violation: layout generation {} does not connect all {} POIs",
            event.generation,
            layout.pois.len()
        );
    }
    if violations.isolated_pois > 0 {
        warn!(
            "Invariant violation: {} POI(s) without roads in layout generation {}",
            violations.isolated_pois, event.generation
        );
    }
    if violations.waypoint_mismatches > 0 {
        warn!(
            "Invariant violation: waypoint count mismatch in layout generation {}",
            event.generation
        );
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct LayoutInvariantChecksPlugin;

impl Plugin for LayoutInvariantChecksPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayoutInvariantViolations>().add_systems(
            Update,
            validate_road_layout.after(crate::layout_task::collect_road_layout),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoadLayoutParams;
    use crate::layout::{build_road_layout, PoiConnection};

    fn p(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    fn connection(layout: &RoadLayout, start: usize, end: usize) -> PoiConnection {
        let (a, b) = (layout.pois[start], layout.pois[end]);
        PoiConnection {
            start,
            end,
            a,
            b,
            distance: a.distance(b),
        }
    }

    #[test]
    fn test_built_layout_is_clean() {
        let pois = [p(0.0, 0.0), p(30.0, 5.0), p(12.0, 40.0), p(-20.0, 18.0)];
        let layout = build_road_layout(&pois, &RoadLayoutParams::default()).unwrap();
        assert_eq!(check_layout(&layout).total(), 0);
    }

    #[test]
    fn test_collinear_pois_report_isolation_but_no_crossings() {
        let pois = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let params = RoadLayoutParams {
            min_intersection_distance: 0.5,
            ..Default::default()
        };
        let layout = build_road_layout(&pois, &params).unwrap();
        let violations = check_layout(&layout);
        assert_eq!(violations.isolated_pois, 1);
        assert_eq!(violations.disconnected, 1);
        assert_eq!(violations.crossings, 0);
        assert_eq!(violations.waypoint_mismatches, 0);
    }

    #[test]
    fn test_detects_crossing_roads() {
        let mut layout = RoadLayout {
            pois: vec![p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)],
            intersection_spacing: 100.0,
            ..Default::default()
        };
        layout.connections = vec![connection(&layout, 0, 1), connection(&layout, 2, 3)];
        let violations = check_layout(&layout);
        assert_eq!(violations.crossings, 1);
        assert_eq!(violations.disconnected, 1);
    }

    #[test]
    fn test_detects_isolated_poi() {
        let mut layout = RoadLayout {
            pois: vec![p(0.0, 0.0), p(10.0, 0.0), p(50.0, 50.0)],
            intersection_spacing: 100.0,
            ..Default::default()
        };
        layout.connections = vec![connection(&layout, 0, 1)];
        let violations = check_layout(&layout);
        assert_eq!(violations.isolated_pois, 1);
        assert_eq!(violations.disconnected, 1);
        assert_eq!(violations.crossings, 0);
    }

    #[test]
    fn test_detects_waypoint_mismatch() {
        let mut layout = RoadLayout {
            pois: vec![p(0.0, 0.0), p(10.0, 0.0)],
            intersection_spacing: 3.0,
            ..Default::default()
        };
        layout.connections = vec![connection(&layout, 0, 1)];
        layout.intersections = vec![p(5.0, 0.0)];
        assert_eq!(check_layout(&layout).waypoint_mismatches, 1);
    }
}
