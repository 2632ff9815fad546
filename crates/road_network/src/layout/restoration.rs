use bevy::math::Vec3;

use super::graph::{EdgeKey, PoiGraph};
use crate::error::LayoutError;
use crate::geometry::lerp_waypoint;

/// Re-add pruned roads, shortest first, wherever both endpoints are still
/// strictly under the degree cap. Returns the number of roads restored.
///
/// Greedy and order dependent: a short road restored early can use up the
/// capacity a later, longer road needed at a shared POI.
pub fn restore_edges(graph: &mut PoiGraph, mut restorable: Vec<(EdgeKey, f32)>, cap: u32) -> usize {
    let cap = cap as usize;
    restorable.sort_by(|x, y| x.1.total_cmp(&y.1));

    let mut restored = 0;
    for (key, distance) in restorable {
        if graph.degree(key.a) < cap && graph.degree(key.b) < cap && graph.insert(key, distance) {
            restored += 1;
        }
    }
    restored
}

/// Most waypoints a single road may carry. Kept well under 2^24 so every
/// `i / (count + 1)` parameter stays exactly representable and below 1.0.
pub const MAX_INTERSECTIONS_PER_ROAD: usize = 1 << 20;

/// Number of waypoints placed on a road of length `distance`.
///
/// Fails with `InvalidParams` when `spacing` is so small relative to the
/// road that the count would exceed [`MAX_INTERSECTIONS_PER_ROAD`].
pub fn intersection_count(distance: f32, spacing: f32) -> Result<usize, LayoutError> {
    let ratio = distance / spacing;
    if !ratio.is_finite() || ratio >= (MAX_INTERSECTIONS_PER_ROAD + 1) as f32 {
        return Err(LayoutError::InvalidParams(format!(
            "min_intersection_distance {spacing} would put {ratio} waypoints on a road of length {distance}; at most {MAX_INTERSECTIONS_PER_ROAD} are allowed"
        )));
    }
    // Truncation, not rounding.
    Ok(ratio as usize)
}

/// Evenly spaced waypoints strictly inside `a -> b`.
pub fn intersections_along(
    a: Vec3,
    b: Vec3,
    distance: f32,
    spacing: f32,
) -> Result<Vec<Vec3>, LayoutError> {
    let count = intersection_count(distance, spacing)?;
    let steps = count
        .checked_add(1)
        .ok_or_else(|| LayoutError::InvalidParams(format!("waypoint count {count} overflows")))?
        as f32;
    Ok((1..=count)
        .map(|i| lerp_waypoint(a, b, i as f32 / steps))
        .collect())
}

/// Waypoints for every road in the graph, in edge order.
pub fn place_intersections(graph: &PoiGraph, spacing: f32) -> Result<Vec<Vec3>, LayoutError> {
    let mut waypoints = Vec::new();
    for (key, distance) in graph.edges() {
        waypoints.extend(intersections_along(
            graph.position(key.a),
            graph.position(key.b),
            distance,
            spacing,
        )?);
    }
    Ok(waypoints)
}
