//! Road layout builder: turns a set of POI positions into a planar,
//! connected, degree-bounded road graph plus the waypoints along each road.
//!
//! The build runs four stages in order:
//! 1. [`candidates`]: connect every POI to every other POI.
//! 2. [`planarity`]: drop the longer road of every crossing pair.
//! 3. [`pruning`]: drop roads that are too long or overload a POI, unless
//!    that would strand a POI or split the map.
//! 4. [`restoration`]: re-add short pruned roads where capacity allows, then
//!    subdivide every road into waypoints.
//!
//! The whole build is deterministic for a given POI order and parameters.

pub mod candidates;
mod graph;
pub mod planarity;
pub mod pruning;
pub mod restoration;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use pathfinding::prelude::bfs_reach;

pub use graph::{EdgeKey, PoiGraph};

use crate::config::RoadLayoutParams;
use crate::error::LayoutError;
use crate::geometry::{segments_intersect, shares_endpoint_xz};
use crate::poi::PoiSnapshot;

/// Cooperative cancellation flag shared between a running build and
/// whoever scheduled it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> Result<(), LayoutError> {
        if self.is_cancelled() {
            Err(LayoutError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A surviving road between two POIs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoiConnection {
    /// Index of the first endpoint in [`RoadLayout::pois`].
    pub start: usize,
    /// Index of the second endpoint in [`RoadLayout::pois`]; always `> start`.
    pub end: usize,
    pub a: Vec3,
    pub b: Vec3,
    pub distance: f32,
}

impl PoiConnection {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.start, self.end)
    }
}

/// Counters describing what each stage did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub candidate_edges: usize,
    pub crossing_pairs: usize,
    pub removed_for_crossings: usize,
    pub pruned: usize,
    pub restored: usize,
}

/// The published output of a build: the road graph and its waypoints.
///
/// Replaced as a whole when a new build completes, so readers always see a
/// graph and waypoint list from the same build.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RoadLayout {
    /// The deduplicated POI positions the layout was built from.
    pub pois: Vec<Vec3>,
    pub connections: Vec<PoiConnection>,
    /// Road intersection waypoints. Order carries no meaning.
    pub intersections: Vec<Vec3>,
    /// Waypoint spacing the layout was built with.
    pub intersection_spacing: f32,
    pub stats: LayoutStats,
}

impl RoadLayout {
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn connection(&self, x: usize, y: usize) -> Option<&PoiConnection> {
        let key = EdgeKey::new(x, y);
        self.connections.iter().find(|c| c.key() == key)
    }

    pub fn degree(&self, poi: usize) -> usize {
        self.connections
            .iter()
            .filter(|c| c.start == poi || c.end == poi)
            .count()
    }

    /// Whether every POI can reach every other POI. Trivially true with
    /// fewer than two POIs.
    pub fn is_connected(&self) -> bool {
        if self.pois.len() < 2 {
            return true;
        }
        let mut adjacency = vec![Vec::new(); self.pois.len()];
        for c in &self.connections {
            adjacency[c.start].push(c.end);
            adjacency[c.end].push(c.start);
        }
        bfs_reach(0usize, |&v| adjacency[v].iter().copied()).count() == self.pois.len()
    }

    /// Index pairs (into `connections`) of roads whose ground projections
    /// cross away from a shared endpoint. Empty for a valid layout.
    pub fn crossing_connections(&self) -> Vec<(usize, usize)> {
        let mut crossings = Vec::new();
        for (i, first) in self.connections.iter().enumerate() {
            for (j, second) in self.connections.iter().enumerate().skip(i + 1) {
                if shares_endpoint_xz(first.a, first.b, second.a, second.b) {
                    continue;
                }
                if segments_intersect(first.a, first.b, second.a, second.b) {
                    crossings.push((i, j));
                }
            }
        }
        crossings
    }

    fn from_graph(
        graph: &PoiGraph,
        intersections: Vec<Vec3>,
        intersection_spacing: f32,
        stats: LayoutStats,
    ) -> Self {
        let connections = graph
            .edges()
            .map(|(key, distance)| PoiConnection {
                start: key.a,
                end: key.b,
                a: graph.position(key.a),
                b: graph.position(key.b),
                distance,
            })
            .collect();
        Self {
            pois: graph.positions().to_vec(),
            connections,
            intersections,
            intersection_spacing,
            stats,
        }
    }
}

/// Build a layout from raw positions. Duplicates are removed first.
pub fn build_road_layout(
    points: &[Vec3],
    params: &RoadLayoutParams,
) -> Result<RoadLayout, LayoutError> {
    build_road_layout_with_cancel(points, params, &CancelToken::default())
}

/// [`build_road_layout`] with a cancellation token checked between the
/// outer iterations of the crossing and pruning stages.
pub fn build_road_layout_with_cancel(
    points: &[Vec3],
    params: &RoadLayoutParams,
    cancel: &CancelToken,
) -> Result<RoadLayout, LayoutError> {
    let snapshot = PoiSnapshot::from_positions(points.iter().copied());
    build_from_snapshot(&snapshot, params, cancel)
}

/// Run all four stages over an already deduplicated snapshot.
pub fn build_from_snapshot(
    snapshot: &PoiSnapshot,
    params: &RoadLayoutParams,
    cancel: &CancelToken,
) -> Result<RoadLayout, LayoutError> {
    params.validate()?;

    let positions = snapshot.positions();
    if positions.len() < 2 {
        return Ok(RoadLayout {
            pois: positions.to_vec(),
            intersection_spacing: params.min_intersection_distance,
            ..Default::default()
        });
    }

    let mut stats = LayoutStats::default();

    let mut graph = {
        #[cfg(feature = "trace")]
        let _span = bevy::log::info_span!("road_layout_candidates").entered();
        candidates::complete_graph(positions)
    };
    stats.candidate_edges = graph.edge_count();

    {
        #[cfg(feature = "trace")]
        let _span = bevy::log::info_span!("road_layout_planarity").entered();
        let outcome = planarity::remove_crossings(&mut graph, cancel)?;
        stats.crossing_pairs = outcome.crossing_pairs;
        stats.removed_for_crossings = outcome.removed.len();
    }

    let restorable = {
        #[cfg(feature = "trace")]
        let _span = bevy::log::info_span!("road_layout_pruning").entered();
        let outcome = pruning::prune_edges(&mut graph, params, cancel)?;
        stats.pruned = outcome.removed;
        outcome.restorable
    };

    let intersections = {
        #[cfg(feature = "trace")]
        let _span = bevy::log::info_span!("road_layout_restoration").entered();
        stats.restored =
            restoration::restore_edges(&mut graph, restorable, params.max_poi_connections);
        restoration::place_intersections(&graph, params.min_intersection_distance)?
    };

    debug!(
        "Road layout: {} POIs, {} candidates, {} crossing pairs ({} removed), {} pruned, {} restored, {} roads, {} intersections",
        positions.len(),
        stats.candidate_edges,
        stats.crossing_pairs,
        stats.removed_for_crossings,
        stats.pruned,
        stats.restored,
        graph.edge_count(),
        intersections.len()
    );

    Ok(RoadLayout::from_graph(
        &graph,
        intersections,
        params.min_intersection_distance,
        stats,
    ))
}
