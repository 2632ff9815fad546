use super::graph::{EdgeKey, PoiGraph};
use super::CancelToken;
use crate::config::RoadLayoutParams;
use crate::error::LayoutError;

/// Result of the degree/length pruning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneOutcome {
    pub removed: usize,
    /// Removed roads short enough to be considered for restoration, in the
    /// order they were removed (longest first).
    pub restorable: Vec<(EdgeKey, f32)>,
}

/// Whether deleting `excluded` would leave `from` unable to reach the rest
/// of the map. Losing sight of a single POI (the far end of the road) is
/// tolerated here; the symmetric check from the other end catches it.
pub fn would_orphan(graph: &PoiGraph, from: usize, excluded: EdgeKey) -> bool {
    graph.reachable_count_without(from, excluded) < graph.poi_count().saturating_sub(1)
}

/// Drop roads that are too long or that push a POI over its degree cap,
/// visiting roads longest first in a single pass.
///
/// A road is never dropped if either endpoint would be left with no roads,
/// or if dropping it would split the map. Each eligibility check walks the
/// current graph, giving O(E * (N + E)) overall; fine for settlements of a
/// few hundred POIs, the limit to revisit beyond that.
pub fn prune_edges(
    graph: &mut PoiGraph,
    params: &RoadLayoutParams,
    cancel: &CancelToken,
) -> Result<PruneOutcome, LayoutError> {
    let cap = params.max_poi_connections as usize;
    let max_distance = params.max_poi_connection_distance;
    let mut outcome = PruneOutcome::default();

    for (key, distance) in graph.edges_longest_first() {
        cancel.check()?;
        let (a, b) = (key.a, key.b);

        if graph.degree(a) <= 1 || graph.degree(b) <= 1 {
            continue;
        }
        let wants_removal = distance > max_distance || graph.degree(a) > cap || graph.degree(b) > cap;
        if !wants_removal {
            continue;
        }
        if would_orphan(graph, a, key) || would_orphan(graph, b, key) {
            continue;
        }

        graph.remove(key);
        outcome.removed += 1;
        if distance <= max_distance {
            outcome.restorable.push((key, distance));
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use bevy::math::Vec3;

    use super::*;
    use crate::layout::candidates::complete_graph;

    fn p(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    fn params(max_distance: f32, cap: u32) -> RoadLayoutParams {
        RoadLayoutParams {
            max_poi_connection_distance: max_distance,
            min_intersection_distance: 1.0,
            max_poi_connections: cap,
            max_intersection_connections: 0,
        }
    }

    #[test]
    fn test_long_edge_in_triangle_is_removed_and_not_restorable() {
        // 0-1 = 3, 1-2 = 4, 0-2 = 5
        let mut graph = complete_graph(&[p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0)]);
        let outcome = prune_edges(&mut graph, &params(4.5, 10), &CancelToken::default()).unwrap();

        assert_eq!(outcome.removed, 1);
        assert!(outcome.restorable.is_empty());
        assert!(!graph.contains(EdgeKey::new(0, 2)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_bridge_is_never_removed() {
        // Path graph: every edge is a bridge, so nothing may go even though
        // all edges exceed the max distance.
        let positions = [p(0.0, 0.0), p(10.0, 0.0), p(20.0, 0.0), p(30.0, 0.0)];
        let mut graph = PoiGraph::new(&positions);
        graph.insert(EdgeKey::new(0, 1), 10.0);
        graph.insert(EdgeKey::new(1, 2), 10.0);
        graph.insert(EdgeKey::new(2, 3), 10.0);

        let outcome = prune_edges(&mut graph, &params(1.0, 1), &CancelToken::default()).unwrap();
        assert_eq!(outcome.removed, 0);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_degree_one_endpoint_is_kept() {
        // Star: the hub is over the cap but every leaf has degree 1.
        let positions = [p(0.0, 0.0), p(5.0, 0.0), p(-5.0, 0.0), p(0.0, 5.0)];
        let mut graph = PoiGraph::new(&positions);
        for leaf in 1..4 {
            graph.insert(EdgeKey::new(0, leaf), 5.0);
        }
        let outcome = prune_edges(&mut graph, &params(100.0, 1), &CancelToken::default()).unwrap();
        assert_eq!(outcome.removed, 0);
        assert_eq!(graph.degree(0), 3);
    }

    #[test]
    fn test_over_cap_edge_is_restorable() {
        // Square with one diagonal: POIs 0 and 2 have degree 3 with cap 2.
        let positions = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)];
        let mut graph = PoiGraph::new(&positions);
        graph.insert(EdgeKey::new(0, 1), 4.0);
        graph.insert(EdgeKey::new(1, 2), 4.0);
        graph.insert(EdgeKey::new(2, 3), 4.0);
        graph.insert(EdgeKey::new(0, 3), 4.0);
        let diagonal = EdgeKey::new(0, 2);
        let diagonal_len = 32f32.sqrt();
        graph.insert(diagonal, diagonal_len);

        let outcome = prune_edges(&mut graph, &params(100.0, 2), &CancelToken::default()).unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.restorable, vec![(diagonal, diagonal_len)]);
        for v in 0..4 {
            assert_eq!(graph.degree(v), 2);
        }
    }

    #[test]
    fn test_would_orphan_detects_split() {
        let positions = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let mut graph = PoiGraph::new(&positions);
        graph.insert(EdgeKey::new(0, 1), 1.0);
        graph.insert(EdgeKey::new(1, 2), 1.0);
        graph.insert(EdgeKey::new(2, 3), 1.0);

        // Removing the middle edge leaves 0 seeing only {0, 1}.
        assert!(would_orphan(&graph, 0, EdgeKey::new(1, 2)));
        // Removing a leaf edge only hides the leaf from the hub side.
        assert!(!would_orphan(&graph, 2, EdgeKey::new(2, 3)));
        assert!(would_orphan(&graph, 3, EdgeKey::new(2, 3)));
    }

    #[test]
    fn test_complete_graph_stays_connected_under_tiny_cap() {
        let positions = [
            p(0.0, 0.0),
            p(12.0, 1.0),
            p(5.0, 9.0),
            p(-4.0, 6.0),
            p(8.0, -7.0),
        ];
        let mut graph = complete_graph(&positions);
        prune_edges(&mut graph, &params(0.5, 1), &CancelToken::default()).unwrap();
        assert_eq!(graph.reachable_count(0), positions.len());
        for v in 0..positions.len() {
            assert!(graph.degree(v) >= 1);
        }
    }

    #[test]
    fn test_cancelled_prune_returns_error() {
        let mut graph = complete_graph(&[p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0)]);
        let cancel = CancelToken::default();
        cancel.cancel();
        let result = prune_edges(&mut graph, &params(1.0, 1), &cancel);
        assert_eq!(result, Err(LayoutError::Cancelled));
    }
}
