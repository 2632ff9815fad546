use bevy::math::Vec3;

use super::graph::{EdgeKey, PoiGraph};

/// Connect every POI to every other POI, weighting each road by its
/// straight-line length. `N` POIs yield `N * (N - 1) / 2` edges.
pub fn complete_graph(positions: &[Vec3]) -> PoiGraph {
    let mut graph = PoiGraph::new(positions);
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            graph.insert(EdgeKey::new(i, j), positions[i].distance(positions[j]));
        }
    }
    graph
}
