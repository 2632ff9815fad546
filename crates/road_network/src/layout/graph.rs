use std::collections::{BTreeMap, BTreeSet};

use bevy::math::Vec3;
use pathfinding::prelude::bfs_reach;

/// Unordered pair of POI indices. Always stored with `a < b`, so the same
/// road has exactly one key regardless of direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub a: usize,
    pub b: usize,
}

impl EdgeKey {
    pub fn new(x: usize, y: usize) -> Self {
        debug_assert_ne!(x, y, "self-loops are not roads");
        if x < y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn touches(&self, v: usize) -> bool {
        self.a == v || self.b == v
    }
}

/// Weighted undirected graph over a fixed POI list.
///
/// The edge map and the per-POI adjacency sets are mutated together, so a
/// POI's degree always matches the number of edge keys that touch it.
/// Iteration over edges follows key order, which for the complete graph is
/// the `(i, j)` order pairs were generated in.
#[derive(Debug, Clone, Default)]
pub struct PoiGraph {
    positions: Vec<Vec3>,
    edges: BTreeMap<EdgeKey, f32>,
    adjacency: Vec<BTreeSet<usize>>,
}

impl PoiGraph {
    pub fn new(positions: &[Vec3]) -> Self {
        Self {
            positions: positions.to_vec(),
            edges: BTreeMap::new(),
            adjacency: vec![BTreeSet::new(); positions.len()],
        }
    }

    pub fn poi_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn position(&self, v: usize) -> Vec3 {
        self.positions[v]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    pub fn weight(&self, key: EdgeKey) -> Option<f32> {
        self.edges.get(&key).copied()
    }

    pub fn contains(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(&key)
    }

    /// Insert an edge. Returns `false` (and changes nothing) if it already exists.
    pub fn insert(&mut self, key: EdgeKey, weight: f32) -> bool {
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, weight);
        self.adjacency[key.a].insert(key.b);
        self.adjacency[key.b].insert(key.a);
        true
    }

    /// Remove an edge, returning its weight if it was present.
    pub fn remove(&mut self, key: EdgeKey) -> Option<f32> {
        let weight = self.edges.remove(&key)?;
        self.adjacency[key.a].remove(&key.b);
        self.adjacency[key.b].remove(&key.a);
        Some(weight)
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, f32)> + '_ {
        self.edges.iter().map(|(&k, &w)| (k, w))
    }

    /// Edges sorted longest first. The sort is stable, so equal weights keep
    /// key order.
    pub fn edges_longest_first(&self) -> Vec<(EdgeKey, f32)> {
        let mut ordered: Vec<(EdgeKey, f32)> = self.edges().collect();
        ordered.sort_by(|x, y| y.1.total_cmp(&x.1));
        ordered
    }

    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[v].iter().copied()
    }

    /// Number of POIs reachable from `start` (including `start`) when
    /// `excluded` is treated as absent.
    ///
    /// Walks the whole component, so each call is O(N + E).
    pub fn reachable_count_without(&self, start: usize, excluded: EdgeKey) -> usize {
        bfs_reach(start, |&v| {
            self.adjacency[v]
                .iter()
                .copied()
                .filter(move |&n| EdgeKey::new(v, n) != excluded)
        })
        .count()
    }

    /// Number of POIs reachable from `start`, including `start`.
    pub fn reachable_count(&self, start: usize) -> usize {
        bfs_reach(start, |&v| self.adjacency[v].iter().copied()).count()
    }
}
