use std::collections::HashMap;

use super::graph::{EdgeKey, PoiGraph};
use super::CancelToken;
use crate::error::LayoutError;
use crate::geometry::{segments_intersect, shares_endpoint_xz};

/// Two roads whose ground projections cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingPair {
    /// The road that gets sacrificed if this pair is resolved.
    pub longer: EdgeKey,
    pub shorter: EdgeKey,
}

impl CrossingPair {
    pub fn involves(&self, key: EdgeKey) -> bool {
        self.longer == key || self.shorter == key
    }
}

/// Every crossing pair in the graph, in the order the removal loop consumes
/// them: edges are visited longest first, and each edge is paired with the
/// later (shorter or equal) edges it crosses.
///
/// Roads sharing a projected endpoint never count as crossing. This is the
/// O(E^2) hot spot of the whole build, so cancellation is checked once per
/// outer edge.
pub fn find_crossing_pairs(
    graph: &PoiGraph,
    cancel: &CancelToken,
) -> Result<Vec<CrossingPair>, LayoutError> {
    let ordered = graph.edges_longest_first();
    let mut pairs = Vec::new();

    for (i, &(first, first_weight)) in ordered.iter().enumerate() {
        cancel.check()?;
        let (a0, a1) = (graph.position(first.a), graph.position(first.b));

        for &(second, second_weight) in &ordered[i + 1..] {
            let (b0, b1) = (graph.position(second.a), graph.position(second.b));
            if shares_endpoint_xz(a0, a1, b0, b1) {
                continue;
            }
            if !segments_intersect(a0, a1, b0, b1) {
                continue;
            }
            // Ties go to the edge visited first.
            let pair = if first_weight < second_weight {
                CrossingPair {
                    longer: second,
                    shorter: first,
                }
            } else {
                CrossingPair {
                    longer: first,
                    shorter: second,
                }
            };
            pairs.push(pair);
        }
    }

    Ok(pairs)
}

/// Result of resolving all crossings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanarityOutcome {
    pub crossing_pairs: usize,
    pub removed: Vec<EdgeKey>,
}

/// Remove the longer road of every crossing pair until no crossings remain.
///
/// The pair list is computed once. Resolving the first live pair deletes its
/// longer edge and retires every other pair that mentions that edge; pairs
/// are never re-tested, since deleting an edge can only invalidate pairs that
/// reference it. Retired pairs are tagged in place rather than spliced out,
/// so the scan is a single forward pass.
pub fn remove_crossings(
    graph: &mut PoiGraph,
    cancel: &CancelToken,
) -> Result<PlanarityOutcome, LayoutError> {
    let pairs = find_crossing_pairs(graph, cancel)?;

    let mut pairs_by_edge: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (idx, pair) in pairs.iter().enumerate() {
        pairs_by_edge.entry(pair.longer).or_default().push(idx);
        pairs_by_edge.entry(pair.shorter).or_default().push(idx);
    }

    let mut live = vec![true; pairs.len()];
    let mut removed = Vec::new();

    for (idx, pair) in pairs.iter().enumerate() {
        if !live[idx] {
            continue;
        }
        let victim = pair.longer;
        graph.remove(victim);
        removed.push(victim);

        if let Some(referencing) = pairs_by_edge.get(&victim) {
            for &other in referencing {
                debug_assert!(pairs[other].involves(victim));
                live[other] = false;
            }
        }
    }

    Ok(PlanarityOutcome {
        crossing_pairs: pairs.len(),
        removed,
    })
}
