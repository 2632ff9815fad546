use bevy::prelude::*;

/// Marks an entity whose world position is a point of interest to be
/// connected by roads.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(Transform)]
pub struct Poi;

/// Immutable, ordered, exact-value-deduplicated list of POI positions taken
/// at the start of a build.
///
/// Equality is exact: positions are expected to come from the scene
/// unmodified, and near-duplicates are treated as distinct POIs. Callers
/// that derive positions through lossy transforms must snap them first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiSnapshot {
    positions: Vec<Vec3>,
}

impl PoiSnapshot {
    /// Build a snapshot from positions in order, keeping the first occurrence
    /// of every distinct position. Non-finite positions are dropped.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut unique: Vec<Vec3> = Vec::new();
        let mut dropped = 0usize;
        for pos in positions {
            if !pos.is_finite() {
                dropped += 1;
                continue;
            }
            if !unique.contains(&pos) {
                unique.push(pos);
            }
        }
        if dropped > 0 {
            warn!("Ignoring {} POI(s) with non-finite positions", dropped);
        }
        Self { positions: unique }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Collect the current POI snapshot from the world, ordered by entity.
pub fn snapshot_pois<'a, I>(pois: I) -> PoiSnapshot
where
    I: IntoIterator<Item = (Entity, &'a GlobalTransform)>,
{
    let mut entries: Vec<(Entity, Vec3)> = pois
        .into_iter()
        .map(|(entity, transform)| (entity, transform.translation()))
        .collect();
    entries.sort_by_key(|(entity, _)| *entity);
    PoiSnapshot::from_positions(entries.into_iter().map(|(_, pos)| pos))
}
