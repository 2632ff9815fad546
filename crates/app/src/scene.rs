//! POI scatter and keyboard editing.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use road_network::{CancelRoadLayout, Poi};

const DEFAULT_SEED: u64 = 42;
const INITIAL_POIS: usize = 24;
/// POIs are placed within +/- this distance of the origin on X and Z.
const HALF_EXTENT: f32 = 150.0;

/// Seeded source of new POI positions. `SETTLEMENT_SEED` overrides the seed.
#[derive(Resource)]
pub struct PoiScatter {
    rng: ChaCha8Rng,
}

impl PoiScatter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn next_position(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
            0.0,
            self.rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
        )
    }
}

fn seed_from_env() -> u64 {
    match std::env::var("SETTLEMENT_SEED") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("SETTLEMENT_SEED={:?} is not a u64; using {}", raw, DEFAULT_SEED);
            DEFAULT_SEED
        }),
        Err(_) => DEFAULT_SEED,
    }
}

fn setup_scene(mut commands: Commands) {
    let seed = seed_from_env();
    info!("Scattering {} POIs with seed {}", INITIAL_POIS, seed);

    let mut scatter = PoiScatter::new(seed);
    for _ in 0..INITIAL_POIS {
        commands.spawn((Poi, Transform::from_translation(scatter.next_position())));
    }
    commands.insert_resource(scatter);

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 320.0, 260.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// `Space` adds a POI, `Backspace` removes the newest one, `Escape` cancels
/// the running build.
fn edit_pois(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    scatter: Option<ResMut<PoiScatter>>,
    pois: Query<Entity, With<Poi>>,
    mut cancel: EventWriter<CancelRoadLayout>,
) {
    if keys.just_pressed(KeyCode::Space) {
        if let Some(mut scatter) = scatter {
            let pos = scatter.next_position();
            commands.spawn((Poi, Transform::from_translation(pos)));
            debug!("Added POI at {}", pos);
        }
    }

    if keys.just_pressed(KeyCode::Backspace) {
        if let Some(newest) = pois.iter().max() {
            commands.entity(newest).despawn();
            debug!("Removed POI {:?}", newest);
        }
    }

    if keys.just_pressed(KeyCode::Escape) {
        cancel.send(CancelRoadLayout);
    }
}

pub struct PoiScenePlugin;

impl Plugin for PoiScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, edit_pois);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scatter_is_seeded() {
        let mut a = PoiScatter::new(7);
        let mut b = PoiScatter::new(7);
        for _ in 0..10 {
            assert_eq!(a.next_position(), b.next_position());
        }
    }

    #[test]
    fn test_scatter_stays_on_ground_within_extent() {
        let mut scatter = PoiScatter::new(DEFAULT_SEED);
        for _ in 0..100 {
            let p = scatter.next_position();
            assert_eq!(p.y, 0.0);
            assert!(p.x.abs() <= HALF_EXTENT && p.z.abs() <= HALF_EXTENT);
        }
    }
}
