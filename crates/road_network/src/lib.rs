use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub mod config;
pub mod error;
pub mod geometry;
pub mod invariant_checks;
pub mod layout;
pub mod layout_task;
pub mod poi;

pub use config::RoadLayoutParams;
pub use error::LayoutError;
pub use layout::{build_road_layout, PoiConnection, RoadLayout};
pub use layout_task::{CancelRoadLayout, RoadLayoutBuilder, RoadLayoutRebuilt};
pub use poi::Poi;

/// Derives roads between all `Poi` entities and keeps the `RoadLayout`
/// resource in sync with them.
///
/// Insert a `RoadLayoutParams` resource before adding the plugin to override
/// the defaults.
pub struct RoadNetworkPlugin;

impl Plugin for RoadNetworkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadLayoutParams>()
            .init_resource::<RoadLayout>()
            .init_resource::<RoadLayoutBuilder>()
            .add_event::<RoadLayoutRebuilt>()
            .add_event::<CancelRoadLayout>()
            .add_systems(
                Update,
                (
                    layout_task::handle_cancel_requests,
                    layout_task::collect_road_layout,
                )
                    .chain(),
            )
            // Sample POI positions after this frame's transforms settle.
            .add_systems(
                PostUpdate,
                layout_task::request_road_layout.after(TransformSystem::TransformPropagate),
            );

        app.add_plugins(invariant_checks::LayoutInvariantChecksPlugin);
    }
}
