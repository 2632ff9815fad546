//! Gizmo rendering of the published road layout.

use bevy::color::palettes::css::{GOLD, ORANGE_RED};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use road_network::{Poi, RoadLayout, RoadLayoutBuilder, RoadLayoutRebuilt};

const ROAD_COLOR: Color = Color::WHITE;
const ROAD_STALE_COLOR: Color = Color::srgb(0.45, 0.45, 0.45);
const POI_RADIUS: f32 = 3.0;
const INTERSECTION_RADIUS: f32 = 1.2;

/// Roads turn grey while a rebuild is running, since they may no longer
/// match the POIs on screen.
fn draw_road_layout(mut gizmos: Gizmos, layout: Res<RoadLayout>, builder: Res<RoadLayoutBuilder>) {
    let road_color = if builder.is_building() {
        ROAD_STALE_COLOR
    } else {
        ROAD_COLOR
    };

    for connection in &layout.connections {
        gizmos.line(connection.a, connection.b, road_color);
    }
    for &waypoint in &layout.intersections {
        gizmos.sphere(Isometry3d::from_translation(waypoint), INTERSECTION_RADIUS, GOLD);
    }
}

/// POIs are drawn from the live entities, so new ones show up before their
/// roads do.
fn draw_pois(mut gizmos: Gizmos, pois: Query<&GlobalTransform, With<Poi>>) {
    for transform in &pois {
        gizmos.sphere(
            Isometry3d::from_translation(transform.translation()),
            POI_RADIUS,
            ORANGE_RED,
        );
    }
}

fn update_window_title(
    mut rebuilt: EventReader<RoadLayoutRebuilt>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(event) = rebuilt.read().last() else {
        return;
    };
    if let Ok(mut window) = windows.get_single_mut() {
        window.title = format!(
            "Settlement - {} POIs, {} roads, {} intersections",
            event.poi_count, event.connection_count, event.intersection_count
        );
    }
}

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_road_layout, draw_pois, update_window_title));
    }
}
