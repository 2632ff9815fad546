use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use road_network::{RoadLayoutParams, RoadNetworkPlugin};

mod overlay;
mod scene;

/// Environment variable naming a JSON file with `RoadLayoutParams` overrides.
const PARAMS_ENV: &str = "ROAD_LAYOUT_PARAMS";

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Settlement".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .add_plugins((RoadNetworkPlugin, scene::PoiScenePlugin, overlay::OverlayPlugin))
    .add_systems(Startup, load_params_override);

    app.run();
}

/// Replace the default layout parameters with the file named by
/// `ROAD_LAYOUT_PARAMS`, if set. A bad file is logged and ignored.
fn load_params_override(mut params: ResMut<RoadLayoutParams>) {
    let Ok(path) = std::env::var(PARAMS_ENV) else {
        return;
    };

    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not read road layout params from {}: {}", path, e);
            return;
        }
    };

    match RoadLayoutParams::from_json(&json) {
        Ok(loaded) => {
            info!("Loaded road layout params from {}: {:?}", path, loaded);
            *params = loaded;
        }
        Err(e) => warn!("Ignoring road layout params in {}: {}", path, e),
    }
}
