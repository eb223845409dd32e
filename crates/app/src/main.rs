use std::path::Path;

use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use analytics::data::Dataset;
use analytics::settings::MapSettings;

mod demo;

const DEMO_SEED: u64 = 42;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Timescape".to_string(),
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
    .add_plugins((analytics::AnalyticsPlugin, ui::UiPlugin));

    if let Ok(path) = std::env::var("TIMESCAPE_SETTINGS") {
        app.insert_resource(MapSettings::load_or_default(Path::new(&path)));
    }

    let (points, regions) = match std::env::var("TIMESCAPE_DATA") {
        Ok(path) => match analytics::ingest::load_bundle(Path::new(&path)) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!("Data bundle {}: {}, loading demo data instead", path, e);
                demo::demo_dataset(DEMO_SEED)
            }
        },
        Err(_) => demo::demo_dataset(DEMO_SEED),
    };
    app.world_mut()
        .resource_mut::<Dataset>()
        .replace(points, regions);

    // Screenshot mode: capture one frame once the first passes settle, then exit
    if let Ok(path) = std::env::var("TIMESCAPE_SCREENSHOT") {
        app.insert_resource(ScreenshotRequest { path, frame: 0 });
        app.add_systems(Update, drive_screenshot);
    }

    app.run();
}

#[derive(Resource)]
struct ScreenshotRequest {
    path: String,
    frame: u32,
}

const SCREENSHOT_FRAME: u32 = 60;
const EXIT_FRAME: u32 = SCREENSHOT_FRAME + 20;

fn drive_screenshot(
    mut commands: Commands,
    mut request: ResMut<ScreenshotRequest>,
    mut exit: EventWriter<AppExit>,
) {
    request.frame += 1;
    if request.frame == SCREENSHOT_FRAME {
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(request.path.clone()));
    } else if request.frame >= EXIT_FRAME {
        exit.send(AppExit::Success);
    }
}
