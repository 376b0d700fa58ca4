use std::path::PathBuf;

use terrain_strip::{settings::DEFAULT_SETTINGS_PATH, TerrainSettings, TerrainStripPlugin};

use bevy::{
    pbr::wireframe::WireframePlugin,
    prelude::*,
    render::{
        settings::{WgpuFeatures, WgpuSettings},
        RenderPlugin,
    },
};

/// `viewer [settings.toml]` runs the viewer, `viewer --write-settings [settings.toml]`
/// writes the default settings file and exits.
fn main() -> terrain_strip::Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    let write_settings = args.next_if(|arg| arg == "--write-settings").is_some();
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));

    if write_settings {
        TerrainSettings::default().save_to_file(&settings_path)?;
        println!("wrote default settings to {}", settings_path.display());
        return Ok(());
    }

    let settings = TerrainSettings::load_or_default(&settings_path);

    App::new()
        .insert_resource(Msaa::Sample4)
        .insert_resource(settings)
        .add_plugins(
            DefaultPlugins
                .set(RenderPlugin {
                    wgpu_settings: WgpuSettings {
                        features: WgpuFeatures::POLYGON_MODE_LINE,
                        ..default()
                    },
                })
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "terrain strip".into(),
                        resolution: (800., 600.).into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugin(WireframePlugin)
        .add_plugin(TerrainStripPlugin { settings_path })
        .run();

    Ok(())
}
