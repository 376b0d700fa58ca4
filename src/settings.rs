use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::heightmap::DEFAULT_HEIGHT_SCALE;
use crate::meshing::VertexColoring;

pub const DEFAULT_SETTINGS_PATH: &str = "terrain.toml";

/// Everything the viewer reads from `terrain.toml`. Missing keys take their
/// default values.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub cols: usize,
    pub rows: usize,
    /// Grayscale heightmap image. Procedural noise is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heightmap: Option<PathBuf>,
    pub height_scale: f32,
    pub seed: u32,
    pub procedural_size: (usize, usize),
    pub refresh_rate_hz: f32,
    pub wireframe: bool,
    // tables last, toml wants plain keys first
    pub coloring: VertexColoring,
    pub camera: CameraSettings,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            cols: 240,
            rows: 240,
            heightmap: None,
            height_scale: DEFAULT_HEIGHT_SCALE,
            seed: 2,
            procedural_size: (256, 256),
            refresh_rate_hz: 60.,
            wireframe: true,
            coloring: VertexColoring::default(),
            camera: CameraSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    /// Where the terrain sits relative to the camera.
    pub offset: [f32; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.,
            aspect_ratio: 16. / 9.,
            near: 0.1,
            far: 100.,
            offset: [0., -0.13, -0.6],
        }
    }
}

impl TerrainSettings {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings file if it can be read, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(settings) => {
                info!("loaded terrain settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!(
                    "using default terrain settings, could not read {}: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Refresh rate fed to the animator; falls back to 60 Hz when the
    /// configured value cannot be divided by.
    pub fn effective_refresh_rate(&self) -> f32 {
        if self.refresh_rate_hz.is_finite() && self.refresh_rate_hz > 0. {
            self.refresh_rate_hz
        } else {
            60.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::meshing::GREEN;

    #[test]
    fn test_defaults() {
        let settings = TerrainSettings::default();

        assert_eq!((settings.cols, settings.rows), (240, 240));
        assert_eq!(settings.height_scale, 0.0008);
        assert_eq!(settings.coloring, VertexColoring::Solid { color: GREEN });
        assert_eq!(settings.camera.offset, [0., -0.13, -0.6]);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = TerrainSettings::from_toml(
            r#"
            cols = 32
            rows = 16
            heightmap = "assets/heightmap-1.png"

            [camera]
            fov_degrees = 45.0
            "#,
        )
        .unwrap();

        assert_eq!((settings.cols, settings.rows), (32, 16));
        assert_eq!(
            settings.heightmap,
            Some(PathBuf::from("assets/heightmap-1.png"))
        );
        assert_eq!(settings.camera.fov_degrees, 45.);
        assert_eq!(settings.camera.near, 0.1);
        assert_eq!(settings.refresh_rate_hz, 60.);
    }

    #[test]
    fn test_elevation_coloring_from_toml() {
        let settings = TerrainSettings::from_toml(
            r#"
            [coloring]
            mode = "elevation"
            low = [0.1, 0.3, 0.1]
            high = [1.0, 1.0, 1.0]
            max_height = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.coloring,
            VertexColoring::Elevation {
                low: [0.1, 0.3, 0.1],
                high: [1., 1., 1.],
                max_height: 0.2,
            }
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result = TerrainSettings::from_toml("cols = \"many\"");
        assert!(matches!(result, Err(Error::SettingsParse(_))));
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join("terrain_strip_settings_test.toml");
        let mut settings = TerrainSettings::default();
        settings.cols = 12;
        settings.wireframe = false;

        settings.save_to_file(&path).unwrap();
        let loaded = TerrainSettings::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = TerrainSettings::load_or_default("does/not/exist.toml");
        assert_eq!(settings, TerrainSettings::default());
    }

    #[test]
    fn test_unusable_refresh_rate_falls_back() {
        let mut settings = TerrainSettings::default();
        settings.refresh_rate_hz = 0.;
        assert_eq!(settings.effective_refresh_rate(), 60.);
        settings.refresh_rate_hz = 144.;
        assert_eq!(settings.effective_refresh_rate(), 144.);
    }
}
