//! Error type shared by the heightmap loader, the mesh builder and the settings file.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A strip needs at least one cell; zero is rejected instead of clamped
    /// because it breaks the vertex count formula.
    #[error("grid must be at least 1x1, got {cols}x{rows}")]
    InvalidGrid { cols: usize, rows: usize },

    #[error("heightmap has no texels")]
    EmptyHeightMap,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("could not serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),
}
