pub mod animation;
pub mod error;
pub mod generation;
pub mod heightmap;
pub mod meshing;
pub mod render;
pub mod settings;

pub use animation::FrameAnimator;
pub use error::{Error, Result};
pub use heightmap::{HeightMap, HeightSampler, SampleHeight};
pub use render::TerrainStripPlugin;
pub use settings::TerrainSettings;
