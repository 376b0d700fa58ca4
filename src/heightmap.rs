use std::path::Path;

use image::DynamicImage;
use ndarray::Array2;

use crate::error::{Error, Result};

/// Elevation scale applied to 8-bit intensities.
pub const DEFAULT_HEIGHT_SCALE: f32 = 0.0008;

/// Raw per-texel intensities, indexed `[[x, y]]`.
pub struct HeightMap(pub Array2<f32>);

impl HeightMap {
    /// Grayscale intensity (0..=255) of every pixel.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyHeightMap);
        }

        let data = Array2::from_shape_fn((width as usize, height as usize), |(x, y)| {
            let [r, g, b] = rgb.get_pixel(x as u32, y as u32).0;
            gray(r, g, b)
        });

        Ok(Self(data))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path)?;
        Self::from_image(&image)
    }

    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        self.0[[x, y]]
    }

    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Nearest texel for a plane coordinate pair. Coordinates outside
    /// `[-0.5, 0.5]` land on the closest edge texel.
    pub fn texel_at(&self, u: f32, v: f32) -> (usize, usize) {
        let (width, height) = self.dim();
        (to_texel(u, width), to_texel(v, height))
    }

    pub fn multiply(&mut self, mult: f32) {
        self.0.map_inplace(|v| *v *= mult);
    }

    pub fn clamp(&mut self, min: f32, max: f32) {
        self.0.map_inplace(|v| *v = v.clamp(min, max));
    }
}

// Integer luma weights, 11:16:5 out of 32.
fn gray(r: u8, g: u8, b: u8) -> f32 {
    ((r as u32 * 11 + g as u32 * 16 + b as u32 * 5) / 32) as f32
}

fn to_texel(coord: f32, size: usize) -> usize {
    let coord = if coord.is_nan() {
        -0.5
    } else {
        coord.clamp(-0.5, 0.5)
    };
    (((coord + 0.5) * size as f32) as usize).min(size - 1)
}

/// Elevation lookup at a plane coordinate in `[-0.5, 0.5]²`.
///
/// This is all the mesh builder knows about the terrain, so anything that
/// can answer a height query (an image, a noise function, a closure) can be
/// meshed.
pub trait SampleHeight {
    fn sample(&self, u: f32, v: f32) -> f32;
}

impl<F> SampleHeight for F
where
    F: Fn(f32, f32) -> f32,
{
    fn sample(&self, u: f32, v: f32) -> f32 {
        self(u, v)
    }
}

/// Nearest-texel sampler over a borrowed [`HeightMap`].
#[derive(Clone, Copy)]
pub struct HeightSampler<'a> {
    map: &'a HeightMap,
    scale: f32,
}

impl<'a> HeightSampler<'a> {
    /// Fails on a map without texels, which has no edge to clamp to.
    pub fn new(map: &'a HeightMap, scale: f32) -> Result<Self> {
        let (width, height) = map.dim();
        if width == 0 || height == 0 {
            return Err(Error::EmptyHeightMap);
        }
        Ok(Self { map, scale })
    }
}

impl SampleHeight for HeightSampler<'_> {
    fn sample(&self, u: f32, v: f32) -> f32 {
        let (x, y) = self.map.texel_at(u, v);
        self.map.height_at(x, y) * self.scale
    }
}
