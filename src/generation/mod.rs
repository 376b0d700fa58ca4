use super::heightmap::HeightMap;

use ndarray::prelude::*;
use noise::{NoiseFn, Perlin};

/// Largest value an 8-bit heightmap texel can hold.
pub const MAX_INTENSITY: f32 = 255.;

pub struct NoiseSettings {
    pub scale: f32,
    pub octaves: usize,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 5e-3,
            octaves: 8,
        }
    }
}

/// Fractal Perlin terrain with values in `0..1`.
pub fn perlin_terrain(
    (width, height): (usize, usize),
    seed: u32,
    noise_settings: NoiseSettings,
) -> HeightMap {
    let octaves = noise_settings.octaves.max(1);
    let scale_start = noise_settings.scale;

    let perlin = Perlin::new(seed);

    let mut data = Array::zeros((width, height));

    for y in 0..height {
        for x in 0..width {
            let mut scale = 1.;

            for i in 0..octaves {
                data[[x, y]] += scale
                    * perlin.get([
                        (i as f32 * 1000. + scale_start / scale * x as f32) as f64,
                        (scale_start / scale * y as f32) as f64,
                    ]) as f32;
                scale /= 2.;
            }
        }
    }

    // Sum of the octave amplitudes bounds the noise magnitude
    let (max_magnitude, _) = (0..octaves).fold((0.0, 1.0), |(max_magnitude, scale), _| {
        (max_magnitude + scale, scale / 2.0)
    });

    HeightMap((data / max_magnitude + 1.) / 2.)
}

/// Procedural stand-in for a grayscale heightmap image: same value range, so
/// the same elevation scale applies to both.
pub fn perlin_intensity_map(size: (usize, usize), seed: u32) -> HeightMap {
    let mut terrain = perlin_terrain(size, seed, NoiseSettings::default());
    terrain.clamp(0., 1.);
    terrain.multiply(MAX_INTENSITY);
    terrain
}
