use bevy::{log::debug, prelude::Vec3};

use super::{Grid, StripMesh, VertexColoring};
use crate::error::Result;
use crate::heightmap::SampleHeight;

/// Builds a single triangle strip covering a [`Grid`].
///
/// Columns are walked left to right, alternating up and down in `z` so the
/// strip never has to jump back to the start edge. Each row line emits the
/// current column's vertex followed by the next column's, which gives two
/// triangles per cell. Every column is closed by one seam vertex that makes
/// the turn into the next column a pair of degenerate triangles.
///
/// The strip repeats its first vertex once at the start and its last vertex
/// once at the end, so it can be stitched onto another strip as is. The
/// single lead-in vertex also puts the first real triangle on an odd index,
/// which makes every face counter-clockwise seen from `+y`.
pub struct StripMeshBuilder {
    grid: Grid,
    coloring: VertexColoring,
}

impl StripMeshBuilder {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            coloring: VertexColoring::default(),
        }
    }

    pub fn with_coloring(mut self, coloring: VertexColoring) -> Self {
        self.coloring = coloring;
        self
    }

    pub fn build(&self, sampler: &impl SampleHeight) -> StripMesh {
        let Grid { cols, rows } = self.grid;
        let x_at = |i: usize| -0.5 + i as f32 / cols as f32;
        let z_at = |j: usize| -0.5 + j as f32 / rows as f32;

        let mut strip = StripWriter::new(self.grid, &self.coloring, sampler);

        strip.push(x_at(0), z_at(0));

        let mut ascending = true;
        for i in 0..cols {
            for step in 0..=rows {
                let j = if ascending { step } else { rows - step };
                strip.push(x_at(i), z_at(j));
                strip.push(x_at(i + 1), z_at(j));
            }

            let end = if ascending { rows } else { 0 };
            strip.push(x_at(i), z_at(end));
            ascending = !ascending;
        }

        // `ascending` already describes the column after the last one
        let end = if ascending { 0 } else { rows };
        strip.push(x_at(cols), z_at(end));
        strip.push(x_at(cols), z_at(end));

        let mesh = strip.finish();
        debug!(
            "built {}x{} terrain strip with {} vertices",
            cols,
            rows,
            mesh.positions.len()
        );
        mesh
    }
}

/// Strip over `cols x rows` cells with the default solid coloring.
pub fn heightmap_to_strip_mesh(
    cols: usize,
    rows: usize,
    sampler: &impl SampleHeight,
) -> Result<StripMesh> {
    let grid = Grid::new(cols, rows)?;
    Ok(StripMeshBuilder::new(grid).build(sampler))
}

// Appends vertices to all three buffers at once so they cannot drift apart.
struct StripWriter<'a, S> {
    grid: Grid,
    coloring: &'a VertexColoring,
    sampler: &'a S,
    step: (f32, f32),
    positions: Vec<Vec3>,
    colors: Vec<[f32; 3]>,
    normals: Vec<Vec3>,
}

impl<'a, S: SampleHeight> StripWriter<'a, S> {
    fn new(grid: Grid, coloring: &'a VertexColoring, sampler: &'a S) -> Self {
        let capacity = grid.strip_vertex_count();
        Self {
            grid,
            coloring,
            sampler,
            step: grid.step(),
            positions: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            normals: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, x: f32, z: f32) {
        let height = self.sampler.sample(x, z);

        self.positions.push(Vec3::new(x, height, z));
        self.colors.push(self.coloring.color_at(height));
        self.normals.push(self.normal_at(x, z));
    }

    // Central differences one grid step either side; the sampler clamps at
    // the plane edges.
    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let (step_x, step_z) = self.step;
        let dx = (self.sampler.sample(x + step_x, z) - self.sampler.sample(x - step_x, z))
            / (2. * step_x);
        let dz = (self.sampler.sample(x, z + step_z) - self.sampler.sample(x, z - step_z))
            / (2. * step_z);

        Vec3::new(-dx, 1., -dz).normalize_or_zero()
    }

    fn finish(self) -> StripMesh {
        assert_eq!(
            self.positions.len(),
            self.grid.strip_vertex_count(),
            "strip traversal emitted the wrong number of vertices"
        );

        StripMesh {
            grid: self.grid,
            positions: self.positions,
            colors: self.colors,
            normals: self.normals,
        }
    }
}
