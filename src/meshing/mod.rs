mod strip;

pub use strip::{heightmap_to_strip_mesh, StripMeshBuilder};

use bevy::{prelude::*, render::render_resource::PrimitiveTopology};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub type VertexColor = [f32; 3];

pub const GREEN: VertexColor = [0., 1., 0.];

/// Tessellation density of the unit plane, independent of the heightmap's
/// own resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    cols: usize,
    rows: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidGrid { cols, rows });
        }
        Ok(Self { cols, rows })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Exact number of vertices in the strip, and therefore the draw count.
    pub fn strip_vertex_count(&self) -> usize {
        self.cols * self.rows * 2 + self.cols * 3 + 3
    }

    pub fn step(&self) -> (f32, f32) {
        (1. / self.cols as f32, 1. / self.rows as f32)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VertexColoring {
    Solid {
        color: VertexColor,
    },
    /// Linear blend from `low` at height 0 to `high` at `max_height`.
    Elevation {
        low: VertexColor,
        high: VertexColor,
        max_height: f32,
    },
}

impl Default for VertexColoring {
    fn default() -> Self {
        VertexColoring::Solid { color: GREEN }
    }
}

impl VertexColoring {
    pub fn color_at(&self, height: f32) -> VertexColor {
        match self {
            VertexColoring::Solid { color } => *color,
            VertexColoring::Elevation {
                low,
                high,
                max_height,
            } => {
                let t = if *max_height > 0. {
                    (height / max_height).clamp(0., 1.)
                } else {
                    0.
                };
                [
                    low[0] + (high[0] - low[0]) * t,
                    low[1] + (high[1] - low[1]) * t,
                    low[2] + (high[2] - low[2]) * t,
                ]
            }
        }
    }
}

/// One triangle strip over the whole grid. `positions[i]`, `colors[i]` and
/// `normals[i]` always describe the same vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct StripMesh {
    grid: Grid,
    positions: Vec<Vec3>,
    colors: Vec<VertexColor>,
    normals: Vec<Vec3>,
}

impl StripMesh {
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Plane coordinates are `x` and `z`; `y` is the sampled elevation.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[VertexColor] {
        &self.colors
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Number of vertices to draw. Panics if the buffers disagree with each
    /// other or with the grid, since either means the strip is corrupt.
    pub fn vertex_count(&self) -> usize {
        let count = self.positions.len();
        assert_eq!(count, self.colors.len(), "position/color buffer mismatch");
        assert_eq!(count, self.normals.len(), "position/normal buffer mismatch");
        assert_eq!(
            count,
            self.grid.strip_vertex_count(),
            "strip length disagrees with grid {}x{}",
            self.grid.cols,
            self.grid.rows
        );
        count
    }

    pub fn into_render_mesh(self) -> Mesh {
        let vertex_count = self.vertex_count();
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleStrip);

        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals);
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_COLOR,
            self.colors
                .iter()
                .map(|[r, g, b]| [*r, *g, *b, 1.])
                .collect::<Vec<_>>(),
        );

        debug_assert_eq!(mesh.count_vertices(), vertex_count);

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 0)]
    #[case(0, 0)]
    fn test_empty_grid_is_rejected(#[case] cols: usize, #[case] rows: usize) {
        assert!(matches!(
            Grid::new(cols, rows),
            Err(Error::InvalidGrid { .. })
        ));
    }

    #[rstest]
    #[case(1, 1, 8)]
    #[case(2, 2, 17)]
    #[case(3, 1, 18)]
    #[case(240, 240, 115923)]
    fn test_strip_vertex_count(#[case] cols: usize, #[case] rows: usize, #[case] expected: usize) {
        assert_eq!(Grid::new(cols, rows).unwrap().strip_vertex_count(), expected);
    }

    #[test]
    fn test_elevation_coloring_blends_and_clamps() {
        let coloring = VertexColoring::Elevation {
            low: [0., 0., 0.],
            high: [1., 0.5, 0.],
            max_height: 2.,
        };

        assert_eq!(coloring.color_at(1.), [0.5, 0.25, 0.]);
        assert_eq!(coloring.color_at(-1.), [0., 0., 0.]);
        assert_eq!(coloring.color_at(10.), [1., 0.5, 0.]);
    }

    #[test]
    fn test_render_mesh_is_an_unindexed_strip() {
        let strip = heightmap_to_strip_mesh(3, 2, &|_: f32, _: f32| 0.).unwrap();
        let expected = strip.vertex_count();

        let mesh = strip.into_render_mesh();

        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::TriangleStrip);
        assert!(mesh.indices().is_none());
        assert_eq!(mesh.count_vertices(), expected);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }
}
