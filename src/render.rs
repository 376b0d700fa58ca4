//! Bevy glue: spawns the camera and the terrain strip, spins it every frame,
//! and swaps in a freshly built mesh when the geometry settings change.

use std::path::PathBuf;

use bevy::{
    pbr::wireframe::Wireframe,
    prelude::*,
    render::mesh::VertexAttributeValues,
};

use crate::animation::FrameAnimator;
use crate::error::Result;
use crate::generation::perlin_intensity_map;
use crate::heightmap::{HeightMap, HeightSampler};
use crate::meshing::{Grid, StripMeshBuilder, VertexColoring};
use crate::settings::{CameraSettings, TerrainSettings, DEFAULT_SETTINGS_PATH};

pub struct TerrainStripPlugin {
    pub settings_path: PathBuf,
}

impl Default for TerrainStripPlugin {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
        }
    }
}

impl Plugin for TerrainStripPlugin {
    fn build(&self, app: &mut App) {
        if !app.world.contains_resource::<TerrainSettings>() {
            app.insert_resource(TerrainSettings::load_or_default(&self.settings_path));
        }

        app.insert_resource(SettingsPath(self.settings_path.clone()))
            .init_resource::<FrameAnimator>()
            .init_resource::<TerrainMeshCache>()
            .add_startup_system(setup_camera)
            .add_system(reload_settings)
            .add_system(rebuild_terrain_mesh.after(reload_settings))
            .add_system(apply_view_settings.after(rebuild_terrain_mesh))
            .add_system(animate_terrain.after(rebuild_terrain_mesh));
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SettingsPath(pub PathBuf);

/// Marks the entity carrying the strip mesh.
#[derive(Component)]
pub struct TerrainStrip;

/// Handle of the strip on screen and the settings last tried for it.
///
/// `handle` stays `None` until a build succeeds. `key` records failed
/// attempts too, so a bad grid is reported once rather than every frame.
#[derive(Resource, Default)]
pub struct TerrainMeshCache {
    pub handle: Option<Handle<Mesh>>,
    pub key: Option<MeshKey>,
    pub builds: usize,
}

/// The subset of [`TerrainSettings`] that changes geometry or colors.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshKey {
    cols: usize,
    rows: usize,
    heightmap: Option<PathBuf>,
    height_scale: f32,
    seed: u32,
    procedural_size: (usize, usize),
    coloring: VertexColoring,
}

impl From<&TerrainSettings> for MeshKey {
    fn from(settings: &TerrainSettings) -> Self {
        Self {
            cols: settings.cols,
            rows: settings.rows,
            heightmap: settings.heightmap.clone(),
            height_scale: settings.height_scale,
            seed: settings.seed,
            procedural_size: settings.procedural_size,
            coloring: settings.coloring.clone(),
        }
    }
}

/// Heightmap image named in the settings, or Perlin noise when there is none
/// or it cannot be decoded.
pub fn load_height_map(settings: &TerrainSettings) -> HeightMap {
    if let Some(path) = &settings.heightmap {
        match HeightMap::load(path) {
            Ok(map) => {
                info!("loaded {:?} heightmap from {}", map.dim(), path.display());
                return map;
            }
            Err(err) => warn!(
                "falling back to procedural terrain, cannot load {}: {}",
                path.display(),
                err
            ),
        }
    }

    let (width, height) = settings.procedural_size;
    perlin_intensity_map((width.max(1), height.max(1)), settings.seed)
}

pub fn build_terrain_mesh(settings: &TerrainSettings) -> Result<Mesh> {
    let grid = Grid::new(settings.cols, settings.rows)?;
    let height_map = load_height_map(settings);
    let sampler = HeightSampler::new(&height_map, settings.height_scale)?;

    let mesh = StripMeshBuilder::new(grid)
        .with_coloring(settings.coloring.clone())
        .build(&sampler)
        .into_render_mesh();
    info!(
        "terrain strip {}x{}: drawing {} vertices",
        grid.cols(),
        grid.rows(),
        draw_vertex_count(&mesh)
    );

    Ok(mesh)
}

fn setup_camera(mut commands: Commands, settings: Res<TerrainSettings>) {
    commands.spawn(Camera3dBundle {
        projection: perspective(&settings.camera),
        ..default()
    });
}

fn perspective(camera: &CameraSettings) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: camera.fov_degrees.to_radians(),
        aspect_ratio: camera.aspect_ratio,
        near: camera.near,
        far: camera.far,
    })
}

/// `R` re-reads the settings file.
fn reload_settings(
    keys: Res<Input<KeyCode>>,
    path: Res<SettingsPath>,
    mut settings: ResMut<TerrainSettings>,
) {
    if !keys.just_pressed(KeyCode::R) {
        return;
    }

    match TerrainSettings::load_from_file(&path.0) {
        Ok(loaded) => {
            if loaded != *settings {
                info!("reloaded terrain settings from {}", path.0.display());
                *settings = loaded;
            }
        }
        Err(err) => warn!("keeping current settings: {}", err),
    }
}

// Spawns the terrain on the first successful build and afterwards swaps the
// mesh asset contents. The replacement is built completely before the swap,
// so the renderer only ever extracts a whole strip.
fn rebuild_terrain_mesh(
    mut commands: Commands,
    settings: Res<TerrainSettings>,
    mut cache: ResMut<TerrainMeshCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !settings.is_changed() {
        return;
    }

    let key = MeshKey::from(&*settings);
    if cache.key.as_ref() == Some(&key) {
        return;
    }
    cache.key = Some(key);

    let mesh = match build_terrain_mesh(&settings) {
        Ok(mesh) => mesh,
        Err(err) => {
            if cache.handle.is_some() {
                warn!("keeping previous terrain mesh: {}", err);
            } else {
                error!("cannot build terrain: {}", err);
            }
            return;
        }
    };
    cache.builds += 1;

    if let Some(handle) = &cache.handle {
        if let Some(current) = meshes.get_mut(handle) {
            *current = mesh;
        }
        return;
    }

    let handle = meshes.add(mesh);
    commands.spawn((
        PbrBundle {
            mesh: handle.clone(),
            material: materials.add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                cull_mode: None,
                ..default()
            }),
            transform: Transform::from_translation(Vec3::from(settings.camera.offset)),
            ..default()
        },
        TerrainStrip,
    ));
    cache.handle = Some(handle);
}

/// Keeps the wireframe overlay and the camera projection in line with the
/// settings after a reload.
fn apply_view_settings(
    mut commands: Commands,
    settings: Res<TerrainSettings>,
    terrain: Query<(Entity, Option<&Wireframe>), With<TerrainStrip>>,
    mut cameras: Query<&mut Projection, With<Camera3d>>,
) {
    for (entity, wireframe) in &terrain {
        match (settings.wireframe, wireframe.is_some()) {
            (true, false) => {
                commands.entity(entity).insert(Wireframe);
            }
            (false, true) => {
                commands.entity(entity).remove::<Wireframe>();
            }
            _ => {}
        }
    }

    if settings.is_changed() {
        for mut projection in &mut cameras {
            *projection = perspective(&settings.camera);
        }
    }
}

fn animate_terrain(
    settings: Res<TerrainSettings>,
    mut animator: ResMut<FrameAnimator>,
    mut terrain: Query<&mut Transform, With<TerrainStrip>>,
) {
    let rotation = animator.rotation(settings.effective_refresh_rate());
    let translation = Vec3::from(settings.camera.offset);

    for mut transform in &mut terrain {
        transform.translation = translation;
        transform.rotation = rotation;
    }

    animator.tick();
}

/// Number of vertices the strip mesh will submit in its draw call.
pub fn draw_vertex_count(mesh: &Mesh) -> usize {
    match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
        Some(VertexAttributeValues::Float32x3(positions)) => positions.len(),
        _ => 0,
    }
}
