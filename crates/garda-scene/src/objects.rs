//! Scene objects: extruded letterforms, the glowing cube and its lights

use bevy::asset::RenderAssetUsages;
use bevy::ecs::system::SystemParam;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use garda_core::config::{Config, HexColor};
use garda_core::extrude::{text_mesh, MeshData, TextOptions};
use garda_core::lifecycle::ListenerKind;
use garda_core::pipeline::PostProcessPipeline;
use garda_core::state::{Point3, SceneState};
use garda_core::typeface::{Typeface, TypefaceError};

use crate::camera::{bloom_from_params, MainCamera};
use crate::teardown::register_disposer;
use crate::types::*;

/// Anything created once the font has loaded
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneObject {
    Text,
    Cube,
    PointLight,
    AmbientLight,
}

/// Extruded text mesh
#[derive(Component, Debug, Clone)]
pub struct TextGlyph {
    pub text: String,
}

#[derive(Component)]
pub struct GlowCube;

/// Point light that tracks the cube
#[derive(Component)]
pub struct CubeLight;

/// Scene-wide fill light, mirrored into the [`AmbientLight`] resource
#[derive(Component, Debug, Clone, Copy)]
pub struct AmbientFill {
    pub color: Color,
    pub brightness: f32,
}

#[derive(SystemParam)]
pub struct SceneAssets<'w> {
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
}

pub struct ObjectsPlugin;

impl Plugin for ObjectsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 0.0,
            ..default()
        })
        .add_systems(
            PostUpdate,
            (sync_object_transforms, apply_ambient_fill).run_if(render_loop_running),
        );
    }
}

fn to_vec3(p: Point3) -> Vec3 {
    Vec3::from_array(p.to_array())
}

fn to_color(color: HexColor) -> Color {
    let [r, g, b] = color.to_srgb_f32();
    Color::srgb(r, g, b)
}

/// Convert an extruded triangle list into a Bevy mesh
pub fn mesh_from_data(data: MeshData) -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, data.positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, data.normals)
        .with_inserted_indices(Indices::U32(data.indices))
}

/// Extrude every configured glyph. Fails before anything is spawned when a
/// visible character cannot be drawn.
pub fn build_glyph_meshes(typeface: &Typeface, config: &Config) -> Result<Vec<MeshData>, TypefaceError> {
    config
        .glyphs
        .iter()
        .map(|glyph| {
            typeface.check_coverage(&glyph.text)?;
            let mesh = text_mesh(
                typeface,
                &glyph.text,
                TextOptions {
                    size: glyph.size,
                    depth: glyph.depth,
                    curve_segments: config.font.curve_segments,
                },
            )?;
            match glyph.text.chars().find(|ch| !ch.is_whitespace()) {
                Some(ch) if mesh.is_empty() => Err(TypefaceError::MissingGlyph(ch)),
                _ => Ok(mesh),
            }
        })
        .collect()
}

/// Spawn letterforms, cube, point light and ambient fill, then start the
/// post-processing pipeline and keyboard handling.
pub fn spawn_scene_objects(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    config: &Config,
    glyph_meshes: Vec<MeshData>,
    state: &SceneState,
) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(config.glyphs.len() + 3);

    for (glyph, data) in config.glyphs.iter().zip(glyph_meshes) {
        let material = assets.materials.add(StandardMaterial {
            base_color: to_color(glyph.color),
            perceptual_roughness: glyph.roughness,
            metallic: glyph.metalness,
            ..default()
        });
        entities.push(
            commands
                .spawn((
                    Mesh3d(assets.meshes.add(mesh_from_data(data))),
                    MeshMaterial3d(material),
                    Transform::from_translation(Vec3::from_array(glyph.position)),
                    SceneObject::Text,
                    TextGlyph {
                        text: glyph.text.clone(),
                    },
                    Name::new(format!("text {}", glyph.text)),
                ))
                .id(),
        );
    }

    let cube = &config.cube;
    let emissive = LinearRgba::from(to_color(cube.emissive)) * cube.emissive_intensity;
    entities.push(
        commands
            .spawn((
                Mesh3d(assets.meshes.add(Cuboid::new(cube.size, cube.size, cube.size))),
                MeshMaterial3d(assets.materials.add(StandardMaterial {
                    base_color: to_color(cube.color),
                    emissive,
                    ..default()
                })),
                Transform::from_translation(to_vec3(state.cube)),
                SceneObject::Cube,
                GlowCube,
                Name::new("cube"),
            ))
            .id(),
    );

    let lighting = &config.lighting;
    entities.push(
        commands
            .spawn((
                PointLight {
                    color: to_color(lighting.point_color),
                    intensity: lighting.point_lumens(),
                    range: lighting.point_range,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(to_vec3(state.light)),
                SceneObject::PointLight,
                CubeLight,
                Name::new("point light"),
            ))
            .id(),
    );

    entities.push(
        commands
            .spawn((
                AmbientFill {
                    color: to_color(lighting.ambient_color),
                    brightness: lighting.ambient_brightness(),
                },
                SceneObject::AmbientLight,
                Name::new("ambient light"),
            ))
            .id(),
    );

    let despawn = entities.clone();
    commands.queue(move |world: &mut World| {
        register_disposer(world, "scene objects", move |world: &mut World| {
            for entity in despawn {
                world.despawn(entity);
            }
            world.resource_mut::<AmbientLight>().brightness = 0.0;
        });
    });
    commands.queue(start_pipeline);

    entities
}

/// Attach bloom, then the keydown listener, then the frame loop.
/// Each registers its own disposer as it comes up.
fn start_pipeline(world: &mut World) {
    let bloom = world.resource::<SceneSettings>().bloom;
    let viewport = **world.resource::<ViewportState>();
    let cameras: Vec<Entity> = world
        .query_filtered::<Entity, With<MainCamera>>()
        .iter(world)
        .collect();
    for &camera in &cameras {
        world.entity_mut(camera).insert(bloom_from_params(&bloom));
    }
    world.resource_mut::<PipelineState>().0 = Some(PostProcessPipeline::with_bloom(
        bloom,
        viewport.width as u32,
        viewport.height as u32,
    ));
    register_disposer(world, "post-processing pipeline", move |world: &mut World| {
        for camera in cameras {
            if let Ok(mut entity) = world.get_entity_mut(camera) {
                entity.remove::<bevy::post_process::bloom::Bloom>();
            }
        }
        world.resource_mut::<PipelineState>().0 = None;
    });

    world.resource_mut::<ListenerRegistry>().attach(ListenerKind::KeyDown);
    register_disposer(world, "keydown listener", |world: &mut World| {
        world.resource_mut::<ListenerRegistry>().detach(ListenerKind::KeyDown);
    });

    let token = {
        let mut render_loop = world.resource_mut::<RenderLoop>();
        render_loop.started = true;
        render_loop.token.clone()
    };
    register_disposer(world, "render loop", move |_world: &mut World| token.cancel());
    tracing::debug!("Render loop started");
}

/// Push the shared positions into the cube, light and camera transforms
fn sync_object_transforms(
    state: Res<SharedState>,
    mut cubes: Query<&mut Transform, (With<GlowCube>, Without<CubeLight>, Without<MainCamera>)>,
    mut lights: Query<&mut Transform, (With<CubeLight>, Without<GlowCube>, Without<MainCamera>)>,
    mut cameras: Query<&mut Transform, (With<MainCamera>, Without<GlowCube>, Without<CubeLight>)>,
) {
    if !state.is_changed() {
        return;
    }
    for mut transform in &mut cubes {
        transform.translation = to_vec3(state.cube);
    }
    for mut transform in &mut lights {
        transform.translation = to_vec3(state.light);
    }
    for mut transform in &mut cameras {
        transform.translation = to_vec3(state.camera);
    }
}

fn apply_ambient_fill(fills: Query<&AmbientFill, Changed<AmbientFill>>, mut ambient: ResMut<AmbientLight>) {
    if let Some(fill) = fills.iter().last() {
        ambient.color = fill.color;
        ambient.brightness = fill.brightness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::SAMPLE_TYPEFACE;

    #[test]
    fn test_build_glyph_meshes() {
        let typeface = Typeface::from_json(SAMPLE_TYPEFACE).unwrap();
        let config = Config::default();
        let meshes = build_glyph_meshes(&typeface, &config).unwrap();
        assert_eq!(meshes.len(), 2);
        // The "8" is thinner than the "A"
        let depth = |m: &MeshData| m.bounds().map(|(lo, hi)| hi[2] - lo[2]).unwrap();
        assert!((depth(&meshes[0]) - 0.2).abs() < 1e-6);
        assert!((depth(&meshes[1]) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_conversion() {
        let typeface = Typeface::from_json(SAMPLE_TYPEFACE).unwrap();
        let data = text_mesh(&typeface, "A", TextOptions::default()).unwrap();
        let vertices = data.vertex_count();
        let indices = data.indices.len();
        let mesh = mesh_from_data(data);
        assert_eq!(mesh.count_vertices(), vertices);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(indices));
    }

    #[test]
    fn test_uncovered_glyph_fails() {
        let typeface = Typeface::from_json(r#"{ "glyphs": { "x": { "ha": 500, "o": "m 0 0 l 500 0 l 0 500 z" } }, "resolution": 1000 }"#).unwrap();
        let err = build_glyph_meshes(&typeface, &Config::default()).unwrap_err();
        assert!(matches!(err, TypefaceError::MissingGlyph('A')));
    }

    #[test]
    fn test_blank_fallback_fails() {
        // "?" exists but has no outline, so "A" would draw nothing
        let typeface = Typeface::from_json(r#"{ "glyphs": { "?": { "ha": 500 } }, "resolution": 1000 }"#).unwrap();
        let err = build_glyph_meshes(&typeface, &Config::default()).unwrap_err();
        assert!(matches!(err, TypefaceError::MissingGlyph('A')));
    }
}
