//! Camera and bloom setup

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode, BloomPrefilter};
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy::window::PrimaryWindow;
use garda_core::config::CameraConfig;
use garda_core::pipeline::BloomParams;

use crate::teardown::register_disposer;
use crate::types::*;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin that spawns the main camera on startup
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera.after(crate::bootstrap));
    }
}

/// Perspective projection for the configured camera and current aspect
pub fn projection_for(camera: &CameraConfig, aspect: f32) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: camera.fov_degrees.to_radians(),
        near: camera.near,
        far: camera.far,
        aspect_ratio: aspect,
        ..default()
    })
}

/// Map bloom strength/radius/threshold onto the mip-chain bloom
pub fn bloom_from_params(params: &BloomParams) -> Bloom {
    Bloom {
        intensity: params.intensity(),
        low_frequency_boost: params.low_frequency_boost(),
        high_pass_frequency: params.high_pass_frequency(),
        prefilter: BloomPrefilter {
            threshold: params.threshold,
            threshold_softness: 0.1,
        },
        composite_mode: BloomCompositeMode::Additive,
        ..Bloom::NATURAL
    }
}

fn spawn_camera(
    mut commands: Commands,
    settings: Res<SceneSettings>,
    state: Res<SharedState>,
    mut viewport: ResMut<ViewportState>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if let Ok(window) = windows.single() {
        viewport.resize(window.width(), window.height());
    }

    let camera = commands
        .spawn((
            Camera3d::default(),
            Hdr,
            Tonemapping::TonyMcMapface,
            projection_for(&settings.camera, viewport.aspect),
            Transform::from_translation(Vec3::from_array(state.camera.to_array())),
            MainCamera,
            Name::new("main camera"),
        ))
        .id();
    tracing::debug!(aspect = viewport.aspect, "Spawned main camera");

    commands.queue(move |world: &mut World| {
        register_disposer(world, "camera", move |world: &mut World| {
            world.despawn(camera);
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_uses_config() {
        let config = CameraConfig::default();
        let Projection::Perspective(p) = projection_for(&config, 2.0) else {
            panic!("expected a perspective projection");
        };
        assert!((p.fov - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(p.near, 0.1);
        assert_eq!(p.far, 1000.0);
        assert_eq!(p.aspect_ratio, 2.0);
    }

    #[test]
    fn test_bloom_mapping() {
        let bloom = bloom_from_params(&BloomParams::default());
        assert_eq!(bloom.prefilter.threshold, 0.85);
        assert!((bloom.intensity - 0.3).abs() < 1e-6);
        assert_eq!(bloom.composite_mode, BloomCompositeMode::Additive);
    }
}
