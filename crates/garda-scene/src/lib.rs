//! Garda Scene - Bevy plugins for the letterform scene
//!
//! This crate wires the engine-independent pieces of `garda-core` into a
//! Bevy app: the camera with its bloom pipeline, the font-driven scene
//! objects, keyboard and resize handling, teardown, and a status overlay.

pub mod camera;
pub mod font;
pub mod input;
pub mod objects;
pub mod overlay;
pub mod resize;
pub mod teardown;
pub mod types;

use bevy::prelude::*;
use garda_core::config::Config;
use garda_core::lifecycle::ListenerKind;

use crate::font::FontRequest;
use crate::teardown::register_disposer;

/// Plugin that sets up the whole scene except the overlay
pub struct GardaScenePlugin {
    pub config: Config,
}

impl GardaScenePlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for GardaScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(ScenePlugin::new(self.config.clone()))
            .add_plugins(camera::CameraPlugin)
            .add_plugins(font::FontPlugin)
            .add_plugins(objects::ObjectsPlugin)
            .add_plugins(input::InputPlugin)
            .add_plugins(resize::ResizePlugin)
            .add_plugins(teardown::TeardownPlugin);
    }
}

/// Shared resources and the startup bootstrap
pub struct ScenePlugin {
    config: Config,
}

impl ScenePlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        let url = self.config.font.url.clone();
        app.insert_resource(SharedState(self.config.initial_state()))
            .insert_resource(SceneSettings(self.config.clone()))
            .insert_resource(FontRequest::new(url.clone()))
            .insert_resource(FontStatus {
                source: url,
                ..default()
            })
            .init_resource::<ViewportState>()
            .init_resource::<SceneLifecycle>()
            .init_resource::<ListenerRegistry>()
            .init_resource::<RenderLoop>()
            .init_resource::<PipelineState>()
            .init_resource::<SceneDisposers>()
            .add_systems(Startup, bootstrap);
    }
}

/// Enter `Initializing`: attach the resize listener and arm the font
/// request's cancellation.
pub(crate) fn bootstrap(world: &mut World) {
    if let Err(e) = world.resource_mut::<SceneLifecycle>().begin() {
        tracing::warn!("Scene bootstrap skipped: {}", e);
        return;
    }

    world.resource_mut::<ListenerRegistry>().attach(ListenerKind::Resize);
    register_disposer(world, "resize listener", |world: &mut World| {
        world.resource_mut::<ListenerRegistry>().detach(ListenerKind::Resize);
    });

    let cancel = world.resource::<FontRequest>().cancel_token();
    register_disposer(world, "font request", move |_world: &mut World| cancel.cancel());

    tracing::info!(font = %world.resource::<FontRequest>().url, "Scene initializing");
}

// Re-export commonly used types
pub use camera::MainCamera;
pub use font::{FontCompleter, FontLoadError};
pub use teardown::UnmountRequested;
pub use types::*;
