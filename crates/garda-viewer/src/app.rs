//! Bevy application setup

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowCloseRequested};
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use garda_core::config::Config;
use garda_core::lifecycle::CancelToken;
use garda_scene::overlay::OverlayPlugin;
use garda_scene::teardown::register_disposer;
use garda_scene::{GardaScenePlugin, SceneLifecycle, UnmountRequested};

use crate::font_loader::FontLoaderPlugin;

/// Unmount signal from the embedding page or process
#[derive(Resource, Debug, Clone, Default)]
pub struct HostSignal {
    pub unmount: CancelToken,
}

/// Plugin bridging host events (page unmount, window close) into the scene
pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HostSignal>()
            .add_message::<WindowCloseRequested>()
            .add_systems(Startup, register_canvas_disposer)
            .add_systems(Update, forward_unmount_requests);
    }
}

/// Closing the window or the page unmounting both tear the scene down
fn forward_unmount_requests(
    signal: Res<HostSignal>,
    mut close_requests: MessageReader<WindowCloseRequested>,
    lifecycle: Res<SceneLifecycle>,
    mut unmount: MessageWriter<UnmountRequested>,
) {
    let closing = close_requests.read().count() > 0;
    if (closing || signal.unmount.is_cancelled()) && lifecycle.is_mounted() {
        tracing::info!("Unmount requested by host");
        unmount.write(UnmountRequested);
    }
}

fn register_canvas_disposer(world: &mut World) {
    #[cfg(target_arch = "wasm32")]
    let canvas_id = world
        .resource::<garda_scene::SceneSettings>()
        .window
        .canvas_id()
        .map(str::to_string);
    register_disposer(world, "canvas", move |world: &mut World| {
        let windows: Vec<Entity> = world
            .query_filtered::<Entity, With<PrimaryWindow>>()
            .iter(world)
            .collect();
        for window in windows {
            world.despawn(window);
        }
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(id) = &canvas_id {
                crate::dom::remove_canvas(id);
            }
        }
    });
}

/// Build the viewer app. Closing the last window exits once teardown has run.
pub fn build_app(config: Config, unmount: CancelToken) -> App {
    let [r, g, b] = config.window.clear_color.to_srgb_f32();
    let mut app = App::new();
    app.insert_resource(ClearColor(Color::srgb(r, g, b)))
        .insert_resource(WinitSettings::default())
        .insert_resource(HostSignal { unmount })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config.window.title.clone(),
                canvas: Some(config.window.canvas.clone()),
                fit_canvas_to_parent: true,
                prevent_default_event_handling: false,
                ..default()
            }),
            // Teardown despawns the window itself
            close_when_requested: false,
            ..default()
        }))
        // Must be added before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(GardaScenePlugin::new(config))
        .add_plugins(OverlayPlugin)
        .add_plugins(FontLoaderPlugin)
        .add_plugins(HostPlugin);
    app
}
