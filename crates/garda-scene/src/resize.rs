//! Viewport resize handling

use bevy::prelude::*;
use bevy::window::WindowResized;
use garda_core::lifecycle::ListenerKind;

use crate::camera::MainCamera;
use crate::types::*;

pub struct ResizePlugin;

impl Plugin for ResizePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_window_resize);
    }
}

/// Recompute the camera aspect and resize the pipeline if it exists.
/// Every event is applied; nothing is debounced.
fn handle_window_resize(
    mut resized: MessageReader<WindowResized>,
    listeners: Res<ListenerRegistry>,
    mut viewport: ResMut<ViewportState>,
    mut pipeline: ResMut<PipelineState>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
) {
    if !listeners.is_attached(ListenerKind::Resize) {
        resized.clear();
        return;
    }

    for event in resized.read() {
        viewport.resize(event.width, event.height);

        for mut projection in &mut projections {
            if let Projection::Perspective(perspective) = projection.as_mut() {
                perspective.aspect_ratio = viewport.aspect;
            }
        }
        if let Some(pipeline) = pipeline.0.as_mut() {
            pipeline.set_size(viewport.width as u32, viewport.height as u32);
        }
        tracing::trace!(
            width = viewport.width,
            height = viewport.height,
            aspect = viewport.aspect,
            "Viewport resized"
        );
    }
}
