//! Keyboard input

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use garda_core::lifecycle::ListenerKind;

use crate::types::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_key_input);
    }
}

/// Dispatch key presses on their logical key value. Movement only happens
/// while the keydown listener is attached.
fn handle_key_input(
    mut keys: MessageReader<KeyboardInput>,
    listeners: Res<ListenerRegistry>,
    settings: Res<SceneSettings>,
    mut state: ResMut<SharedState>,
) {
    if !listeners.is_attached(ListenerKind::KeyDown) {
        keys.clear();
        return;
    }

    for event in keys.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        if event.repeat && !settings.input.key_repeat {
            continue;
        }
        let Key::Character(value) = &event.logical_key else {
            continue;
        };
        if let Some(action) = state.handle_key(value.as_str()) {
            tracing::debug!(
                key = action.key(),
                cube_y = state.cube.y,
                camera_x = state.camera.x,
                "{}",
                action.description()
            );
        }
    }
}
