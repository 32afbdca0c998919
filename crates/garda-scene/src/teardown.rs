//! Unmount and teardown
//!
//! Every resource registers a disposer as it is created. Teardown runs
//! them all newest first, whatever stage the scene reached, and anything
//! that comes up afterwards is disposed on registration.

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use garda_core::lifecycle::{run_disposers, Registration};

use crate::types::*;

/// Request to unmount the scene
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct UnmountRequested;

pub struct TeardownPlugin;

impl Plugin for TeardownPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneDisposers>()
            .add_message::<UnmountRequested>()
            .add_systems(PostUpdate, run_teardown);
    }
}

/// Register a teardown action, or run it now if teardown already happened
pub fn register_disposer<F>(world: &mut World, name: &str, dispose: F) -> Registration
where
    F: FnOnce(&mut World) + Send + Sync + 'static,
{
    let registration = world.resource_scope(|world, mut disposers: Mut<SceneDisposers>| {
        disposers.register_or_run(world, name, dispose)
    });
    if registration == Registration::AlreadyDisposed {
        tracing::debug!(name, "Disposed late registration");
    }
    registration
}

fn run_teardown(world: &mut World) {
    let requested = world
        .resource_mut::<Messages<UnmountRequested>>()
        .drain()
        .count()
        > 0;
    if requested {
        teardown(world);
    }
}

/// Tear down everything created so far. Returns the disposers run, in order.
pub fn teardown(world: &mut World) -> Vec<String> {
    match world.resource_mut::<SceneLifecycle>().unmount() {
        Ok(from) => tracing::info!(%from, "Unmounting scene"),
        Err(e) => {
            tracing::warn!("Ignoring unmount request: {}", e);
            return Vec::new();
        }
    }

    let entries = world.resource_mut::<SceneDisposers>().take();
    run_disposers(entries, world)
}
