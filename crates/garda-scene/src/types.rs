//! Resources shared by the scene plugins

use bevy::prelude::*;
use garda_core::config::Config;
use garda_core::lifecycle::{CancelToken, Disposers, Lifecycle, Listeners};
use garda_core::pipeline::PostProcessPipeline;
use garda_core::state::{SceneState, Viewport};

/// Loaded configuration
#[derive(Debug, Clone, Resource, Deref)]
pub struct SceneSettings(pub Config);

/// Positions every input handler reads and writes
#[derive(Debug, Clone, Copy, Resource, Default, Deref, DerefMut)]
pub struct SharedState(pub SceneState);

/// Last known drawing-surface size
#[derive(Debug, Clone, Copy, Resource, Default, Deref, DerefMut)]
pub struct ViewportState(pub Viewport);

#[derive(Debug, Clone, Resource, Default, Deref, DerefMut)]
pub struct SceneLifecycle(pub Lifecycle);

/// Host listeners currently attached
#[derive(Debug, Clone, Resource, Default, Deref, DerefMut)]
pub struct ListenerRegistry(pub Listeners);

/// Teardown actions, run against the whole world on unmount
#[derive(Resource, Default, Deref, DerefMut)]
pub struct SceneDisposers(pub Disposers<World>);

/// Handle for the per-frame scene loop
#[derive(Debug, Clone, Resource, Default)]
pub struct RenderLoop {
    pub token: CancelToken,
    pub started: bool,
}

impl RenderLoop {
    pub fn is_running(&self) -> bool {
        self.started && !self.token.is_cancelled()
    }
}

/// Post-processing chain; absent until the font has loaded
#[derive(Debug, Clone, Resource, Default)]
pub struct PipelineState(pub Option<PostProcessPipeline>);

/// Outcome of the font request, for display
#[derive(Debug, Clone, Resource, Default)]
pub struct FontStatus {
    pub source: String,
    pub family: Option<String>,
    pub error: Option<String>,
}

/// Run condition: scene loop is live
pub fn render_loop_running(render_loop: Res<RenderLoop>) -> bool {
    render_loop.is_running()
}
