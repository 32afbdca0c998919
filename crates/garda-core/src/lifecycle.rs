//! Mount lifecycle, listener registry, and teardown bookkeeping
//!
//! Resources are registered with a [`Disposers`] list as they are created,
//! whichever asynchronous stage creates them. Teardown runs every disposer
//! exactly once, newest first, and anything registered afterwards is
//! disposed immediately.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },
}

/// Where the scene is in its mount lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Idle,
    /// Camera, renderer and resize listener live; font request in flight
    Initializing,
    /// Geometry built, pipeline and render loop running
    FontLoaded,
    /// Font failed; background only
    Degraded,
    Unmounted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Initializing => "initializing",
            Stage::FontLoaded => "font loaded",
            Stage::Degraded => "degraded",
            Stage::Unmounted => "unmounted",
        };
        f.write_str(name)
    }
}

/// Validated stage transitions
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    stage: Stage,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_mounted(&self) -> bool {
        matches!(
            self.stage,
            Stage::Initializing | Stage::FontLoaded | Stage::Degraded
        )
    }

    /// Whether the scene objects exist
    pub fn has_scene(&self) -> bool {
        self.stage == Stage::FontLoaded
    }

    fn transition(&mut self, to: Stage) -> Result<Stage, LifecycleError> {
        let allowed = matches!(
            (self.stage, to),
            (Stage::Idle, Stage::Initializing)
                | (Stage::Initializing, Stage::FontLoaded)
                | (Stage::Initializing, Stage::Degraded)
                | (Stage::Idle, Stage::Unmounted)
                | (Stage::Initializing, Stage::Unmounted)
                | (Stage::FontLoaded, Stage::Unmounted)
                | (Stage::Degraded, Stage::Unmounted)
        );
        if !allowed {
            return Err(LifecycleError::InvalidTransition { from: self.stage, to });
        }
        let from = self.stage;
        self.stage = to;
        tracing::debug!(%from, %to, "Lifecycle transition");
        Ok(from)
    }

    pub fn begin(&mut self) -> Result<Stage, LifecycleError> {
        self.transition(Stage::Initializing)
    }

    pub fn font_loaded(&mut self) -> Result<Stage, LifecycleError> {
        self.transition(Stage::FontLoaded)
    }

    pub fn font_failed(&mut self) -> Result<Stage, LifecycleError> {
        self.transition(Stage::Degraded)
    }

    pub fn unmount(&mut self) -> Result<Stage, LifecycleError> {
        self.transition(Stage::Unmounted)
    }
}

/// Shared cancellation flag for in-flight work (font request, render loop)
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Host event listeners the scene attaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ListenerKind {
    Resize,
    KeyDown,
}

/// Set of currently attached listeners
#[derive(Debug, Clone, Default)]
pub struct Listeners {
    attached: BTreeSet<ListenerKind>,
}

impl Listeners {
    /// Returns false if the listener was already attached
    pub fn attach(&mut self, kind: ListenerKind) -> bool {
        self.attached.insert(kind)
    }

    pub fn detach(&mut self, kind: ListenerKind) -> bool {
        self.attached.remove(&kind)
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.attached.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

pub type DisposeFn<C> = Box<dyn FnOnce(&mut C) + Send + Sync>;

/// Ordered teardown actions over a context `C`
pub struct Disposers<C> {
    entries: Vec<(String, DisposeFn<C>)>,
    disposed: bool,
}

impl<C> Default for Disposers<C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            disposed: false,
        }
    }
}

impl<C> fmt::Debug for Disposers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposers")
            .field("pending", &self.names())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Outcome of registering a disposer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Deferred,
    /// Teardown already ran; the action ran immediately
    AlreadyDisposed,
}

/// A teardown action registered after teardown, handed back unrun
pub struct LateDisposer<C> {
    pub name: String,
    dispose: DisposeFn<C>,
}

impl<C> LateDisposer<C> {
    pub fn run(self, ctx: &mut C) {
        tracing::debug!(name = %self.name, "Disposing late registration");
        (self.dispose)(ctx);
    }
}

impl<C> fmt::Debug for LateDisposer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LateDisposer").field("name", &self.name).finish()
    }
}

impl<C> Disposers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a teardown action.
    ///
    /// After teardown the action is handed back unrun; use
    /// [`Disposers::register_or_run`] when a context is at hand.
    pub fn register<F>(&mut self, name: impl Into<String>, dispose: F) -> Result<(), LateDisposer<C>>
    where
        F: FnOnce(&mut C) + Send + Sync + 'static,
    {
        let name = name.into();
        if self.disposed {
            return Err(LateDisposer { name, dispose: Box::new(dispose) });
        }
        self.entries.push((name, Box::new(dispose)));
        Ok(())
    }

    /// Queue a teardown action, or run it now if teardown already happened
    pub fn register_or_run<F>(&mut self, ctx: &mut C, name: impl Into<String>, dispose: F) -> Registration
    where
        F: FnOnce(&mut C) + Send + Sync + 'static,
    {
        match self.register(name, dispose) {
            Ok(()) => Registration::Deferred,
            Err(late) => {
                late.run(ctx);
                Registration::AlreadyDisposed
            }
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Detach the pending actions and mark the list disposed.
    ///
    /// Lets callers run the actions against a context that owns this list.
    pub fn take(&mut self) -> Vec<(String, DisposeFn<C>)> {
        self.disposed = true;
        let mut entries = std::mem::take(&mut self.entries);
        entries.reverse();
        entries
    }

}

/// Run detached actions in the order given; returns their names
pub fn run_disposers<C>(entries: Vec<(String, DisposeFn<C>)>, ctx: &mut C) -> Vec<String> {
    entries
        .into_iter()
        .map(|(name, dispose)| {
            tracing::debug!(%name, "Running disposer");
            dispose(ctx);
            name
        })
        .collect()
}
