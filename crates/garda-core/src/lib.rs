//! Garda Core - Engine-independent scene logic
//!
//! This crate provides everything the Garda scene needs that does not touch
//! the renderer:
//! - Typeface JSON decoding and glyph layout
//! - Outline flattening, hole grouping, triangulation and extrusion
//! - Shared scene state, key mapping and viewport math
//! - Bloom pipeline description
//! - Mount lifecycle, listener registry and teardown bookkeeping
//! - TOML configuration

pub mod config;
pub mod extrude;
pub mod lifecycle;
pub mod outline;
pub mod pipeline;
pub mod state;
pub mod triangulate;
pub mod typeface;

pub use config::{load_config, Config, ConfigError, HexColor};
pub use extrude::{extrude_shape, text_mesh, MeshData, TextOptions};
pub use lifecycle::{
    CancelToken, Disposers, Lifecycle, LifecycleError, ListenerKind, Listeners, Registration, Stage,
};
pub use outline::{Point2, Shape};
pub use pipeline::{BloomParams, Pass, PostProcessPipeline};
pub use state::{KeyAction, Point3, SceneState, Viewport};
pub use triangulate::triangulate;
pub use typeface::{Typeface, TypefaceError};
