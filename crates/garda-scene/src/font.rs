//! Font request bookkeeping and completion
//!
//! The fetch itself is platform specific and lives in the viewer. It is
//! handed a [`FontCompleter`] that writes the raw document into a shared
//! slot; the frame loop polls that slot and turns the result into a
//! [`FontLoadResult`] message.

use bevy::prelude::*;
use garda_core::lifecycle::CancelToken;
use garda_core::typeface::{Typeface, TypefaceError};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::objects::{build_glyph_meshes, spawn_scene_objects, SceneAssets};
use crate::types::*;

#[derive(Error, Debug)]
pub enum FontLoadError {
    #[error("Font request failed: {0}")]
    Network(String),
    #[error("Font request returned HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("Failed to read font file: {0}")]
    Io(String),
    #[error("Failed to decode font: {0}")]
    Decode(#[from] TypefaceError),
}

type FontSlot = Arc<Mutex<Option<Result<String, FontLoadError>>>>;

/// The single outstanding font request
#[derive(Resource, Debug, Default)]
pub struct FontRequest {
    pub url: String,
    slot: FontSlot,
    cancel: CancelToken,
    issued: bool,
}

impl FontRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Hand out the completion side of the request. Only the first call
    /// succeeds; there is no retry.
    pub fn issue(&mut self) -> Option<FontCompleter> {
        if self.issued || self.cancel.is_cancelled() {
            return None;
        }
        self.issued = true;
        Some(FontCompleter {
            slot: self.slot.clone(),
            cancel: self.cancel.clone(),
        })
    }

    pub fn is_issued(&self) -> bool {
        self.issued
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn take(&self) -> Option<Result<String, FontLoadError>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.slot.try_lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Completion side of a [`FontRequest`], moved into the fetch task
#[derive(Debug)]
pub struct FontCompleter {
    slot: FontSlot,
    cancel: CancelToken,
}

impl FontCompleter {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Deliver the fetched document. Dropped silently once cancelled.
    pub fn complete(self, result: Result<String, FontLoadError>) {
        if self.cancel.is_cancelled() {
            tracing::debug!("Font request cancelled, discarding result");
            return;
        }
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(result),
            Err(e) => tracing::error!("Font slot poisoned: {}", e),
        }
    }
}

/// Decoded outcome of the font request
#[derive(Message, Debug)]
pub struct FontLoadResult(pub Result<Typeface, FontLoadError>);

pub struct FontPlugin;

impl Plugin for FontPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FontRequest>()
            .init_resource::<FontStatus>()
            .add_message::<FontLoadResult>()
            .add_systems(Update, (poll_font_request, apply_font_result).chain());
    }
}

fn poll_font_request(request: Res<FontRequest>, mut results: MessageWriter<FontLoadResult>) {
    let Some(result) = request.take() else {
        return;
    };
    let decoded = result.and_then(|json| Typeface::from_json(&json).map_err(FontLoadError::from));
    results.write(FontLoadResult(decoded));
}

/// Build the scene on success, degrade on failure
fn apply_font_result(
    mut commands: Commands,
    mut results: MessageReader<FontLoadResult>,
    mut lifecycle: ResMut<SceneLifecycle>,
    mut status: ResMut<FontStatus>,
    mut assets: SceneAssets,
    settings: Res<SceneSettings>,
    state: Res<SharedState>,
) {
    for FontLoadResult(result) in results.read() {
        let built = match result {
            Ok(typeface) => build_glyph_meshes(typeface, &settings)
                .map(|meshes| (typeface, meshes))
                .map_err(|e| FontLoadError::from(e).to_string()),
            Err(e) => Err(e.to_string()),
        };

        match built {
            Ok((typeface, glyph_meshes)) => {
                if let Err(e) = lifecycle.font_loaded() {
                    tracing::debug!("Discarding font result: {}", e);
                    continue;
                }
                status.family = typeface.family_name.clone();
                status.error = None;
                let entities = spawn_scene_objects(&mut commands, &mut assets, &settings, glyph_meshes, &state);
                tracing::info!(
                    family = status.family.as_deref().unwrap_or("unknown"),
                    objects = entities.len(),
                    "Font loaded, scene built"
                );
            }
            Err(message) => {
                if let Err(e) = lifecycle.font_failed() {
                    tracing::debug!("Discarding font failure: {}", e);
                    continue;
                }
                tracing::error!(source = %status.source, "Font load failed: {}", message);
                status.error = Some(message);
            }
        }
    }
}
