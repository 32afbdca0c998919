//! Typeface fetching from a URL or local file

use bevy::prelude::*;
use garda_scene::font::{FontCompleter, FontRequest};
use garda_scene::FontLoadError;

/// Plugin that issues the single font request on startup
pub struct FontLoaderPlugin;

impl Plugin for FontLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, issue_font_request);
    }
}

fn issue_font_request(mut request: ResMut<FontRequest>) {
    let Some(completer) = request.issue() else {
        return;
    };
    let url = request.url.clone();
    tracing::info!("Fetching font: {}", url);
    spawn_fetch(url, completer);
}

#[cfg(target_arch = "wasm32")]
fn spawn_fetch(url: String, completer: FontCompleter) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_font(&url).await;
        completer.complete(result);
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_fetch(url: String, completer: FontCompleter) {
    let spawned = std::thread::Builder::new()
        .name("font-loader".to_string())
        .spawn(move || {
            let result = read_font(&url);
            completer.complete(result);
        });
    if let Err(e) = spawned {
        tracing::error!("Failed to start font loader thread: {}", e);
    }
}

/// Fetch typeface content from URL
#[cfg(target_arch = "wasm32")]
async fn fetch_font(url: &str) -> Result<String, FontLoadError> {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FontLoadError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(FontLoadError::Http {
            status: response.status(),
            status_text: response.status_text(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| FontLoadError::Network(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read typeface content from an HTTP(S) URL or a local path
#[cfg(not(target_arch = "wasm32"))]
fn read_font(source: &str) -> Result<String, FontLoadError> {
    if !is_remote(source) {
        return std::fs::read_to_string(source).map_err(|e| FontLoadError::Io(format!("{}: {}", source, e)));
    }

    let response = reqwest::blocking::get(source).map_err(|e| FontLoadError::Network(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FontLoadError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
        });
    }
    response.text().map_err(|e| FontLoadError::Network(e.to_string()))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://threejs.org/examples/fonts/helvetiker_regular.typeface.json"));
        assert!(is_remote("http://localhost:8080/font.json"));
        assert!(!is_remote("fonts/helvetiker_regular.typeface.json"));
        assert!(!is_remote("/tmp/font.json"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_font("/nonexistent/garda/font.json").unwrap_err();
        assert!(matches!(err, FontLoadError::Io(_)));
    }

    #[test]
    fn test_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(read_font(path.to_str().unwrap()).unwrap(), "{}");
    }
}
