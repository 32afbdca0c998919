//! Garda Viewer - Browser and desktop entry points
//!
//! In the browser the scene is mounted into a container element with
//! `mount(container_id)` and torn down with `unmount()`. The `garda`
//! binary runs the same app in a native window.

mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
mod font_loader;

pub use app::{build_app, HostPlugin, HostSignal};

#[cfg(target_arch = "wasm32")]
mod web {
    use garda_core::config::Config;
    use garda_core::lifecycle::CancelToken;
    use std::cell::{Cell, RefCell};
    use wasm_bindgen::prelude::*;

    use crate::{app, dom};

    thread_local! {
        static UNMOUNT: RefCell<Option<CancelToken>> = const { RefCell::new(None) };
        // winit owns a single event loop per page
        static MOUNTED_ONCE: Cell<bool> = const { Cell::new(false) };
    }

    /// WASM entry point
    #[wasm_bindgen(start)]
    pub fn start() {
        // Set up panic hook for better error messages
        console_error_panic_hook::set_once();

        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(tracing::Level::WARN)
                .build(),
        );
    }

    /// Append the canvas to `container_id` and start the scene
    #[wasm_bindgen]
    pub fn mount(container_id: &str) -> Result<(), JsValue> {
        if MOUNTED_ONCE.with(|m| m.replace(true)) {
            return Err(JsValue::from_str("Garda can only be mounted once per page"));
        }

        let mut config = Config::default();
        if let Some(font) = dom::font_query_param() {
            tracing::info!("Loading font from URL parameter: {}", font);
            config.font.url = font;
        }
        config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

        let canvas_id = config
            .window
            .canvas_id()
            .ok_or_else(|| JsValue::from_str("window.canvas is not an id selector"))?;
        dom::attach_canvas(container_id, canvas_id)?;

        let token = CancelToken::new();
        UNMOUNT.with(|slot| *slot.borrow_mut() = Some(token.clone()));
        app::build_app(config, token).run();
        Ok(())
    }

    /// Tear the scene down. Returns false if nothing is mounted.
    #[wasm_bindgen]
    pub fn unmount() -> bool {
        match UNMOUNT.with(|slot| slot.borrow_mut().take()) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
