//! Canvas management in the host page

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement};

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document"))
}

/// Append a full-size canvas with id `canvas_id` to the container element
pub fn attach_canvas(container_id: &str, canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    let document = document()?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("No element with id '{}'", container_id)))?;

    if let Some(stale) = document.get_element_by_id(canvas_id) {
        stale.remove();
    }

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Canvas cast failed"))?;
    canvas.set_id(canvas_id);
    let style = canvas.style();
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("display", "block")?;
    container.append_child(&canvas)?;

    tracing::info!("Attached canvas to #{}", container_id);
    Ok(canvas)
}

/// Remove the canvas from the page, if present
pub fn remove_canvas(canvas_id: &str) {
    let Ok(document) = document() else { return };
    if let Some(canvas) = document.get_element_by_id(canvas_id) {
        canvas.remove();
        tracing::debug!("Removed canvas");
    }
}

/// Value of the `?font=` query parameter
pub fn font_query_param() -> Option<String> {
    let href = web_sys::window()?.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get("font").filter(|font| !font.trim().is_empty())
}
