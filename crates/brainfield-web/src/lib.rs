//! Brainfield Web
//!
//! WASM front end for the activity dashboard. Each brain tile is a
//! [`BrainPanelView`] bound to an HTML canvas:
//! - [`canvas`]: `Canvas2d` over `CanvasRenderingContext2d`
//! - [`loader`]: asynchronous template image loading
//! - [`view`]: the exported panel with its `requestAnimationFrame` loop

pub mod canvas;
pub mod loader;
pub mod view;

pub use canvas::WebCanvas;
pub use view::BrainPanelView;

use wasm_bindgen::prelude::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Electrode table as JSON, for host-side legends.
#[wasm_bindgen]
pub fn electrode_table_json() -> Result<String, JsValue> {
    let table: Vec<_> = brainfield_core::ELECTRODES
        .iter()
        .map(|e| (e.channel_id, e.name, e.template_x, e.template_y))
        .collect();
    serde_json::to_string(&table).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Log a warning to the browser console.
pub(crate) fn console_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}
