//! Exported panel view with its animation loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use brainfield_core::{DeviceSnapshot, PipelineConfig};
use brainfield_render::{BrainPanel, FrameReport};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas::WebCanvas;
use crate::console_warn;
use crate::loader::load_templates;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window"))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One brain tile bound to a canvas element.
#[wasm_bindgen]
pub struct BrainPanelView {
    panel: Rc<RefCell<BrainPanel>>,
    canvas: Rc<RefCell<WebCanvas>>,
    /// Mount flag of the current mount; replaced on every mount
    mounted: Rc<Cell<bool>>,
    /// Pending `requestAnimationFrame` handle
    frame_handle: Rc<Cell<Option<i32>>>,
    frame_callback: FrameCallback,
    last_report: Rc<RefCell<FrameReport>>,
}

#[wasm_bindgen]
impl BrainPanelView {
    /// Create a view for `device_id` drawing into `canvas`.
    ///
    /// `config_json` is an optional serialized pipeline configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, device_id: u32, config_json: Option<String>) -> Result<BrainPanelView, JsValue> {
        let config: PipelineConfig = match config_json {
            Some(json) => serde_json::from_str(&json).map_err(to_js)?,
            None => PipelineConfig::default(),
        };
        // Random phase keeps neighbouring panels from pulsing in lockstep
        let seed = js_sys::Math::random() * std::f64::consts::TAU;
        let panel = BrainPanel::new(device_id, config, seed).map_err(to_js)?;

        Ok(Self {
            panel: Rc::new(RefCell::new(panel)),
            canvas: Rc::new(RefCell::new(WebCanvas::new(canvas)?)),
            mounted: Rc::new(Cell::new(false)),
            frame_handle: Rc::new(Cell::new(None)),
            frame_callback: Rc::new(RefCell::new(None)),
            last_report: Rc::new(RefCell::new(FrameReport::default())),
        })
    }

    /// Start loading templates and run the animation loop.
    pub fn mount(&mut self, fill_url: &str, outline_url: &str) -> Result<(), JsValue> {
        if self.mounted.get() {
            return Ok(());
        }
        self.mounted = Rc::new(Cell::new(true));
        let policy = {
            let mut panel = self.panel.borrow_mut();
            panel.mount();
            panel.config().theme.mask_policy()
        };
        load_templates(fill_url, outline_url, policy, &self.panel, &self.mounted)?;
        self.start_loop()
    }

    /// Stop the loop, cancel the pending frame and drop templates.
    pub fn unmount(&mut self) {
        self.mounted.set(false);
        if let Some(handle) = self.frame_handle.take() {
            if let Ok(window) = window() {
                if let Err(e) = window.cancel_animation_frame(handle) {
                    console_warn(&format!("cancelAnimationFrame failed: {e:?}"));
                }
            }
        }
        // Breaks the callback's reference to itself
        self.frame_callback.borrow_mut().take();
        self.panel.borrow_mut().unmount();
    }

    /// Replace the snapshot from its JSON form.
    pub fn submit_snapshot_json(&self, json: &str) -> Result<(), JsValue> {
        let snapshot: DeviceSnapshot = serde_json::from_str(json).map_err(to_js)?;
        self.panel.borrow_mut().submit_snapshot(Arc::new(snapshot));
        Ok(())
    }

    /// Current panel state name.
    pub fn state(&self) -> String {
        format!("{:?}", self.panel.borrow().state())
    }

    /// Report of the most recent frame as JSON.
    pub fn last_report_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&*self.last_report.borrow()).map_err(to_js)
    }
}

impl BrainPanelView {
    fn start_loop(&self) -> Result<(), JsValue> {
        let panel = Rc::clone(&self.panel);
        let canvas = Rc::clone(&self.canvas);
        let mounted = Rc::clone(&self.mounted);
        let frame_handle = Rc::clone(&self.frame_handle);
        let last_report = Rc::clone(&self.last_report);
        let callback = Rc::clone(&self.frame_callback);

        *self.frame_callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            frame_handle.set(None);
            if !mounted.get() {
                return;
            }
            let report = panel.borrow_mut().render_frame(&mut *canvas.borrow_mut());
            *last_report.borrow_mut() = report;

            let next = callback
                .borrow()
                .as_ref()
                .map(|cb| window().and_then(|w| w.request_animation_frame(cb.as_ref().unchecked_ref())));
            match next {
                Some(Ok(handle)) => frame_handle.set(Some(handle)),
                Some(Err(e)) => console_warn(&format!("requestAnimationFrame failed: {e:?}")),
                None => {}
            }
        }) as Box<dyn FnMut()>));

        let handle = match self.frame_callback.borrow().as_ref() {
            Some(cb) => window()?.request_animation_frame(cb.as_ref().unchecked_ref())?,
            None => return Ok(()),
        };
        self.frame_handle.set(Some(handle));
        Ok(())
    }
}

impl Drop for BrainPanelView {
    fn drop(&mut self) {
        self.unmount();
    }
}
