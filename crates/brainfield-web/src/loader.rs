//! Asynchronous template image loading.
//!
//! Both templates load through `HtmlImageElement`s. Their `onload` and
//! `onerror` handlers check the mount flag they were created with before
//! touching the panel, so a result that arrives after unmount is dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use brainfield_core::MaskPolicy;
use brainfield_render::{BrainPanel, TemplateAsset, TemplateError, TemplateSet};
use image::RgbaImage;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::canvas::create_canvas;
use crate::console_warn;

/// Which template a load result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Silhouette fill
    Fill,
    /// Outline
    Outline,
}

/// Collects the two load results and releases them once, as a pair.
#[derive(Debug, Default)]
pub struct PendingTemplates {
    fill: Option<Result<TemplateAsset, TemplateError>>,
    outline: Option<Result<TemplateAsset, TemplateError>>,
    delivered: bool,
}

impl PendingTemplates {
    /// Record one result; returns the combined result when both are in.
    pub fn record(
        &mut self,
        slot: Slot,
        result: Result<TemplateAsset, TemplateError>,
    ) -> Option<Result<TemplateSet, TemplateError>> {
        if self.delivered {
            return None;
        }
        match slot {
            Slot::Fill => self.fill = Some(result),
            Slot::Outline => self.outline = Some(result),
        }
        if self.fill.is_none() || self.outline.is_none() {
            return None;
        }
        let (fill, outline) = (self.fill.take()?, self.outline.take()?);
        self.delivered = true;
        Some(fill.and_then(|fill| outline.map(|outline| TemplateSet { fill, outline })))
    }
}

fn unavailable(reason: impl Into<String>) -> TemplateError {
    TemplateError::Unavailable { reason: reason.into() }
}

/// Rasterize a loaded image element into a template asset.
fn decode_element(img: &HtmlImageElement, policy: MaskPolicy) -> Result<TemplateAsset, TemplateError> {
    let (w, h) = (img.natural_width(), img.natural_height());
    if w == 0 || h == 0 {
        return Err(TemplateError::Empty { width: w, height: h });
    }
    let js = |e: JsValue| unavailable(format!("{e:?}"));
    let (_canvas, ctx) = create_canvas(w, h).map_err(js)?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0).map_err(js)?;
    let data = ctx.get_image_data(0.0, 0.0, f64::from(w), f64::from(h)).map_err(js)?;
    let image = RgbaImage::from_raw(w, h, data.data().0).ok_or_else(|| unavailable("pixel buffer size mismatch"))?;
    TemplateAsset::new(image, policy)
}

/// Start loading both templates for `panel`.
///
/// The handlers are leaked once installed, as the browser owns the image
/// elements from here on.
///
/// # Errors
///
/// An image element cannot be created.
pub fn load_templates(
    fill_url: &str,
    outline_url: &str,
    policy: MaskPolicy,
    panel: &Rc<RefCell<BrainPanel>>,
    mounted: &Rc<Cell<bool>>,
) -> Result<(), JsValue> {
    let pending = Rc::new(RefCell::new(PendingTemplates::default()));

    for (slot, url) in [(Slot::Fill, fill_url), (Slot::Outline, outline_url)] {
        let img = HtmlImageElement::new()?;

        let deliver = {
            let panel = Rc::clone(panel);
            let mounted = Rc::clone(mounted);
            let pending = Rc::clone(&pending);
            move |result: Result<TemplateAsset, TemplateError>| {
                if !mounted.get() {
                    return;
                }
                let combined = pending.borrow_mut().record(slot, result);
                if let Some(combined) = combined {
                    if let Err(e) = &combined {
                        console_warn(&format!("Template load failed: {e}"));
                    }
                    panel.borrow_mut().templates_decoded(combined);
                }
            }
        };

        let onload = {
            let img = img.clone();
            let deliver = deliver.clone();
            Closure::wrap(Box::new(move || deliver(decode_element(&img, policy))) as Box<dyn FnMut()>)
        };
        let onerror = {
            let url = url.to_string();
            Closure::wrap(Box::new(move || deliver(Err(unavailable(format!("failed to load {url}"))))) as Box<dyn FnMut()>)
        };

        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
        img.set_src(url);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brainfield_render::synthetic_templates;

    fn asset() -> TemplateAsset {
        synthetic_templates(8, 8, MaskPolicy::AlphaPassthrough).fill
    }

    #[test]
    fn test_waits_for_both() {
        let mut pending = PendingTemplates::default();
        assert!(pending.record(Slot::Outline, Ok(asset())).is_none());
        let combined = pending.record(Slot::Fill, Ok(asset())).unwrap();
        assert!(combined.is_ok());
        // Released once only
        assert!(pending.record(Slot::Fill, Ok(asset())).is_none());
    }

    #[test]
    fn test_either_failure_fails_pair() {
        let mut pending = PendingTemplates::default();
        assert!(pending.record(Slot::Fill, Err(unavailable("404"))).is_none());
        let combined = pending.record(Slot::Outline, Ok(asset())).unwrap();
        assert!(matches!(combined, Err(TemplateError::Unavailable { .. })));
    }
}
