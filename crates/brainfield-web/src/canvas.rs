//! `Canvas2d` backend over a browser 2D context.

use std::f64::consts::TAU;

use brainfield_core::Rect;
use brainfield_render::{Canvas2d, CanvasError, CompositeMode, RadialGradient, Rgba8, TextAlign, TextStyle};
use image::RgbaImage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::console_warn;

fn js_err(e: JsValue) -> CanvasError {
    CanvasError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Create a detached canvas element and its 2D context.
pub(crate) fn create_canvas(width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let document = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = context_2d(&canvas)?;
    Ok((canvas, ctx))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("No 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Browser canvas surface.
///
/// Images go through a scratch canvas so they can be scaled and composited
/// with `drawImage`; `putImageData` would ignore both.
pub struct WebCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scratch: HtmlCanvasElement,
    scratch_ctx: CanvasRenderingContext2d,
}

impl WebCanvas {
    /// Wrap a canvas element.
    ///
    /// # Errors
    ///
    /// The element has no 2D context or no scratch canvas can be created.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&canvas)?;
        let (scratch, scratch_ctx) = create_canvas(1, 1)?;
        Ok(Self { canvas, ctx, scratch, scratch_ctx })
    }

    /// The wrapped element.
    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_fill(&self, color: Rgba8) {
        self.ctx.set_fill_style(&color.to_css().into());
    }
}

impl Canvas2d for WebCanvas {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn clear(&mut self) -> Result<(), CanvasError> {
        self.ctx.clear_rect(0.0, 0.0, f64::from(self.width()), f64::from(self.height()));
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(f64::from(alpha));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        if let Err(e) = self.ctx.set_global_composite_operation(mode.css_name()) {
            console_warn(&format!("Composite mode {} rejected: {e:?}", mode.css_name()));
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> Result<(), CanvasError> {
        self.set_fill(color);
        self.ctx.fill_rect(f64::from(rect.x), f64::from(rect.y), f64::from(rect.width), f64::from(rect.height));
        Ok(())
    }

    fn fill_radial_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), CanvasError> {
        let (cx, cy) = (f64::from(gradient.center.0), f64::from(gradient.center.1));
        let fill = self
            .ctx
            .create_radial_gradient(cx, cy, f64::from(gradient.inner_radius), cx, cy, f64::from(gradient.outer_radius))
            .map_err(js_err)?;
        fill.add_color_stop(0.0, &gradient.inner.to_css()).map_err(js_err)?;
        fill.add_color_stop(1.0, &gradient.outer.to_css()).map_err(js_err)?;
        self.ctx.set_fill_style(fill.as_ref());
        self.ctx.fill_rect(f64::from(rect.x), f64::from(rect.y), f64::from(rect.width), f64::from(rect.height));
        Ok(())
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba8) -> Result<(), CanvasError> {
        if radius <= 0.0 {
            return Ok(());
        }
        self.set_fill(color);
        self.ctx.begin_path();
        self.ctx.arc(f64::from(cx), f64::from(cy), f64::from(radius), 0.0, TAU).map_err(js_err)?;
        self.ctx.fill();
        Ok(())
    }

    fn stroke_ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        line_width: f32,
        color: Rgba8,
    ) -> Result<(), CanvasError> {
        self.ctx.set_stroke_style(&color.to_css().into());
        self.ctx.set_line_width(f64::from(line_width));
        self.ctx.begin_path();
        self.ctx
            .ellipse(f64::from(cx), f64::from(cy), f64::from(rx), f64::from(ry), 0.0, 0.0, TAU)
            .map_err(js_err)?;
        self.ctx.stroke();
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<(), CanvasError> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }
        if self.scratch.width() != w || self.scratch.height() != h {
            self.scratch.set_width(w);
            self.scratch.set_height(h);
        }
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(image.as_raw().as_slice()), w, h)
            .map_err(js_err)?;
        self.scratch_ctx.put_image_data(&data, 0.0, 0.0).map_err(js_err)?;
        self.ctx
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.scratch,
                f64::from(dest.x),
                f64::from(dest.y),
                f64::from(dest.width),
                f64::from(dest.height),
            )
            .map_err(js_err)
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<(), CanvasError> {
        self.set_fill(style.color);
        self.ctx.set_font(&style.css_font());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.fill_text(text, f64::from(x), f64::from(y)).map_err(js_err)
    }

    fn read_pixels(&self) -> Result<Option<RgbaImage>, CanvasError> {
        let (w, h) = (self.width(), self.height());
        let data = self.ctx.get_image_data(0.0, 0.0, f64::from(w), f64::from(h)).map_err(js_err)?;
        let bytes = data.data().0;
        let len = bytes.len();
        RgbaImage::from_raw(w, h, bytes)
            .map(Some)
            .ok_or(CanvasError::BufferSize { len, width: w, height: h })
    }
}
