//! Silhouette masking and compositing.

use brainfield_core::{Rect, RgbaGrid};
use image::RgbaImage;

use crate::canvas::{Canvas2d, CompositeMode, Rgba8};
use crate::error::{CanvasError, RenderError};
use crate::raster::RasterCanvas;
use crate::template::{TemplateAsset, TemplateSet};

/// Global alpha of the outline on an inactive panel
pub const INACTIVE_OUTLINE_ALPHA: f32 = 0.3;

const FALLBACK_OUTLINE: Rgba8 = Rgba8::new(180, 180, 200, 255);

/// Wrap a colorized grid as an image.
///
/// # Errors
///
/// [`CanvasError::BufferSize`] if the grid bytes do not match its size.
pub fn grid_to_image(grid: RgbaGrid) -> Result<RgbaImage, CanvasError> {
    let side = grid.size() as u32;
    let bytes = grid.into_bytes();
    let len = bytes.len();
    RgbaImage::from_raw(side, side, bytes).ok_or(CanvasError::BufferSize { len, width: side, height: side })
}

/// Pixel size of the brain rectangle, at least 1×1.
fn footprint(rect: Rect) -> (u32, u32) {
    (rect.width.round().max(1.0) as u32, rect.height.round().max(1.0) as u32)
}

/// Clip a colored field to a fill template.
///
/// The field and the policy-derived mask are both scaled to
/// `width × height` on an offscreen canvas, then the mask is drawn with
/// `destination-in`, so `out.a = field.a · mask.a / 255`.
///
/// # Errors
///
/// Offscreen drawing failure.
pub fn apply_mask(field: &RgbaImage, fill: &TemplateAsset, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    let full = Rect::new(0.0, 0.0, width as f32, height as f32);
    let mut offscreen = RasterCanvas::new(width, height);
    offscreen.draw_image(field, full)?;
    offscreen.set_composite(CompositeMode::DestinationIn);
    offscreen.draw_image(&fill.mask_image(), full)?;
    Ok(offscreen.into_image())
}

/// Draw the colored field into `rect`, masked and outlined when templates exist.
///
/// # Errors
///
/// Drawing failure.
pub fn composite_active<C: Canvas2d + ?Sized>(
    canvas: &mut C,
    field: &RgbaImage,
    templates: Option<&TemplateSet>,
    rect: Rect,
) -> Result<(), RenderError> {
    canvas.reset_state();
    match templates {
        Some(set) => {
            let (w, h) = footprint(rect);
            let masked = apply_mask(field, &set.fill, w, h)?;
            canvas.draw_image(&masked, rect)?;
            canvas.draw_image(set.outline.image(), rect)?;
        }
        // Already clipped by the elliptical grid mask
        None => canvas.draw_image(field, rect)?,
    }
    Ok(())
}

/// Inactive panel: the outline (or an ellipse) at reduced opacity, no field.
///
/// # Errors
///
/// Drawing failure.
pub fn draw_inactive<C: Canvas2d + ?Sized>(
    canvas: &mut C,
    templates: Option<&TemplateSet>,
    rect: Rect,
) -> Result<(), RenderError> {
    canvas.reset_state();
    canvas.set_global_alpha(INACTIVE_OUTLINE_ALPHA);
    let result = match templates {
        Some(set) => canvas.draw_image(set.outline.image(), rect),
        None => {
            let (cx, cy) = rect.center();
            canvas.stroke_ellipse(cx, cy, rect.width * 0.45, rect.height * 0.48, 2.0, FALLBACK_OUTLINE)
        }
    };
    canvas.reset_state();
    result.map_err(RenderError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{Op, RecordingCanvas};
    use crate::template::synthetic_templates;
    use brainfield_core::MaskPolicy;
    use image::Rgba;

    fn solid(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([250, 120, 30, 220]))
    }

    #[test]
    fn test_mask_containment() {
        for policy in [MaskPolicy::AlphaPassthrough, MaskPolicy::AlphaInversion] {
            let set = synthetic_templates(80, 80, policy);
            let out = apply_mask(&solid(70, 70), &set.fill, 80, 80).unwrap();
            let mask = set.fill.mask_image();
            for (x, y, p) in out.enumerate_pixels() {
                if mask.get_pixel(x, y)[3] == 0 {
                    assert_eq!(p[3], 0, "field leaked at ({x}, {y})");
                }
            }
            // Center is inside the silhouette
            assert_eq!(out.get_pixel(28, 40)[3], 220);
        }
    }

    #[test]
    fn test_grid_to_image() {
        let image = grid_to_image(RgbaGrid::transparent(8)).unwrap();
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn test_composite_order() {
        let set = synthetic_templates(16, 16, MaskPolicy::AlphaPassthrough);
        let mut canvas = RecordingCanvas::new(20, 20);
        composite_active(&mut canvas, &solid(8, 8), Some(&set), Rect::new(2.0, 2.0, 16.0, 16.0)).unwrap();
        let images: Vec<_> = canvas.ops.iter().filter(|op| matches!(op, Op::Image { .. })).collect();
        // Masked field first, outline second
        assert_eq!(images, vec![&Op::Image { width: 16, height: 16 }, &Op::Image { width: 16, height: 16 }]);
        assert!(!canvas.ops.contains(&Op::Alpha(INACTIVE_OUTLINE_ALPHA)));
    }

    #[test]
    fn test_inactive_uses_reduced_alpha() {
        let mut canvas = RecordingCanvas::new(20, 20);
        draw_inactive(&mut canvas, None, Rect::new(2.0, 2.0, 16.0, 16.0)).unwrap();
        let alpha_at = canvas.ops.iter().position(|op| *op == Op::Alpha(INACTIVE_OUTLINE_ALPHA)).unwrap();
        let ellipse_at = canvas.ops.iter().position(|op| *op == Op::Ellipse).unwrap();
        assert!(alpha_at < ellipse_at);
        assert_eq!(canvas.ops.last(), Some(&Op::Composite(CompositeMode::SourceOver)));
    }
}
