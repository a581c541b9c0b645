//! Template images for the brain silhouette.
//!
//! A template set is two images covering the brain rectangle: the fill
//! template whose alpha channel becomes the silhouette mask, and the outline
//! drawn on top of the masked field. Each asset carries its own
//! [`MaskPolicy`].

use brainfield_core::{MaskPolicy, Rect};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::canvas::Rgba8;
use crate::error::TemplateError;
use crate::raster::RasterCanvas;

/// One decoded template image and the policy that turns it into a mask.
#[derive(Clone, Debug)]
pub struct TemplateAsset {
    image: RgbaImage,
    policy: MaskPolicy,
}

impl TemplateAsset {
    /// Wrap an already decoded image.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Empty`] for a zero-sized image.
    pub fn new(image: RgbaImage, policy: MaskPolicy) -> Result<Self, TemplateError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TemplateError::Empty { width: image.width(), height: image.height() });
        }
        Ok(Self { image, policy })
    }

    /// Decode PNG (or any enabled format) bytes.
    ///
    /// # Errors
    ///
    /// Decode failure or an empty image.
    pub fn decode(bytes: &[u8], policy: MaskPolicy) -> Result<Self, TemplateError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        debug!(width = image.width(), height = image.height(), ?policy, "Decoded template image");
        Self::new(image, policy)
    }

    /// The decoded image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Mask policy of this asset.
    pub fn policy(&self) -> MaskPolicy {
        self.policy
    }

    /// White image whose alpha is the policy-derived mask.
    pub fn mask_image(&self) -> RgbaImage {
        let policy = self.policy;
        RgbaImage::from_fn(self.image.width(), self.image.height(), |x, y| {
            Rgba([255, 255, 255, policy.mask_alpha(self.image.get_pixel(x, y)[3])])
        })
    }
}

/// Fill and outline templates for one theme.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    /// Silhouette fill (mask source)
    pub fill: TemplateAsset,
    /// Outline drawn over the masked field
    pub outline: TemplateAsset,
}

impl TemplateSet {
    /// Decode both templates with the same policy.
    ///
    /// # Errors
    ///
    /// The first decode failure.
    pub fn decode(fill: &[u8], outline: &[u8], policy: MaskPolicy) -> Result<Self, TemplateError> {
        Ok(Self { fill: TemplateAsset::decode(fill, policy)?, outline: TemplateAsset::decode(outline, policy)? })
    }
}

/// What a ready panel has to draw the silhouette with.
#[derive(Clone, Debug)]
pub enum TemplateAssets {
    /// Both templates decoded
    Available(TemplateSet),
    /// Decoding failed; the field is clipped by the elliptical grid mask only
    Unavailable,
}

impl TemplateAssets {
    /// Templates, if decoded.
    pub fn set(&self) -> Option<&TemplateSet> {
        match self {
            Self::Available(set) => Some(set),
            Self::Unavailable => None,
        }
    }
}

// ============================================================================
// Procedural Templates
// ============================================================================

/// Hemisphere ellipses in normalized template coordinates: (cx, cy, rx, ry).
const HEMISPHERES: [(f32, f32, f32, f32); 2] = [(0.36, 0.5, 0.3, 0.46), (0.64, 0.5, 0.3, 0.46)];

const SILHOUETTE_FILL: Rgba8 = Rgba8::new(232, 224, 228, 255);
const FRAME_FILL: Rgba8 = Rgba8::new(14, 14, 26, 255);
const OUTLINE_COLOR: Rgba8 = Rgba8::new(200, 200, 215, 255);

fn inside_silhouette(nx: f32, ny: f32) -> bool {
    HEMISPHERES.iter().any(|&(cx, cy, rx, ry)| {
        let dx = (nx - cx) / rx;
        let dy = (ny - cy) / ry;
        dx * dx + dy * dy <= 1.0
    })
}

/// Built-in two-hemisphere templates, used when no artwork is supplied.
///
/// With [`MaskPolicy::AlphaPassthrough`] the fill is opaque inside the
/// silhouette; with [`MaskPolicy::AlphaInversion`] it is an opaque frame
/// around a transparent silhouette. Both yield the same mask.
pub fn synthetic_templates(width: u32, height: u32, policy: MaskPolicy) -> TemplateSet {
    let width = width.max(1);
    let height = height.max(1);

    let fill = RgbaImage::from_fn(width, height, |x, y| {
        let nx = (x as f32 + 0.5) / width as f32;
        let ny = (y as f32 + 0.5) / height as f32;
        let inside = inside_silhouette(nx, ny);
        let color = match (policy, inside) {
            (MaskPolicy::AlphaPassthrough, true) => SILHOUETTE_FILL,
            (MaskPolicy::AlphaInversion, false) => FRAME_FILL,
            _ => Rgba8::TRANSPARENT,
        };
        Rgba([color.r, color.g, color.b, color.a])
    });

    let mut outline = RasterCanvas::new(width, height);
    let (w, h) = (width as f32, height as f32);
    let line = (w.min(h) / 128.0).max(1.0);
    for &(cx, cy, rx, ry) in &HEMISPHERES {
        outline.paint_ellipse_stroke(cx * w, cy * h, rx * w, ry * h, line, OUTLINE_COLOR);
    }
    outline.paint_rect(Rect::new(0.5 * w - line * 0.5, 0.12 * h, line, 0.76 * h), OUTLINE_COLOR.with_alpha(0.6));

    TemplateSet {
        fill: TemplateAsset { image: fill, policy },
        outline: TemplateAsset { image: outline.into_image(), policy },
    }
}
