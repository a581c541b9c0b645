//! Drawing capability interface
//!
//! The pipeline only needs a handful of 2D primitives: rectangles, circles,
//! a radial gradient, an ellipse stroke, scaled image blits, text and three
//! composite modes. [`Canvas2d`] names exactly those so the same frame code
//! drives the software rasterizer and a browser canvas.

use std::fmt::Write as _;

use brainfield_core::{Rect, Rgb};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::CanvasError;

/// Straight (non-premultiplied) 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba8 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Opaque white
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from an RGB triple.
    #[inline]
    pub const fn opaque(rgb: Rgb) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], 255)
    }

    /// Same color with alpha scaled by `factor` (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_alpha(self, factor: f32) -> Self {
        let a = (f32::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Components as `0..=1` floats.
    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// CSS `rgba(...)` string.
    pub fn to_css(self) -> String {
        let mut css = String::with_capacity(24);
        let _ = write!(css, "rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, f32::from(self.a) / 255.0);
        css
    }
}

/// How new pixels combine with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeMode {
    /// Normal alpha blending
    #[default]
    SourceOver,
    /// Additive blending (glow halos)
    Lighter,
    /// Keep the destination only where the source is opaque (masking)
    DestinationIn,
}

impl CompositeMode {
    /// Name used by the HTML canvas `globalCompositeOperation`.
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Lighter => "lighter",
            Self::DestinationIn => "destination-in",
        }
    }
}

/// Two-stop radial gradient; outside the outer radius the outer color holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialGradient {
    /// Center point
    pub center: (f32, f32),
    /// Radius where the inner color ends
    pub inner_radius: f32,
    /// Radius where the outer color starts
    pub outer_radius: f32,
    /// Color at and inside the inner radius
    pub inner: Rgba8,
    /// Color at and beyond the outer radius
    pub outer: Rgba8,
}

impl RadialGradient {
    /// Color at distance `d` from the center.
    pub fn color_at(&self, d: f32) -> [f32; 4] {
        let span = self.outer_radius - self.inner_radius;
        let t = if span <= f32::EPSILON {
            if d <= self.inner_radius { 0.0 } else { 1.0 }
        } else {
            ((d - self.inner_radius) / span).clamp(0.0, 1.0)
        };
        let a = self.inner.to_f32();
        let b = self.outer.to_f32();
        [
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
            a[3] + (b[3] - a[3]) * t,
        ]
    }
}

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Anchor at the left edge
    #[default]
    Left,
    /// Anchor at the center
    Center,
    /// Anchor at the right edge
    Right,
}

/// Text appearance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels
    pub size_px: f32,
    /// Fill color
    pub color: Rgba8,
    /// Horizontal anchor
    pub align: TextAlign,
    /// Bold weight
    pub bold: bool,
}

impl TextStyle {
    /// Centered label text.
    pub const fn centered(size_px: f32, color: Rgba8) -> Self {
        Self { size_px, color, align: TextAlign::Center, bold: false }
    }

    /// CSS font shorthand.
    pub fn css_font(&self) -> String {
        let weight = if self.bold { "bold " } else { "" };
        format!("{weight}{:.0}px sans-serif", self.size_px)
    }
}

/// Minimal 2D drawing surface.
///
/// Global alpha and the composite mode are sticky state, as on an HTML
/// canvas; [`Canvas2d::reset_state`] restores the defaults.
pub trait Canvas2d {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Clear every pixel to transparent.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn clear(&mut self) -> Result<(), CanvasError>;

    /// Multiply every following draw by `alpha`.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Composite mode for following draws.
    fn set_composite(&mut self, mode: CompositeMode);

    /// Fill a rectangle with a solid color.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> Result<(), CanvasError>;

    /// Fill a rectangle with a radial gradient.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn fill_radial_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), CanvasError>;

    /// Fill a circle.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba8) -> Result<(), CanvasError>;

    /// Stroke an axis-aligned ellipse.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn stroke_ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        line_width: f32,
        color: Rgba8,
    ) -> Result<(), CanvasError>;

    /// Draw an image scaled into `dest`.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<(), CanvasError>;

    /// Draw a line of text anchored at `(x, y)` (baseline).
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<(), CanvasError>;

    /// Copy of the current pixels, if the backend can read them back.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn read_pixels(&self) -> Result<Option<RgbaImage>, CanvasError>;

    /// Restore global alpha 1 and source-over compositing.
    fn reset_state(&mut self) {
        self.set_global_alpha(1.0);
        self.set_composite(CompositeMode::SourceOver);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Canvas that records calls instead of drawing, for ordering tests.

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Clear,
        Alpha(f32),
        Composite(CompositeMode),
        Rect,
        Gradient,
        Circle { radius: f32, color: Rgba8 },
        Ellipse,
        Image { width: u32, height: u32 },
        Text(String),
    }

    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub width: u32,
        pub height: u32,
        pub ops: Vec<Op>,
        pub fail_on_image: bool,
    }

    impl RecordingCanvas {
        pub fn new(width: u32, height: u32) -> Self {
            Self { width, height, ..Self::default() }
        }

        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas2d for RecordingCanvas {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn clear(&mut self) -> Result<(), CanvasError> {
            self.ops.push(Op::Clear);
            Ok(())
        }

        fn set_global_alpha(&mut self, alpha: f32) {
            self.ops.push(Op::Alpha(alpha));
        }

        fn set_composite(&mut self, mode: CompositeMode) {
            self.ops.push(Op::Composite(mode));
        }

        fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) -> Result<(), CanvasError> {
            self.ops.push(Op::Rect);
            Ok(())
        }

        fn fill_radial_gradient(&mut self, _rect: Rect, _gradient: &RadialGradient) -> Result<(), CanvasError> {
            self.ops.push(Op::Gradient);
            Ok(())
        }

        fn fill_circle(&mut self, _cx: f32, _cy: f32, radius: f32, color: Rgba8) -> Result<(), CanvasError> {
            self.ops.push(Op::Circle { radius, color });
            Ok(())
        }

        fn stroke_ellipse(
            &mut self,
            _cx: f32,
            _cy: f32,
            _rx: f32,
            _ry: f32,
            _line_width: f32,
            _color: Rgba8,
        ) -> Result<(), CanvasError> {
            self.ops.push(Op::Ellipse);
            Ok(())
        }

        fn draw_image(&mut self, image: &RgbaImage, _dest: Rect) -> Result<(), CanvasError> {
            if self.fail_on_image {
                return Err(CanvasError::Backend("image blit rejected".to_string()));
            }
            self.ops.push(Op::Image { width: image.width(), height: image.height() });
            Ok(())
        }

        fn fill_text(&mut self, text: &str, _x: f32, _y: f32, _style: &TextStyle) -> Result<(), CanvasError> {
            self.ops.push(Op::Text(text.to_string()));
            Ok(())
        }

        fn read_pixels(&self) -> Result<Option<RgbaImage>, CanvasError> {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_strings() {
        assert_eq!(Rgba8::new(10, 20, 30, 255).to_css(), "rgba(10, 20, 30, 1.000)");
        assert_eq!(CompositeMode::Lighter.css_name(), "lighter");
        let style = TextStyle { bold: true, ..TextStyle::centered(14.0, Rgba8::WHITE) };
        assert_eq!(style.css_font(), "bold 14px sans-serif");
    }

    #[test]
    fn test_with_alpha() {
        assert_eq!(Rgba8::WHITE.with_alpha(0.3).a, 77);
        assert_eq!(Rgba8::WHITE.with_alpha(2.0).a, 255);
    }

    #[test]
    fn test_gradient_color() {
        let g = RadialGradient {
            center: (0.0, 0.0),
            inner_radius: 0.0,
            outer_radius: 10.0,
            inner: Rgba8::new(255, 0, 0, 255),
            outer: Rgba8::new(0, 0, 255, 0),
        };
        assert_eq!(g.color_at(0.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.color_at(50.0), [0.0, 0.0, 1.0, 0.0]);
        let mid = g.color_at(5.0);
        assert!((mid[0] - 0.5).abs() < 1e-6 && (mid[3] - 0.5).abs() < 1e-6);
    }
}
