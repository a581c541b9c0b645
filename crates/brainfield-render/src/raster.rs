//! Software raster backend
//!
//! [`RasterCanvas`] implements [`Canvas2d`] over an `image::RgbaImage`. It is
//! the offscreen buffer used by the silhouette masker on every backend and
//! the whole surface for headless rendering. Blending runs in premultiplied
//! space, and scaled images are resampled premultiplied as a browser canvas
//! does. Shapes get one pixel of coverage antialiasing. Text is drawn with the
//! `font8x8` bitmap font and also recorded as [`TextRun`]s.

use brainfield_core::Rect;
use font8x8::legacy::BASIC_LEGACY;
use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};

use crate::canvas::{Canvas2d, CompositeMode, RadialGradient, Rgba8, TextAlign, TextStyle};
use crate::error::CanvasError;

/// A text draw call captured by the raster backend.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Text content
    pub text: String,
    /// Anchor x
    pub x: f32,
    /// Baseline y
    pub y: f32,
    /// Style with global alpha already applied
    pub style: TextStyle,
}

/// CPU canvas backed by an RGBA8 image.
#[derive(Clone, Debug)]
pub struct RasterCanvas {
    pixels: RgbaImage,
    global_alpha: f32,
    composite: CompositeMode,
    text_runs: Vec<TextRun>,
}

impl RasterCanvas {
    /// Transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            global_alpha: 1.0,
            composite: CompositeMode::SourceOver,
            text_runs: Vec::new(),
        }
    }

    /// Current pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume into the pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Text drawn since the last clear.
    pub fn text_runs(&self) -> &[TextRun] {
        &self.text_runs
    }

    /// Pixel index range covered by `[lo, hi)` along an axis of `len` pixels.
    fn span(lo: f32, hi: f32, len: u32) -> (u32, u32) {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil().max(0.0) as u32).min(len);
        (start.min(len), end)
    }

    /// Blend a straight-alpha source color into one pixel.
    fn blend(&mut self, x: u32, y: u32, src: [f32; 4], coverage: f32) {
        let sa = src[3] * coverage * self.global_alpha;
        let dst = self.pixels.get_pixel_mut(x, y);
        dst.0 = composite(dst.0, [src[0], src[1], src[2], sa], self.composite);
    }

    /// Blend into a pixel given signed coordinates, skipping off-surface ones.
    fn blend_clipped(&mut self, x: i64, y: i64, src: [f32; 4]) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        self.blend(x as u32, y as u32, src, 1.0);
    }

    pub(crate) fn paint_rect(&mut self, rect: Rect, color: Rgba8) {
        let (x0, x1) = Self::span(rect.x, rect.x + rect.width, self.width());
        let (y0, y1) = Self::span(rect.y, rect.y + rect.height, self.height());
        let src = color.to_f32();
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, src, 1.0);
            }
        }
    }

    pub(crate) fn paint_ellipse_stroke(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, line_width: f32, color: Rgba8) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let half = line_width * 0.5;
        let pad = half + 1.0;
        let (x0, x1) = Self::span(cx - rx - pad, cx + rx + pad, self.width());
        let (y0, y1) = Self::span(cy - ry - pad, cy + ry + pad, self.height());
        let src = color.to_f32();
        for y in y0..y1 {
            for x in x0..x1 {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                let f = (nx * nx + ny * ny).sqrt();
                if f < f32::EPSILON {
                    continue;
                }
                // First-order distance to the curve: |f - 1| / |grad f|
                let grad = ((nx / rx).powi(2) + (ny / ry).powi(2)).sqrt() / f;
                let distance = (f - 1.0).abs() / grad;
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, src, coverage);
                }
            }
        }
    }

    /// Draw `text` with the 8x8 bitmap font scaled by whole pixels.
    ///
    /// `y` is the baseline, which sits under row 6 of the glyph cell.
    fn paint_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let scale = (style.size_px / GLYPH_CELL as f32).round().max(1.0) as i64;
        let glyphs: Vec<[u8; 8]> = text.replace('\u{2026}', "...").chars().map(glyph_for_char).collect();
        let advance = GLYPH_CELL * scale;
        let run_width = advance * glyphs.len() as i64;
        let anchor = x.round() as i64;
        let left = match style.align {
            TextAlign::Left => anchor,
            TextAlign::Center => anchor - run_width / 2,
            TextAlign::Right => anchor - run_width,
        };
        let top = y.round() as i64 - 7 * scale;
        let src = style.color.to_f32();

        for (index, rows) in glyphs.iter().enumerate() {
            let cell_x = left + index as i64 * advance;
            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_CELL {
                    let lit = (bits >> col) & 1 == 1 || (style.bold && col > 0 && (bits >> (col - 1)) & 1 == 1);
                    if !lit {
                        continue;
                    }
                    let px = cell_x + col * scale;
                    let py = top + row as i64 * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.blend_clipped(px + dx, py + dy, src);
                        }
                    }
                }
            }
        }
    }
}

/// Width and height of a bitmap glyph cell in font pixels
const GLYPH_CELL: i64 = 8;

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[usize::from(b'?')]
    }
}

/// Resample in premultiplied space so transparent texels carry no color.
fn resize_premultiplied(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let a = f32::from(a) / 255.0;
        Rgba([f32::from(r) / 255.0 * a, f32::from(g) / 255.0 * a, f32::from(b) / 255.0 * a, a])
    });
    let scaled = imageops::resize(&premultiplied, width, height, FilterType::Triangle);
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = scaled.get_pixel(x, y).0;
        if a <= 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)])
    })
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Porter-Duff composite of a straight-alpha source over an RGBA8 pixel.
fn composite(dst: [u8; 4], src: [f32; 4], mode: CompositeMode) -> [u8; 4] {
    let sa = src[3].clamp(0.0, 1.0);
    let (sr, sg, sb) = (src[0] * sa, src[1] * sa, src[2] * sa);
    let da = f32::from(dst[3]) / 255.0;
    let (dr, dg, db) = (
        f32::from(dst[0]) / 255.0 * da,
        f32::from(dst[1]) / 255.0 * da,
        f32::from(dst[2]) / 255.0 * da,
    );

    let (r, g, b, a) = match mode {
        CompositeMode::SourceOver => {
            let k = 1.0 - sa;
            (sr + dr * k, sg + dg * k, sb + db * k, sa + da * k)
        }
        CompositeMode::Lighter => ((sr + dr).min(1.0), (sg + dg).min(1.0), (sb + db).min(1.0), (sa + da).min(1.0)),
        CompositeMode::DestinationIn => {
            if sa >= 1.0 {
                return dst;
            }
            (dr * sa, dg * sa, db * sa, da * sa)
        }
    };

    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    [to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)]
}

impl Canvas2d for RasterCanvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn clear(&mut self) -> Result<(), CanvasError> {
        for p in self.pixels.pixels_mut() {
            p.0 = [0, 0, 0, 0];
        }
        self.text_runs.clear();
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> Result<(), CanvasError> {
        self.paint_rect(rect, color);
        Ok(())
    }

    fn fill_radial_gradient(&mut self, rect: Rect, gradient: &RadialGradient) -> Result<(), CanvasError> {
        let (x0, x1) = Self::span(rect.x, rect.x + rect.width, self.width());
        let (y0, y1) = Self::span(rect.y, rect.y + rect.height, self.height());
        let (gx, gy) = gradient.center;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - gx;
                let dy = y as f32 + 0.5 - gy;
                let src = gradient.color_at((dx * dx + dy * dy).sqrt());
                self.blend(x, y, src, 1.0);
            }
        }
        Ok(())
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba8) -> Result<(), CanvasError> {
        if radius <= 0.0 || !radius.is_finite() {
            return Ok(());
        }
        let (x0, x1) = Self::span(cx - radius - 1.0, cx + radius + 1.0, self.width());
        let (y0, y1) = Self::span(cy - radius - 1.0, cy + radius + 1.0, self.height());
        let src = color.to_f32();
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, src, coverage);
                }
            }
        }
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
        self.paint_ellipse_stroke(cx, cy, rx, ry, line_width, color);
        Ok(())
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<(), CanvasError> {
        let width = dest.width.round();
        let height = dest.height.round();
        if image.width() == 0 || image.height() == 0 || width < 1.0 || height < 1.0 {
            return Ok(());
        }
        let (width, height) = (width as u32, height as u32);

        let scaled;
        let source = if image.width() == width && image.height() == height {
            image
        } else {
            scaled = resize_premultiplied(image, width, height);
            &scaled
        };

        let ox = dest.x.round() as i64;
        let oy = dest.y.round() as i64;
        for (sx, sy, pixel) in source.enumerate_pixels() {
            let src = Rgba8::new(pixel[0], pixel[1], pixel[2], pixel[3]).to_f32();
            self.blend_clipped(ox + i64::from(sx), oy + i64::from(sy), src);
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<(), CanvasError> {
        self.paint_text(text, x, y, style);
        let style = TextStyle { color: style.color.with_alpha(self.global_alpha), ..*style };
        self.text_runs.push(TextRun { text: text.to_string(), x, y, style });
        Ok(())
    }

    fn read_pixels(&self) -> Result<Option<RgbaImage>, CanvasError> {
        Ok(Some(self.pixels.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_over_opaque_replaces() {
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba8::new(255, 0, 0, 255)).unwrap();
        canvas.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), Rgba8::new(0, 0, 255, 255)).unwrap();
        assert_eq!(canvas.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.pixels().get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_global_alpha_blends() {
        let mut canvas = RasterCanvas::new(1, 1);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::new(0, 0, 0, 255)).unwrap();
        canvas.set_global_alpha(0.5);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::WHITE).unwrap();
        let p = canvas.pixels().get_pixel(0, 0).0;
        assert_eq!(p[3], 255);
        assert!((i32::from(p[0]) - 128).abs() <= 1);
    }

    #[test]
    fn test_lighter_adds() {
        let mut canvas = RasterCanvas::new(1, 1);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::new(100, 0, 0, 255)).unwrap();
        canvas.set_composite(CompositeMode::Lighter);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba8::new(100, 50, 0, 255)).unwrap();
        assert_eq!(canvas.pixels().get_pixel(0, 0).0, [200, 50, 0, 255]);
    }

    #[test]
    fn test_destination_in_multiplies_alpha() {
        let mut canvas = RasterCanvas::new(2, 1);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 1.0), Rgba8::new(200, 100, 50, 255)).unwrap();
        let mut mask = RgbaImage::new(2, 1);
        mask.put_pixel(0, 0, image::Rgba([255, 255, 255, 0]));
        mask.put_pixel(1, 0, image::Rgba([255, 255, 255, 255]));
        canvas.set_composite(CompositeMode::DestinationIn);
        canvas.draw_image(&mask, Rect::new(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(canvas.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(canvas.pixels().get_pixel(1, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_circle_coverage() {
        let mut canvas = RasterCanvas::new(21, 21);
        canvas.fill_circle(10.5, 10.5, 5.0, Rgba8::WHITE).unwrap();
        assert_eq!(canvas.pixels().get_pixel(10, 10)[3], 255);
        assert_eq!(canvas.pixels().get_pixel(0, 0)[3], 0);
        assert_eq!(canvas.pixels().get_pixel(10, 3)[3], 0);
    }

    #[test]
    fn test_ellipse_stroke_hollow() {
        let mut canvas = RasterCanvas::new(41, 41);
        canvas.stroke_ellipse(20.5, 20.5, 15.0, 10.0, 2.0, Rgba8::WHITE).unwrap();
        assert_eq!(canvas.pixels().get_pixel(20, 20)[3], 0);
        assert!(canvas.pixels().get_pixel(35, 20)[3] > 200);
        assert!(canvas.pixels().get_pixel(20, 10)[3] > 200);
    }

    #[test]
    fn test_draw_image_scales_and_clips() {
        let mut source = RgbaImage::new(2, 2);
        for p in source.pixels_mut() {
            p.0 = [10, 20, 30, 255];
        }
        let mut canvas = RasterCanvas::new(8, 8);
        canvas.draw_image(&source, Rect::new(4.0, 4.0, 8.0, 8.0)).unwrap();
        assert_eq!(canvas.pixels().get_pixel(7, 7).0, [10, 20, 30, 255]);
        assert_eq!(canvas.pixels().get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_text_recorded_and_cleared() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.set_global_alpha(0.5);
        canvas.fill_text("Brain 3", 5.0, 5.0, &TextStyle::centered(12.0, Rgba8::WHITE)).unwrap();
        assert_eq!(canvas.text_runs().len(), 1);
        assert_eq!(canvas.text_runs()[0].style.color.a, 128);
        canvas.clear().unwrap();
        assert!(canvas.text_runs().is_empty());
    }

    #[test]
    fn test_scaled_edges_keep_source_hue() {
        let mut source = RgbaImage::new(4, 1);
        source.put_pixel(1, 0, Rgba([255, 200, 0, 255]));
        source.put_pixel(2, 0, Rgba([255, 200, 0, 255]));

        let mut canvas = RasterCanvas::new(16, 1);
        canvas.draw_image(&source, Rect::new(0.0, 0.0, 16.0, 1.0)).unwrap();

        let edges: Vec<[u8; 4]> =
            canvas.pixels().pixels().map(|p| p.0).filter(|p| p[3] > 0 && p[3] < 255).collect();
        assert!(!edges.is_empty());
        for p in edges.iter().filter(|p| p[3] >= 32) {
            assert!(p[0] >= 250, "edge darkened: {p:?}");
            assert!((i32::from(p[1]) - 200).abs() <= 3, "edge hue shifted: {p:?}");
            assert_eq!(p[2], 0);
        }
    }

    #[test]
    fn test_text_rasterized_at_anchor() {
        let style = TextStyle::centered(16.0, Rgba8::WHITE);
        let mut canvas = RasterCanvas::new(100, 40);
        canvas.fill_text("Hi", 50.0, 25.0, &style).unwrap();

        // Two 16 px cells centered on x = 50, rows 11..27
        let lit: Vec<(u32, u32)> =
            canvas.pixels().enumerate_pixels().filter(|(_, _, p)| p[3] > 0).map(|(x, y, _)| (x, y)).collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (34..66).contains(&x) && (11..27).contains(&y)));
    }

    #[test]
    fn test_text_alignment_and_fallback_glyph() {
        let mut left = RasterCanvas::new(64, 16);
        left.fill_text("\u{2603}", 0.0, 8.0, &TextStyle { align: TextAlign::Left, ..TextStyle::centered(8.0, Rgba8::WHITE) })
            .unwrap();
        let mut right = RasterCanvas::new(64, 16);
        right
            .fill_text("?", 64.0, 8.0, &TextStyle { align: TextAlign::Right, ..TextStyle::centered(8.0, Rgba8::WHITE) })
            .unwrap();

        let lit = |c: &RasterCanvas| {
            c.pixels().enumerate_pixels().filter(|(_, _, p)| p[3] > 0).map(|(x, _, _)| x).collect::<Vec<_>>()
        };
        assert!(lit(&left).iter().all(|&x| x < 8));
        assert!(lit(&right).iter().all(|&x| x >= 56));
        assert_eq!(lit(&left).len(), lit(&right).len());
    }
}
