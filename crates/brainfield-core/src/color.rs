//! Color mapping
//!
//! Turns a [`ScalarGrid`] into RGBA pixels: global min/max normalization with
//! a 0.1 range floor, contrast stretch around the midpoint, piecewise-linear
//! ramp lookup and activity-dependent alpha. The colorizer is a pure function
//! and produces identical bytes for identical inputs.

use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::field::ScalarGrid;

/// 8-bit RGB triple
pub type Rgb = [u8; 3];

/// Smallest value range used for normalization
pub const MIN_RANGE: f32 = 0.1;

/// Default contrast stretch
pub const DEFAULT_CONTRAST: f32 = 1.9;

/// Alpha of the lowest activity inside the mask
pub const BASE_ALPHA: f32 = 180.0;

/// Alpha added at the highest activity
pub const ALPHA_SPAN: f32 = 75.0;

// ============================================================================
// Ramps
// ============================================================================

/// Ordered color stops traversed as a piecewise-linear ramp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRamp {
    stops: Vec<Rgb>,
}

impl ColorRamp {
    /// Create a ramp from low to high stops.
    ///
    /// # Errors
    ///
    /// [`FieldError::TooFewStops`] with fewer than two stops.
    pub fn new(stops: Vec<Rgb>) -> Result<Self, FieldError> {
        if stops.len() < 2 {
            return Err(FieldError::TooFewStops { got: stops.len() });
        }
        Ok(Self { stops })
    }

    /// Stops, low to high.
    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at `t ∈ [0, 1]`, interpolated between the bracketing stops.
    pub fn sample(&self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let scaled = t * last as f32;
        let index = (libm::floorf(scaled) as usize).min(last - 1);
        let frac = scaled - index as f32;

        let lo = self.stops[index];
        let hi = self.stops[index + 1];
        [lerp_channel(lo[0], hi[0], frac), lerp_channel(lo[1], hi[1], frac), lerp_channel(lo[2], hi[2], frac)]
    }
}

#[inline]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let v = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
    libm::roundf(v).clamp(0.0, 255.0) as u8
}

/// Relative luminance (Rec. 709 weights, 0-255 scale).
pub fn luminance(rgb: Rgb) -> f32 {
    0.2126 * f32::from(rgb[0]) + 0.7152 * f32::from(rgb[1]) + 0.0722 * f32::from(rgb[2])
}

// ============================================================================
// Themes and Mask Policies
// ============================================================================

/// How a fill template's alpha channel becomes the silhouette mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskPolicy {
    /// Template is opaque where the field should show
    #[default]
    AlphaPassthrough,
    /// Template is opaque where the field should be hidden
    AlphaInversion,
}

impl MaskPolicy {
    /// Mask alpha for a template alpha value.
    #[inline]
    pub const fn mask_alpha(self, template_alpha: u8) -> u8 {
        match self {
            Self::AlphaPassthrough => template_alpha,
            Self::AlphaInversion => 255 - template_alpha,
        }
    }
}

const EMBER_STOPS: [Rgb; 7] = [
    [8, 6, 30],
    [60, 12, 90],
    [140, 20, 110],
    [210, 60, 60],
    [245, 140, 30],
    [250, 210, 80],
    [255, 250, 200],
];

const VIRIDIS_STOPS: [Rgb; 5] = [[68, 1, 84], [59, 82, 139], [33, 145, 140], [94, 201, 98], [253, 231, 37]];

const OCEAN_STOPS: [Rgb; 5] = [[4, 20, 50], [10, 70, 120], [20, 130, 170], [90, 200, 210], [210, 245, 250]];

/// Visual theme: selects the color stops and the mask policy of its template set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorTheme {
    /// Dark violet through red and orange to pale yellow
    #[default]
    Ember,
    /// Viridis-like purple → teal → yellow
    Viridis,
    /// Deep blue → cyan → near white; its templates are cutout frames
    Ocean,
}

impl ColorTheme {
    /// All themes.
    pub const ALL: [Self; 3] = [Self::Ember, Self::Viridis, Self::Ocean];

    /// Stops for this theme, low to high activity.
    pub fn stops(self) -> &'static [Rgb] {
        match self {
            Self::Ember => &EMBER_STOPS,
            Self::Viridis => &VIRIDIS_STOPS,
            Self::Ocean => &OCEAN_STOPS,
        }
    }

    /// Ramp for this theme.
    pub fn ramp(self) -> ColorRamp {
        ColorRamp { stops: self.stops().to_vec() }
    }

    /// Mask policy of the template set that ships with this theme.
    pub const fn mask_policy(self) -> MaskPolicy {
        match self {
            Self::Ember | Self::Viridis => MaskPolicy::AlphaPassthrough,
            Self::Ocean => MaskPolicy::AlphaInversion,
        }
    }
}

// ============================================================================
// Colorizer
// ============================================================================

/// `N × N` RGBA8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaGrid {
    size: usize,
    pixels: Vec<u8>,
}

impl RgbaGrid {
    /// Fully transparent grid.
    pub fn transparent(size: usize) -> Self {
        Self { size, pixels: vec![0; size * size * 4] }
    }

    /// Pixels per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pixel at `(i, j)` (column, row).
    #[inline]
    pub fn pixel(&self, i: usize, j: usize) -> [u8; 4] {
        let at = (j * self.size + i) * 4;
        [self.pixels[at], self.pixels[at + 1], self.pixels[at + 2], self.pixels[at + 3]]
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume into raw RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}

/// Contrast stretch around the midpoint, clamped to `[0, 1]`.
#[inline]
pub fn stretch(normalized: f32, contrast: f32) -> f32 {
    (0.5 + (normalized - 0.5) * contrast).clamp(0.0, 1.0)
}

/// Alpha for a stretched activity: semi-transparent low, opaque high.
#[inline]
pub fn alpha_for(stretched: f32) -> u8 {
    (BASE_ALPHA + stretched * ALPHA_SPAN).min(255.0) as u8
}

/// Colorize a scalar grid.
///
/// NaN cells are fully transparent. A grid without any finite cell yields a
/// fully transparent image.
pub fn colorize(grid: &ScalarGrid, contrast: f32, ramp: &ColorRamp) -> RgbaGrid {
    let size = grid.size();
    let Some((min, max)) = grid.finite_range() else {
        return RgbaGrid::transparent(size);
    };
    let range = (max - min).max(MIN_RANGE);

    let mut pixels = vec![0u8; size * size * 4];
    for (cell, out) in grid.cells().iter().zip(pixels.chunks_exact_mut(4)) {
        if !cell.is_finite() {
            continue;
        }
        let normalized = (cell - min) / range;
        let stretched = stretch(normalized, contrast);
        let [r, g, b] = ramp.sample(stretched);
        out.copy_from_slice(&[r, g, b, alpha_for(stretched)]);
    }

    RgbaGrid { size, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordinateMapper;
    use crate::field::{interpolate, InterpolationSample};
    use crate::mask::BrainMask;

    fn field(samples: &[InterpolationSample], size: usize) -> (ScalarGrid, BrainMask) {
        let mask = BrainMask::elliptical(size);
        let grid = interpolate(samples, &mask, &CoordinateMapper::default()).unwrap();
        (grid, mask)
    }

    fn mixed_samples() -> Vec<InterpolationSample> {
        vec![
            InterpolationSample::new(0.0, 0.0, 20.0),
            InterpolationSample::new(4.0, 4.0, 20.0),
            InterpolationSample::new(1.2, 1.5, 140.0),
            InterpolationSample::new(2.8, 2.5, 5.0),
        ]
    }

    #[test]
    fn test_ramp_endpoints() {
        let ramp = ColorTheme::Ember.ramp();
        assert_eq!(ramp.sample(0.0), EMBER_STOPS[0]);
        assert_eq!(ramp.sample(1.0), EMBER_STOPS[6]);
        assert_eq!(ramp.sample(-3.0), EMBER_STOPS[0]);
        assert_eq!(ramp.sample(f32::NAN), EMBER_STOPS[0]);
    }

    #[test]
    fn test_ramp_is_linear_not_nearest() {
        let ramp = ColorRamp::new(vec![[0, 0, 0], [200, 100, 50]]).unwrap();
        assert_eq!(ramp.sample(0.5), [100, 50, 25]);
        assert_eq!(ramp.sample(0.25), [50, 25, 13]);
    }

    #[test]
    fn test_ramp_needs_two_stops() {
        assert_eq!(ColorRamp::new(vec![[1, 2, 3]]).unwrap_err(), FieldError::TooFewStops { got: 1 });
    }

    #[test]
    fn test_theme_luminance_monotonic() {
        for theme in ColorTheme::ALL {
            let ramp = theme.ramp();
            let segments = ramp.stops().len() - 1;
            for seg in 0..segments {
                let mut last = f32::MIN;
                for k in 0..=4 {
                    let t = (seg as f32 + k as f32 / 4.0) / segments as f32;
                    let l = luminance(ramp.sample(t));
                    assert!(l + 0.5 >= last, "{theme:?} segment {seg} reverses at k={k}");
                    last = l;
                }
            }
        }
    }

    #[test]
    fn test_mask_policies() {
        assert_eq!(MaskPolicy::AlphaPassthrough.mask_alpha(200), 200);
        assert_eq!(MaskPolicy::AlphaInversion.mask_alpha(200), 55);
        assert_eq!(MaskPolicy::AlphaInversion.mask_alpha(0), 255);
    }

    #[test]
    fn test_alpha_and_stretch() {
        assert_eq!(alpha_for(0.0), 180);
        assert_eq!(alpha_for(1.0), 255);
        assert_eq!(stretch(0.5, 1.9), 0.5);
        assert_eq!(stretch(1.0, 1.9), 1.0);
        assert_eq!(stretch(0.0, 1.9), 0.0);
    }

    #[test]
    fn test_mask_containment() {
        let (grid, mask) = field(&mixed_samples(), 64);
        let pixels = colorize(&grid, DEFAULT_CONTRAST, &ColorTheme::Ember.ramp());
        for j in 0..64 {
            for i in 0..64 {
                let alpha = pixels.pixel(i, j)[3];
                if mask.contains(i, j) {
                    assert!(alpha >= 180);
                } else {
                    assert_eq!(alpha, 0);
                }
            }
        }
    }

    #[test]
    fn test_uniform_field_uses_range_floor() {
        let samples = [InterpolationSample::new(1.0, 1.0, 42.0), InterpolationSample::new(3.0, 3.0, 42.0)];
        let (grid, mask) = field(&samples, 48);
        let pixels = colorize(&grid, DEFAULT_CONTRAST, &ColorTheme::Viridis.ramp());

        // normalized = 0 everywhere → stretched = 0.5 - 0.5·1.9 clamps to 0
        let low = VIRIDIS_STOPS[0];
        for j in 0..48 {
            for i in 0..48 {
                if mask.contains(i, j) {
                    assert_eq!(pixels.pixel(i, j), [low[0], low[1], low[2], 180]);
                }
            }
        }
    }

    #[test]
    fn test_all_nan_grid_is_transparent() {
        let grid = ScalarGrid::nan(16);
        let pixels = colorize(&grid, DEFAULT_CONTRAST, &ColorTheme::Ocean.ramp());
        assert!(pixels.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_colorize_is_deterministic() {
        let (grid, _) = field(&mixed_samples(), 70);
        let ramp = ColorTheme::Ember.ramp();
        let a = colorize(&grid, DEFAULT_CONTRAST, &ramp);
        let b = colorize(&grid, DEFAULT_CONTRAST, &ramp);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_contrast_spreads_colors() {
        let (grid, _) = field(&mixed_samples(), 64);
        let ramp = ColorTheme::Ember.ramp();
        let flat = colorize(&grid, 1.0, &ramp);
        let punchy = colorize(&grid, 2.0, &ramp);

        let saturated = |g: &RgbaGrid| {
            g.as_bytes()
                .chunks_exact(4)
                .filter(|p| p[3] > 0)
                .filter(|p| [p[0], p[1], p[2]] == EMBER_STOPS[0] || [p[0], p[1], p[2]] == EMBER_STOPS[6])
                .count()
        };
        assert!(saturated(&punchy) > saturated(&flat));
    }
}
