//! Coordinate mapping
//!
//! Electrode positions and mask geometry are authored in template space.
//! The interpolator works in a fixed `[0, 4] × [0, 4]` square and the
//! renderer works in canvas pixels; both mappings are pure functions of the
//! template coordinates.

use serde::{Deserialize, Serialize};

use crate::types::{TEMPLATE_MAX_X, TEMPLATE_MAX_Y, TEMPLATE_MIN_X, TEMPLATE_MIN_Y};

/// Side length of the interpolation square
pub const INTERPOLATION_EXTENT: f32 = 4.0;

/// Fraction of the canvas covered by the brain bounding box
pub const BRAIN_FOOTPRINT: f32 = 0.8;

/// Margin on each side of the brain bounding box, as a fraction of the canvas
pub const BRAIN_MARGIN: f32 = 0.1;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Square around a point.
    #[inline]
    pub fn around(cx: f32, cy: f32, radius: f32) -> Self {
        Self::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0)
    }
}

/// Orientation of the interpolation-space `v` axis.
///
/// Whichever policy is chosen, [`CoordinateMapper`] applies it to sample
/// construction and to grid-cell coordinates alike, so the rendered field
/// is identical under both; only the numeric `v` values differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAxis {
    /// `v` grows with template y (top of the template is `v = 0`)
    #[default]
    Downward,
    /// `v` grows opposite to template y (top of the template is `v = 4`)
    Upward,
}

/// Maps template coordinates into interpolation and canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    vertical: VerticalAxis,
}

impl CoordinateMapper {
    /// Create a mapper with the given vertical axis policy.
    pub const fn new(vertical: VerticalAxis) -> Self {
        Self { vertical }
    }

    /// Vertical axis policy in use.
    pub const fn vertical_axis(&self) -> VerticalAxis {
        self.vertical
    }

    /// Template space → `[0, 4] × [0, 4]` interpolation space.
    pub fn to_interpolation_space(&self, template_x: f32, template_y: f32) -> (f32, f32) {
        let nx = (template_x - TEMPLATE_MIN_X) / (TEMPLATE_MAX_X - TEMPLATE_MIN_X);
        let ny = (template_y - TEMPLATE_MIN_Y) / (TEMPLATE_MAX_Y - TEMPLATE_MIN_Y);
        (nx * INTERPOLATION_EXTENT, self.orient(ny * INTERPOLATION_EXTENT))
    }

    /// Interpolation-space coordinates of grid cell `(i, j)` (column, row).
    ///
    /// Row 0 is the top of the rendered field regardless of the axis policy.
    pub fn grid_cell(&self, i: usize, j: usize, size: usize) -> (f32, f32) {
        let last = size.saturating_sub(1).max(1) as f32;
        let u = i as f32 / last * INTERPOLATION_EXTENT;
        let v = j as f32 / last * INTERPOLATION_EXTENT;
        (u, self.orient(v))
    }

    /// Template space → canvas pixels inside the centered brain box.
    pub fn to_canvas_space(&self, template_x: f32, template_y: f32, width: f32, height: f32) -> (f32, f32) {
        let rect = brain_rect(width, height);
        let nx = (template_x - TEMPLATE_MIN_X) / (TEMPLATE_MAX_X - TEMPLATE_MIN_X);
        let ny = (template_y - TEMPLATE_MIN_Y) / (TEMPLATE_MAX_Y - TEMPLATE_MIN_Y);
        (rect.x + nx * rect.width, rect.y + ny * rect.height)
    }

    #[inline]
    fn orient(&self, v: f32) -> f32 {
        match self.vertical {
            VerticalAxis::Downward => v,
            VerticalAxis::Upward => INTERPOLATION_EXTENT - v,
        }
    }
}

/// Brain bounding box: 80% of the canvas, centered.
pub fn brain_rect(width: f32, height: f32) -> Rect {
    Rect::new(
        width * BRAIN_MARGIN,
        height * BRAIN_MARGIN,
        width * BRAIN_FOOTPRINT,
        height * BRAIN_FOOTPRINT,
    )
}
