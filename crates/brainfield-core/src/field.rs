//! Scalar field interpolation
//!
//! Sparse per-electrode activity is spread over a dense grid with
//! inverse-distance weighting (power 2). Four synthetic corner samples keep
//! the extrapolation near the edges of the mask from running away.

use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::clock::changed_intensity;
use crate::coords::CoordinateMapper;
use crate::error::FieldError;
use crate::mask::BrainMask;
use crate::types::{DeviceSnapshot, TEMPLATE_MAX_X, TEMPLATE_MAX_Y, TEMPLATE_MIN_X, TEMPLATE_MIN_Y};

/// Distances below this snap a cell to the sample's value
pub const SNAP_EPSILON: f32 = 1e-4;

/// Corner samples carry this fraction of the average observed activity
pub const CORNER_ACTIVITY_RATIO: f32 = 0.8;

/// Smallest supported grid size
pub const MIN_GRID_SIZE: usize = 8;

/// Largest supported grid size
pub const MAX_GRID_SIZE: usize = 256;

/// Template-space corners used for the synthetic boundary samples
const TEMPLATE_CORNERS: [(f32, f32); 4] = [
    (TEMPLATE_MIN_X, TEMPLATE_MIN_Y),
    (TEMPLATE_MAX_X, TEMPLATE_MIN_Y),
    (TEMPLATE_MIN_X, TEMPLATE_MAX_Y),
    (TEMPLATE_MAX_X, TEMPLATE_MAX_Y),
];

/// One known value in interpolation space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterpolationSample {
    /// Horizontal position in `[0, 4]`
    pub x: f32,
    /// Vertical position in `[0, 4]`
    pub y: f32,
    /// Activity value
    pub value: f32,
}

impl InterpolationSample {
    /// Create a sample.
    #[inline]
    pub const fn new(x: f32, y: f32, value: f32) -> Self {
        Self { x, y, value }
    }
}

/// Dense `N × N` field, row-major, NaN outside the mask.
#[derive(Clone, Debug)]
pub struct ScalarGrid {
    size: usize,
    cells: Vec<f32>,
}

impl ScalarGrid {
    /// A grid with every cell NaN.
    pub fn nan(size: usize) -> Self {
        Self { size, cells: vec![f32::NAN; size * size] }
    }

    /// Cells per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at cell `(i, j)` (column, row); NaN outside the mask or grid.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        if i < self.size && j < self.size {
            self.cells[j * self.size + i]
        } else {
            f32::NAN
        }
    }

    /// Raw cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Minimum and maximum over finite cells; `None` if every cell is NaN.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.cells.iter().copied().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Check a grid size against the supported range.
pub fn validate_grid_size(size: usize) -> Result<(), FieldError> {
    if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(FieldError::InvalidGridSize { size, min: MIN_GRID_SIZE, max: MAX_GRID_SIZE })
    }
}

/// Inverse-distance-weighted value at `(u, v)`.
///
/// Returns the value of the first sample closer than [`SNAP_EPSILON`]
/// verbatim. `samples` must be non-empty.
pub fn idw_at(samples: &[InterpolationSample], u: f32, v: f32) -> f32 {
    let mut sum_weights = 0.0f32;
    let mut sum_values = 0.0f32;

    for sample in samples {
        let dx = u - sample.x;
        let dy = v - sample.y;
        let dist_sq = dx * dx + dy * dy;
        if libm::sqrtf(dist_sq) < SNAP_EPSILON {
            return sample.value;
        }
        let weight = 1.0 / dist_sq;
        sum_weights += weight;
        sum_values += weight * sample.value;
    }

    sum_values / sum_weights
}

/// Interpolate `samples` over every cell inside `mask`.
///
/// Cells outside the mask are NaN and never enter the distance loop, so the
/// cost is `O(inside cells × samples)`.
///
/// # Errors
///
/// [`FieldError::NoSamples`] when `samples` is empty and
/// [`FieldError::InvalidGridSize`] for a mask outside the supported sizes.
pub fn interpolate(
    samples: &[InterpolationSample],
    mask: &BrainMask,
    mapper: &CoordinateMapper,
) -> Result<ScalarGrid, FieldError> {
    if samples.is_empty() {
        return Err(FieldError::NoSamples);
    }
    let size = mask.size();
    validate_grid_size(size)?;

    let mut grid = ScalarGrid::nan(size);
    for j in 0..size {
        for i in 0..size {
            if !mask.contains(i, j) {
                continue;
            }
            let (u, v) = mapper.grid_cell(i, j, size);
            grid.cells[j * size + i] = idw_at(samples, u, v);
        }
    }
    Ok(grid)
}

/// Build the sample list for one snapshot.
///
/// Active channels contribute their activity at their electrode position;
/// channels flagged `changed` are brightened by the pulse phase. Four corner
/// samples at 0.8× the average activity are always appended, so the list is
/// never empty.
pub fn build_samples(
    snapshot: &DeviceSnapshot,
    mapper: &CoordinateMapper,
    pulse_time: f64,
) -> Vec<InterpolationSample> {
    let mut samples = Vec::with_capacity(snapshot.channels.len() + TEMPLATE_CORNERS.len());
    let mut total = 0.0f32;
    let mut count = 0usize;

    for (reading, position) in snapshot.active_readings() {
        let activity = reading.activity();
        total += activity;
        count += 1;

        let value = if reading.changed { activity * changed_intensity(pulse_time) } else { activity };
        let (x, y) = mapper.to_interpolation_space(position.template_x, position.template_y);
        samples.push(InterpolationSample::new(x, y, value));
    }

    let average = if count == 0 { 0.0 } else { total / count as f32 };
    let corner_value = average * CORNER_ACTIVITY_RATIO;
    for (tx, ty) in TEMPLATE_CORNERS {
        let (x, y) = mapper.to_interpolation_space(tx, ty);
        samples.push(InterpolationSample::new(x, y, corner_value));
    }

    samples
}
