//! Pipeline configuration.
//!
//! Scalars the renderer consumes as opaque numbers: grid resolution,
//! contrast, clock speed, theme and the marker band table.

use serde::{Deserialize, Serialize};

use crate::bands::ActivityBands;
use crate::clock::DEFAULT_CLOCK_INCREMENT;
use crate::color::{ColorTheme, DEFAULT_CONTRAST};
use crate::coords::VerticalAxis;
use crate::error::ConfigError;
use crate::field::validate_grid_size;
use crate::mask::DEFAULT_MASK_CACHE_CAPACITY;

/// Default grid resolution (cells per side)
pub const DEFAULT_GRID_SIZE: usize = 70;

/// Rendering pipeline configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Grid resolution; cost grows with the square of this value
    pub grid_size: usize,
    /// Contrast stretch around the midpoint
    pub contrast: f32,
    /// Animation phase increment per frame
    pub clock_increment: f64,
    /// Color theme (stops and mask policy)
    pub theme: ColorTheme,
    /// Interpolation-space vertical axis policy
    pub vertical_axis: VerticalAxis,
    /// Number of grid sizes kept in the mask cache
    pub mask_cache_capacity: usize,
    /// Marker band table
    pub bands: ActivityBands,
}

impl PipelineConfig {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_grid_size(self.grid_size).map_err(ConfigError::GridSize)?;
        if !self.contrast.is_finite() || self.contrast <= 0.0 {
            return Err(ConfigError::InvalidContrast { contrast: self.contrast });
        }
        if !self.clock_increment.is_finite() || self.clock_increment <= 0.0 {
            return Err(ConfigError::InvalidClockIncrement { increment: self.clock_increment });
        }
        if self.mask_cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        Ok(())
    }

    /// Same configuration with a different theme.
    #[must_use]
    pub fn with_theme(mut self, theme: ColorTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Same configuration with a different grid size.
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            contrast: DEFAULT_CONTRAST,
            clock_increment: DEFAULT_CLOCK_INCREMENT,
            theme: ColorTheme::default(),
            vertical_axis: VerticalAxis::default(),
            mask_cache_capacity: DEFAULT_MASK_CACHE_CAPACITY,
            bands: ActivityBands::default(),
        }
    }
}
