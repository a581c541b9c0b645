//! Error types for the brainfield pipeline
//!
//! These errors work in `no_std` environments and carry enough context to be
//! logged by the renderer without heap allocation.

use core::fmt;

// ============================================================================
// Field Errors
// ============================================================================

/// Errors from field interpolation and colorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The interpolator was called without any samples
    NoSamples,
    /// Grid resolution outside the supported range
    InvalidGridSize {
        /// Requested size (cells per side)
        size: usize,
        /// Smallest supported size
        min: usize,
        /// Largest supported size
        max: usize,
    },
    /// A color ramp needs at least two stops
    TooFewStops {
        /// Number of stops supplied
        got: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSamples => write!(f, "Interpolation requires at least one sample"),
            Self::InvalidGridSize { size, min, max } => {
                write!(f, "Invalid grid size {size}: must be within {min}..={max}")
            }
            Self::TooFewStops { got } => {
                write!(f, "Color ramp needs at least 2 stops, got {got}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FieldError {}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors from validating a [`PipelineConfig`](crate::config::PipelineConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Grid resolution outside the supported range
    GridSize(FieldError),
    /// Contrast must be finite and positive
    InvalidContrast {
        /// Rejected value
        contrast: f32,
    },
    /// Clock increment must be finite and positive
    InvalidClockIncrement {
        /// Rejected value
        increment: f64,
    },
    /// The mask cache must hold at least one mask
    ZeroCacheCapacity,
    /// Band table is empty
    EmptyBands,
    /// The first band must start at zero transitions
    FirstBandNotZero {
        /// Threshold of the first band
        threshold: u32,
    },
    /// Band thresholds must be strictly increasing
    UnorderedBands {
        /// Index of the offending band
        index: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridSize(e) => write!(f, "{e}"),
            Self::InvalidContrast { contrast } => {
                write!(f, "Contrast must be finite and > 0, got {contrast}")
            }
            Self::InvalidClockIncrement { increment } => {
                write!(f, "Clock increment must be finite and > 0, got {increment}")
            }
            Self::ZeroCacheCapacity => write!(f, "Mask cache capacity must be at least 1"),
            Self::EmptyBands => write!(f, "Activity band table is empty"),
            Self::FirstBandNotZero { threshold } => {
                write!(f, "First activity band must start at 0, starts at {threshold}")
            }
            Self::UnorderedBands { index } => {
                write!(f, "Activity band {index} does not raise the threshold")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
