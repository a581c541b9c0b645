//! Error types for rendering, template assets and the dashboard.

use brainfield_core::{ConfigError, FieldError};
use thiserror::Error;

/// Failure reported by a drawing backend.
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Backend-specific failure (e.g. a browser canvas call threw)
    #[error("Canvas backend error: {0}")]
    Backend(String),

    /// Pixel buffer length does not match its dimensions
    #[error("Pixel buffer of {len} bytes does not fit {width}x{height}")]
    BufferSize {
        /// Buffer length in bytes
        len: usize,
        /// Expected width
        width: u32,
        /// Expected height
        height: u32,
    },
}

/// Template image could not be used.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Image bytes could not be decoded
    #[error("Failed to decode template image: {0}")]
    Decode(#[from] image::ImageError),

    /// Decoded image has no pixels
    #[error("Template image is empty ({width}x{height})")]
    Empty {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Host could not deliver the image
    #[error("Template image unavailable: {reason}")]
    Unavailable {
        /// Host-reported reason
        reason: String,
    },
}

/// Error raised inside the frame pipeline.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Interpolation or colorization failed
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// The drawing backend failed
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Invalid pipeline configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Drawing surface too small to hold the brain box
    #[error("Surface {width}x{height} is too small to render")]
    SurfaceTooSmall {
        /// Surface width
        width: u32,
        /// Surface height
        height: u32,
    },
}

/// Error from dashboard bookkeeping.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// More devices than the dashboard shows
    #[error("Dashboard already shows the maximum of {max} devices")]
    TooManyDevices {
        /// Device limit
        max: usize,
    },

    /// No panel for this device
    #[error("Unknown device {device_id}")]
    UnknownDevice {
        /// Requested device id
        device_id: u32,
    },

    /// Panel construction failed
    #[error(transparent)]
    Render(#[from] RenderError),
}
