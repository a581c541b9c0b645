//! Brainfield Core - `no_std` activity-field pipeline
//!
//! This crate provides the data model and the numerical core of the brainfield
//! dashboard: electrode geometry, coordinate mapping, inverse-distance-weighted
//! field interpolation, elliptical brain masks and the color ramps that turn a
//! field into RGBA pixels. It has no rendering backend and no I/O; the
//! `brainfield-render` crate composites its output onto a canvas.
//!
//! # Modules
//!
//! - [`types`]: Electrode table, channel readings and device snapshots
//! - [`coords`]: Template, interpolation and canvas coordinate mapping
//! - [`field`]: Interpolation samples, scalar grids and the IDW interpolator
//! - [`mask`]: Elliptical brain mask and its bounded memo cache
//! - [`color`]: Color ramps, themes, mask policies and the colorizer
//! - [`bands`]: Activity bands for electrode markers
//! - [`clock`]: Animation clock and pulse factors
//! - [`config`]: Pipeline configuration
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```rust
//! use brainfield_core::{
//!     build_samples, colorize, interpolate, ChannelReading, ColorTheme, CoordinateMapper,
//!     DeviceSnapshot, MaskCache,
//! };
//!
//! let snapshot = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(4, 120)]);
//! let mapper = CoordinateMapper::default();
//! let samples = build_samples(&snapshot, &mapper, 0.0);
//!
//! let mut masks = MaskCache::new(4);
//! let grid = interpolate(&samples, &masks.get(64), &mapper).unwrap();
//! let pixels = colorize(&grid, 1.9, &ColorTheme::Ember.ramp());
//! assert_eq!(pixels.size(), 64);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bands;
pub mod clock;
pub mod color;
pub mod config;
pub mod coords;
pub mod error;
pub mod field;
pub mod mask;
pub mod types;

// Re-export commonly used types at crate root
pub use bands::{ActivityBand, ActivityBands};
pub use clock::{changed_intensity, glow_strength, AnimationClock, PulseFactor};
pub use color::{colorize, ColorRamp, ColorTheme, MaskPolicy, Rgb, RgbaGrid};
pub use config::PipelineConfig;
pub use coords::{brain_rect, CoordinateMapper, Rect, VerticalAxis};
pub use error::{ConfigError, FieldError};
pub use field::{build_samples, interpolate, InterpolationSample, ScalarGrid};
pub use mask::{BrainMask, MaskCache};
pub use types::{
    electrode, ChannelReading, DeviceSnapshot, ElectrodePosition, ELECTRODES, ELECTRODE_COUNT,
    MAX_DEVICES,
};
