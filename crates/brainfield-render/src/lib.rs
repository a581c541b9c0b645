//! Brainfield Render - canvas compositing for the activity dashboard
//!
//! This crate turns the numerical output of `brainfield-core` into frames:
//! - [`canvas`]: the `Canvas2d` capability trait every backend implements
//! - [`raster`]: software raster backend (offscreen buffers, headless frames)
//! - [`template`]: fill/outline template images and their mask policies
//! - [`silhouette`]: clipping the colored field to the brain silhouette
//! - [`markers`]: electrode glyphs with glow and pulse animation
//! - [`panel`]: per-device frame orchestrator and its state machine
//! - [`dashboard`]: up to 12 panels driven by one snapshot feed
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use brainfield_core::{ChannelReading, DeviceSnapshot, PipelineConfig};
//! use brainfield_render::{synthetic_templates, BrainPanel, RasterCanvas};
//!
//! let config = PipelineConfig::default();
//! let mut panel = BrainPanel::new(0, config.clone(), 0.0).unwrap();
//! panel.mount();
//! panel.templates_decoded(Ok(synthetic_templates(256, 256, config.theme.mask_policy())));
//!
//! let snapshot = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(4, 120)]);
//! panel.submit_snapshot(Arc::new(snapshot));
//!
//! let mut canvas = RasterCanvas::new(320, 320);
//! let report = panel.render_frame(&mut canvas);
//! assert!(report.field_computed);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod canvas;
pub mod dashboard;
pub mod error;
pub mod markers;
pub mod panel;
pub mod raster;
pub mod silhouette;
pub mod template;

pub use canvas::{Canvas2d, CompositeMode, RadialGradient, Rgba8, TextAlign, TextStyle};
pub use dashboard::{seed_for_device, Dashboard};
pub use error::{CanvasError, DashboardError, RenderError, TemplateError};
pub use markers::{draw_markers, layout_markers, marker_scale, ElectrodeMarker};
pub use panel::{BrainPanel, Fallback, FrameReport, PanelState};
pub use raster::{RasterCanvas, TextRun};
pub use silhouette::{apply_mask, composite_active, draw_inactive, grid_to_image};
pub use template::{synthetic_templates, TemplateAsset, TemplateAssets, TemplateSet};
