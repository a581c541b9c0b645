//! Per-device frame orchestrator
//!
//! A [`BrainPanel`] owns everything one dashboard tile needs between frames:
//! its animation clock, mask cache, decoded templates and the latest
//! snapshot. The host drives it through a small state machine:
//!
//! ```text
//! Unmounted --mount--> Loading --templates_decoded--> Ready
//!     ^                   |                             |
//!     +------unmount------+-------------unmount---------+
//! ```
//!
//! Template results that arrive after `unmount` are ignored.

use std::sync::Arc;

use brainfield_core::{
    brain_rect, build_samples, colorize, interpolate, AnimationClock, ColorRamp, CoordinateMapper,
    DeviceSnapshot, MaskCache, PipelineConfig, Rect,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::canvas::{Canvas2d, RadialGradient, Rgba8, TextStyle};
use crate::error::{RenderError, TemplateError};
use crate::markers::{draw_markers, layout_markers, marker_scale};
use crate::silhouette::{composite_active, draw_inactive, grid_to_image};
use crate::template::{TemplateAssets, TemplateSet};

const BACKGROUND_INNER: Rgba8 = Rgba8::new(26, 26, 46, 255);
const BACKGROUND_OUTER: Rgba8 = Rgba8::new(8, 8, 18, 255);
const LABEL_COLOR: Rgba8 = Rgba8::new(226, 232, 240, 255);
const MUTED_COLOR: Rgba8 = Rgba8::new(148, 163, 184, 255);
const ERROR_COLOR: Rgba8 = Rgba8::new(248, 113, 113, 255);

/// Lifecycle state of a panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum PanelState {
    /// Not attached to a surface
    #[default]
    Unmounted,
    /// Attached, templates still decoding
    Loading,
    /// Templates resolved (decoded or unavailable)
    Ready,
}

/// Substitute frame drawn instead of the full pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Fallback {
    /// Text-only frame while templates decode
    Loading,
    /// Ellipse outline and an error label after a pipeline failure
    RenderError,
}

/// What one frame did.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// Device shown by the panel
    pub device_id: u32,
    /// Panel state during the frame
    pub state: PanelState,
    /// Animation phase used
    pub pulse_time: f64,
    /// Field was interpolated and composited
    pub field_computed: bool,
    /// Electrode markers drawn
    pub markers_drawn: usize,
    /// Active channels in the snapshot
    pub active_channels: usize,
    /// Fallback drawn instead of the pipeline, if any
    pub fallback: Option<Fallback>,
}

/// One brain tile.
#[derive(Debug)]
pub struct BrainPanel {
    device_id: u32,
    config: PipelineConfig,
    mapper: CoordinateMapper,
    ramp: ColorRamp,
    masks: MaskCache,
    clock: AnimationClock,
    state: PanelState,
    assets: Option<TemplateAssets>,
    snapshot: Option<Arc<DeviceSnapshot>>,
}

impl BrainPanel {
    /// Create an unmounted panel with its clock at `seed`.
    ///
    /// # Errors
    ///
    /// [`RenderError::Config`] for an invalid configuration.
    pub fn new(device_id: u32, config: PipelineConfig, seed: f64) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            device_id,
            mapper: CoordinateMapper::new(config.vertical_axis),
            ramp: config.theme.ramp(),
            masks: MaskCache::new(config.mask_cache_capacity),
            clock: AnimationClock::new(seed, config.clock_increment),
            config,
            state: PanelState::Unmounted,
            assets: None,
            snapshot: None,
        })
    }

    /// Device shown by this panel.
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Animation clock.
    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Latest submitted snapshot.
    pub fn snapshot(&self) -> Option<&Arc<DeviceSnapshot>> {
        self.snapshot.as_ref()
    }

    /// Resolved templates, once ready.
    pub fn assets(&self) -> Option<&TemplateAssets> {
        self.assets.as_ref()
    }

    /// Attach to a surface and start waiting for templates.
    pub fn mount(&mut self) {
        if self.state == PanelState::Unmounted {
            debug!(device_id = self.device_id, "Panel mounted");
            self.state = PanelState::Loading;
        }
    }

    /// Deliver the template decode result.
    ///
    /// A failed decode still moves the panel to `Ready`, without a
    /// silhouette. Returns `false` if the result was ignored because the
    /// panel is not loading (e.g. it was unmounted meanwhile).
    pub fn templates_decoded(&mut self, result: Result<TemplateSet, TemplateError>) -> bool {
        if self.state != PanelState::Loading {
            debug!(device_id = self.device_id, state = ?self.state, "Ignoring late template result");
            return false;
        }
        let assets = match result {
            Ok(set) => TemplateAssets::Available(set),
            Err(e) => {
                warn!(device_id = self.device_id, error = %e, "Template decode failed, drawing unmasked field");
                TemplateAssets::Unavailable
            }
        };
        self.assets = Some(assets);
        self.state = PanelState::Ready;
        debug!(device_id = self.device_id, "Panel ready");
        true
    }

    /// Detach from the surface and drop decoded templates.
    pub fn unmount(&mut self) {
        if self.state != PanelState::Unmounted {
            debug!(device_id = self.device_id, "Panel unmounted");
        }
        self.state = PanelState::Unmounted;
        self.assets = None;
    }

    /// Replace the snapshot shown on following frames.
    pub fn submit_snapshot(&mut self, snapshot: Arc<DeviceSnapshot>) {
        self.snapshot = Some(snapshot);
    }

    /// Advance the clock once and render the latest snapshot.
    pub fn render_frame<C: Canvas2d + ?Sized>(&mut self, canvas: &mut C) -> FrameReport {
        let pulse_time = self.clock.advance();
        let snapshot = self.snapshot.clone();
        self.render(snapshot.as_deref(), pulse_time, canvas)
    }

    /// Render one frame for `snapshot` at `pulse_time`.
    ///
    /// Never fails: pipeline errors are logged and replaced by the error
    /// fallback frame.
    pub fn render<C: Canvas2d + ?Sized>(
        &mut self,
        snapshot: Option<&DeviceSnapshot>,
        pulse_time: f64,
        canvas: &mut C,
    ) -> FrameReport {
        let mut report = FrameReport {
            device_id: self.device_id,
            state: self.state,
            pulse_time,
            active_channels: snapshot.map_or(0, DeviceSnapshot::active_count),
            ..FrameReport::default()
        };

        match self.state {
            PanelState::Unmounted => {
                trace!(device_id = self.device_id, "Skipping frame for unmounted panel");
            }
            PanelState::Loading => {
                if let Err(e) = self.draw_loading(canvas) {
                    warn!(device_id = self.device_id, error = %e, "Loading frame failed");
                }
                report.fallback = Some(Fallback::Loading);
            }
            PanelState::Ready => match self.draw_ready(snapshot, pulse_time, canvas) {
                Ok((field_computed, markers_drawn)) => {
                    report.field_computed = field_computed;
                    report.markers_drawn = markers_drawn;
                }
                Err(e) => {
                    warn!(device_id = self.device_id, error = %e, "Render pipeline failed");
                    if let Err(e) = self.draw_error(canvas) {
                        warn!(device_id = self.device_id, error = %e, "Error fallback failed");
                    }
                    report.fallback = Some(Fallback::RenderError);
                }
            },
        }

        report
    }

    fn draw_ready<C: Canvas2d + ?Sized>(
        &mut self,
        snapshot: Option<&DeviceSnapshot>,
        pulse_time: f64,
        canvas: &mut C,
    ) -> Result<(bool, usize), RenderError> {
        let (width, height) = (canvas.width(), canvas.height());
        let rect = brain_rect(width as f32, height as f32);
        if rect.width < 1.0 || rect.height < 1.0 {
            return Err(RenderError::SurfaceTooSmall { width, height });
        }

        canvas.reset_state();
        canvas.clear()?;
        draw_background(canvas)?;

        let active = snapshot.filter(|s| s.is_active && s.active_count() > 0);
        let templates = self.assets.as_ref().and_then(TemplateAssets::set);

        let field_computed = if let Some(snapshot) = active {
            let samples = build_samples(snapshot, &self.mapper, pulse_time);
            let mask = self.masks.get(self.config.grid_size);
            let grid = interpolate(&samples, &mask, &self.mapper)?;
            let colored = grid_to_image(colorize(&grid, self.config.contrast, &self.ramp))?;
            composite_active(canvas, &colored, templates, rect)?;
            true
        } else {
            draw_inactive(canvas, templates, rect)?;
            false
        };

        self.draw_label(canvas, active.map_or(0, DeviceSnapshot::active_count))?;

        let markers_drawn = match active {
            Some(snapshot) => {
                let markers =
                    layout_markers(Some(snapshot), &self.config.bands, &self.mapper, pulse_time, width, height);
                draw_markers(canvas, &markers, pulse_time)?
            }
            None => 0,
        };

        trace!(device_id = self.device_id, field_computed, markers_drawn, "Frame rendered");
        Ok((field_computed, markers_drawn))
    }

    fn draw_label<C: Canvas2d + ?Sized>(&self, canvas: &mut C, active_channels: usize) -> Result<(), RenderError> {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let size = (16.0 * marker_scale(canvas.width(), canvas.height())).max(10.0);

        canvas.reset_state();
        let title = TextStyle { bold: true, ..TextStyle::centered(size, LABEL_COLOR) };
        canvas.fill_text(&format!("Brain {}", self.device_id), w * 0.5, h * 0.07, &title)?;

        let status = if active_channels == 0 {
            "No activity".to_string()
        } else {
            format!("{active_channels} active")
        };
        canvas.fill_text(&status, w * 0.5, h * 0.96, &TextStyle::centered(size * 0.8, MUTED_COLOR))?;
        Ok(())
    }

    fn draw_loading<C: Canvas2d + ?Sized>(&self, canvas: &mut C) -> Result<(), RenderError> {
        canvas.reset_state();
        canvas.clear()?;
        draw_background(canvas)?;
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        canvas.fill_text("Loading\u{2026}", w * 0.5, h * 0.5, &TextStyle::centered(14.0, MUTED_COLOR))?;
        Ok(())
    }

    fn draw_error<C: Canvas2d + ?Sized>(&self, canvas: &mut C) -> Result<(), RenderError> {
        canvas.reset_state();
        canvas.clear()?;
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let rect = brain_rect(w, h);
        let (cx, cy) = rect.center();
        canvas.stroke_ellipse(cx, cy, rect.width * 0.45, rect.height * 0.48, 2.0, MUTED_COLOR)?;
        canvas.fill_text("Render Error", cx, cy, &TextStyle::centered(14.0, ERROR_COLOR))?;
        Ok(())
    }
}

fn draw_background<C: Canvas2d + ?Sized>(canvas: &mut C) -> Result<(), RenderError> {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    let gradient = RadialGradient {
        center: (w * 0.5, h * 0.5),
        inner_radius: 0.0,
        outer_radius: w.max(h) * 0.75,
        inner: BACKGROUND_INNER,
        outer: BACKGROUND_OUTER,
    };
    canvas.fill_radial_gradient(Rect::new(0.0, 0.0, w, h), &gradient)?;
    Ok(())
}
