//! Multi-device dashboard
//!
//! Holds one [`BrainPanel`] per device (at most [`MAX_DEVICES`]) and routes
//! snapshot batches to them. Snapshots may arrive at any cadence; each panel
//! keeps the latest one and renders it on the next frame.

use std::collections::BTreeMap;
use std::sync::Arc;

use brainfield_core::{DeviceSnapshot, PipelineConfig, MAX_DEVICES};
use tracing::{debug, info};

use crate::canvas::Canvas2d;
use crate::error::{DashboardError, RenderError, TemplateError};
use crate::panel::{BrainPanel, FrameReport};
use crate::template::TemplateSet;

/// Deterministic clock seed for a device, spreading panels over one pulse period.
pub fn seed_for_device(device_id: u32) -> f64 {
    // SplitMix32-style scramble
    let mut z = device_id.wrapping_add(0x9E37_79B9);
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^= z >> 16;
    f64::from(z) / f64::from(u32::MAX) * std::f64::consts::TAU
}

// ============================================================================
// Dashboard
// ============================================================================

/// Up to 12 brain panels keyed by device id.
#[derive(Debug)]
pub struct Dashboard {
    config: PipelineConfig,
    templates: Option<TemplateSet>,
    panels: BTreeMap<u32, BrainPanel>,
}

impl Dashboard {
    /// Create an empty dashboard.
    ///
    /// `templates` are handed to every panel as it mounts; `None` renders
    /// without a silhouette.
    ///
    /// # Errors
    ///
    /// Invalid configuration.
    pub fn new(config: PipelineConfig, templates: Option<TemplateSet>) -> Result<Self, DashboardError> {
        config.validate().map_err(RenderError::from)?;
        Ok(Self { config, templates, panels: BTreeMap::new() })
    }

    /// Add and mount a panel for `device_id`, or return the existing one.
    ///
    /// # Errors
    ///
    /// [`DashboardError::TooManyDevices`] when the dashboard is full.
    pub fn add_device(&mut self, device_id: u32) -> Result<&mut BrainPanel, DashboardError> {
        if !self.panels.contains_key(&device_id) {
            if self.panels.len() >= MAX_DEVICES {
                return Err(DashboardError::TooManyDevices { max: MAX_DEVICES });
            }
            let mut panel = BrainPanel::new(device_id, self.config.clone(), seed_for_device(device_id))?;
            panel.mount();
            let decoded = self.templates.clone().ok_or_else(|| TemplateError::Unavailable {
                reason: "no template images configured".to_string(),
            });
            panel.templates_decoded(decoded);
            info!(device_id, panels = self.panels.len() + 1, "Device added to dashboard");
            self.panels.insert(device_id, panel);
        }
        self.panels.get_mut(&device_id).ok_or(DashboardError::UnknownDevice { device_id })
    }

    /// Unmount and remove a panel.
    pub fn remove_device(&mut self, device_id: u32) -> Option<BrainPanel> {
        let mut panel = self.panels.remove(&device_id)?;
        panel.unmount();
        info!(device_id, "Device removed from dashboard");
        Some(panel)
    }

    /// Route a batch of snapshots to their panels, adding panels for new devices.
    ///
    /// Returns the number of snapshots applied.
    ///
    /// # Errors
    ///
    /// [`DashboardError::TooManyDevices`] for the first snapshot that would
    /// need a 13th panel; snapshots before it are already applied.
    pub fn apply_snapshots<I>(&mut self, snapshots: I) -> Result<usize, DashboardError>
    where
        I: IntoIterator<Item = Arc<DeviceSnapshot>>,
    {
        let mut applied = 0;
        for snapshot in snapshots {
            let panel = self.add_device(snapshot.device_id)?;
            panel.submit_snapshot(snapshot);
            applied += 1;
        }
        debug!(applied, "Applied snapshot batch");
        Ok(applied)
    }

    /// Render one frame of a device's panel.
    ///
    /// # Errors
    ///
    /// [`DashboardError::UnknownDevice`] if the device has no panel.
    pub fn render_device<C: Canvas2d + ?Sized>(
        &mut self,
        device_id: u32,
        canvas: &mut C,
    ) -> Result<FrameReport, DashboardError> {
        let panel = self.panels.get_mut(&device_id).ok_or(DashboardError::UnknownDevice { device_id })?;
        Ok(panel.render_frame(canvas))
    }

    /// Panel for a device.
    pub fn panel(&self, device_id: u32) -> Option<&BrainPanel> {
        self.panels.get(&device_id)
    }

    /// Device ids in ascending order.
    pub fn device_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.panels.keys().copied()
    }

    /// Number of panels.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// No panels yet.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
