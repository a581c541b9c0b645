//! Core types for the brainfield dashboard
//!
//! This module provides:
//! - The fixed 24-electrode layout shared by every device
//! - Per-channel readings produced once per polling tick
//! - Per-device snapshots handed to the renderer

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

// ============================================================================
// Template Space
// ============================================================================

/// Left edge of the template coordinate domain
pub const TEMPLATE_MIN_X: f32 = 12.0;

/// Right edge of the template coordinate domain
pub const TEMPLATE_MAX_X: f32 = 55.0;

/// Top edge of the template coordinate domain
pub const TEMPLATE_MIN_Y: f32 = 24.0;

/// Bottom edge of the template coordinate domain
pub const TEMPLATE_MAX_Y: f32 = 86.0;

/// Number of electrodes per device
pub const ELECTRODE_COUNT: usize = 24;

/// Maximum number of devices shown on one dashboard
pub const MAX_DEVICES: usize = 12;

// ============================================================================
// Electrode Geometry
// ============================================================================

/// Fixed position of one electrode in template space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ElectrodePosition {
    /// Channel id (0-23)
    pub channel_id: u8,
    /// Display label (e.g. "LF1", "RO3")
    pub name: &'static str,
    /// X position in template space
    pub template_x: f32,
    /// Y position in template space
    pub template_y: f32,
}

const fn pos(channel_id: u8, name: &'static str, template_x: f32, template_y: f32) -> ElectrodePosition {
    ElectrodePosition { channel_id, name, template_x, template_y }
}

/// Electrode layout: left hemisphere on channels 0-11, right on 12-23.
///
/// Rows run frontal, central, parietal, occipital; within a row the index
/// counts from the lateral edge toward the midline.
pub const ELECTRODES: [ElectrodePosition; ELECTRODE_COUNT] = [
    // Left hemisphere
    pos(0, "LF1", 25.0, 33.0),
    pos(1, "LF2", 29.0, 33.0),
    pos(2, "LF3", 32.5, 33.0),
    pos(3, "LC1", 20.5, 46.0),
    pos(4, "LC2", 26.0, 46.0),
    pos(5, "LC3", 31.5, 46.0),
    pos(6, "LP1", 20.0, 60.0),
    pos(7, "LP2", 25.5, 60.0),
    pos(8, "LP3", 31.5, 60.0),
    pos(9, "LO1", 23.0, 74.0),
    pos(10, "LO2", 27.5, 74.0),
    pos(11, "LO3", 32.0, 74.0),
    // Right hemisphere (mirrored about x = 33.5)
    pos(12, "RF1", 42.0, 33.0),
    pos(13, "RF2", 38.0, 33.0),
    pos(14, "RF3", 34.5, 33.0),
    pos(15, "RC1", 46.5, 46.0),
    pos(16, "RC2", 41.0, 46.0),
    pos(17, "RC3", 35.5, 46.0),
    pos(18, "RP1", 47.0, 60.0),
    pos(19, "RP2", 41.5, 60.0),
    pos(20, "RP3", 35.5, 60.0),
    pos(21, "RO1", 44.0, 74.0),
    pos(22, "RO2", 39.5, 74.0),
    pos(23, "RO3", 35.0, 74.0),
];

/// Look up the electrode for a channel id.
#[inline]
pub fn electrode(channel_id: u8) -> Option<&'static ElectrodePosition> {
    ELECTRODES.get(usize::from(channel_id))
}

// ============================================================================
// Channel Readings
// ============================================================================

/// One channel's activity for the latest polling tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelReading {
    /// Channel id (0-23)
    pub channel_id: u8,
    /// Channel label
    pub name: String,
    /// Current logic level (0 or 1)
    pub current_state: u8,
    /// Transitions counted during this tick
    pub transitions_this_tick: u32,
    /// Transitions counted since capture start
    pub total_transitions: u32,
    /// Activity increased this tick (drives the pulse animation)
    pub changed: bool,
}

impl ChannelReading {
    /// Create a quiet reading with the given total and the table label.
    #[must_use]
    pub fn new(channel_id: u8, total_transitions: u32) -> Self {
        let name = electrode(channel_id).map(|e| String::from(e.name)).unwrap_or_default();
        Self {
            channel_id,
            name,
            current_state: 0,
            transitions_this_tick: 0,
            total_transitions,
            changed: false,
        }
    }

    /// Mark this reading as having transitioned this tick.
    #[must_use]
    pub fn with_change(mut self, transitions_this_tick: u32) -> Self {
        self.transitions_this_tick = transitions_this_tick;
        self.changed = transitions_this_tick > 0;
        self
    }

    /// Scalar activity visualized by the field.
    #[inline]
    pub fn activity(&self) -> f32 {
        self.total_transitions as f32
    }

    /// A channel is active once it has transitioned at least once.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.total_transitions > 0
    }
}

// ============================================================================
// Device Snapshots
// ============================================================================

/// Immutable per-device snapshot produced by the data-ingestion side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Device id
    pub device_id: u32,
    /// True iff at least one channel has transitioned
    pub is_active: bool,
    /// Channel readings (any subset of the 24 channels, any order)
    pub channels: Vec<ChannelReading>,
}

impl DeviceSnapshot {
    /// Build a snapshot, deriving `is_active` from the readings.
    #[must_use]
    pub fn from_channels(device_id: u32, channels: Vec<ChannelReading>) -> Self {
        let is_active = channels.iter().any(ChannelReading::is_active);
        Self { device_id, is_active, channels }
    }

    /// Resolve the reading for a channel, if the snapshot carries one.
    pub fn reading(&self, channel_id: u8) -> Option<&ChannelReading> {
        self.channels.iter().find(|c| c.channel_id == channel_id)
    }

    /// Iterate over active readings that map to a known electrode.
    pub fn active_readings(&self) -> impl Iterator<Item = (&ChannelReading, &'static ElectrodePosition)> {
        self.channels
            .iter()
            .filter(|c| c.is_active())
            .filter_map(|c| electrode(c.channel_id).map(|e| (c, e)))
    }

    /// Number of active channels.
    pub fn active_count(&self) -> usize {
        self.active_readings().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_electrode_ids_unique_and_in_range() {
        let mut seen = [false; ELECTRODE_COUNT];
        for (index, e) in ELECTRODES.iter().enumerate() {
            let id = usize::from(e.channel_id);
            assert_eq!(id, index);
            assert!(id < ELECTRODE_COUNT);
            assert!(!seen[id], "duplicate channel id {id}");
            seen[id] = true;
        }
    }

    #[test]
    fn test_electrodes_inside_template_domain() {
        for e in &ELECTRODES {
            assert!((TEMPLATE_MIN_X..=TEMPLATE_MAX_X).contains(&e.template_x), "{}", e.name);
            assert!((TEMPLATE_MIN_Y..=TEMPLATE_MAX_Y).contains(&e.template_y), "{}", e.name);
        }
    }

    #[test]
    fn test_hemispheres_mirror() {
        for i in 0..12 {
            let left = ELECTRODES[i];
            let right = ELECTRODES[i + 12];
            assert!((left.template_x + right.template_x - 67.0).abs() < 1e-6);
            assert!((left.template_y - right.template_y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_snapshot_activity() {
        let quiet = DeviceSnapshot::from_channels(3, vec![ChannelReading::new(0, 0)]);
        assert!(!quiet.is_active);
        assert_eq!(quiet.active_count(), 0);

        let busy = DeviceSnapshot::from_channels(
            3,
            vec![ChannelReading::new(0, 0), ChannelReading::new(5, 12).with_change(2)],
        );
        assert!(busy.is_active);
        assert_eq!(busy.active_count(), 1);
        assert_eq!(busy.reading(5).map(|r| r.name.as_str()), Some("LC3"));
        assert!(busy.reading(5).is_some_and(|r| r.changed));
        assert!(busy.reading(9).is_none());
    }

    #[test]
    fn test_unknown_channel_is_ignored() {
        let snapshot = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(40, 9)]);
        assert!(snapshot.is_active);
        assert_eq!(snapshot.active_count(), 0);
    }
}
