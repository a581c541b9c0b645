//! Electrode marker renderer
//!
//! Every one of the 24 electrodes gets a marker. Size and color come from
//! the activity band of the channel's total transition count, the pulse
//! profile modulates the size, and changed channels get an additive glow.
//! Drawing is batched into three passes so the composite mode changes only
//! twice per frame.

use brainfield_core::{
    glow_strength, ActivityBands, CoordinateMapper, DeviceSnapshot, PulseFactor, Rect, ELECTRODES,
};

use crate::canvas::{Canvas2d, CompositeMode, RadialGradient, Rgba8};
use crate::error::CanvasError;

/// Panel size at which band radii are taken literally
pub const REFERENCE_PANEL_SIZE: f32 = 400.0;

/// Glow halo radius relative to the marker radius
pub const GLOW_RADIUS_RATIO: f32 = 2.6;

/// Core dot radius relative to the marker radius
pub const CORE_RADIUS_RATIO: f32 = 0.35;

/// Opacity of markers for channels without activity
const INACTIVE_MARKER_ALPHA: f32 = 0.55;

const CORE_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 230);

/// Resolved marker for one electrode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElectrodeMarker {
    /// Channel id
    pub channel_id: u8,
    /// Canvas x
    pub x: f32,
    /// Canvas y
    pub y: f32,
    /// Radius after scale and pulse
    pub radius: f32,
    /// Fill color
    pub color: Rgba8,
    /// Band index
    pub band: usize,
    /// Channel has transitioned at least once
    pub active: bool,
    /// Channel transitioned this tick
    pub changed: bool,
}

/// Marker scale for a panel: `min(w, h) / 400`.
#[inline]
pub fn marker_scale(width: u32, height: u32) -> f32 {
    width.min(height) as f32 / REFERENCE_PANEL_SIZE
}

/// Resolve all 24 markers for a frame.
///
/// Channels missing from the snapshot (or no snapshot at all) get the
/// neutral marker of band 0 with no pulse.
pub fn layout_markers(
    snapshot: Option<&DeviceSnapshot>,
    bands: &ActivityBands,
    mapper: &CoordinateMapper,
    pulse_time: f64,
    width: u32,
    height: u32,
) -> Vec<ElectrodeMarker> {
    let scale = marker_scale(width, height);
    let (w, h) = (width as f32, height as f32);

    ELECTRODES
        .iter()
        .map(|electrode| {
            let reading = snapshot.and_then(|s| s.reading(electrode.channel_id));
            let total = reading.map_or(0, |r| r.total_transitions);
            let active = reading.is_some_and(|r| r.is_active());
            let changed = active && reading.is_some_and(|r| r.changed);

            let (band, step) = bands.classify(total);
            let pulse = PulseFactor::for_reading(reading);
            let color = Rgba8::opaque(step.color);
            let (x, y) = mapper.to_canvas_space(electrode.template_x, electrode.template_y, w, h);

            ElectrodeMarker {
                channel_id: electrode.channel_id,
                x,
                y,
                radius: step.base_radius * scale * pulse.at(pulse_time),
                color: if active { color } else { color.with_alpha(INACTIVE_MARKER_ALPHA) },
                band,
                active,
                changed,
            }
        })
        .collect()
}

/// Draw markers in three passes: glow halos, solid circles, core dots.
///
/// Returns the number of markers drawn.
///
/// # Errors
///
/// Drawing failure.
pub fn draw_markers<C: Canvas2d + ?Sized>(
    canvas: &mut C,
    markers: &[ElectrodeMarker],
    pulse_time: f64,
) -> Result<usize, CanvasError> {
    canvas.set_global_alpha(1.0);

    let glow = glow_strength(pulse_time);
    canvas.set_composite(CompositeMode::Lighter);
    for m in markers.iter().filter(|m| m.active && m.changed) {
        let outer_radius = m.radius * GLOW_RADIUS_RATIO;
        let gradient = RadialGradient {
            center: (m.x, m.y),
            inner_radius: m.radius * 0.5,
            outer_radius,
            inner: m.color.with_alpha(0.25 + 0.5 * glow),
            outer: m.color.with_alpha(0.0),
        };
        canvas.fill_radial_gradient(Rect::around(m.x, m.y, outer_radius), &gradient)?;
    }

    canvas.set_composite(CompositeMode::SourceOver);
    for m in markers {
        canvas.fill_circle(m.x, m.y, m.radius, m.color)?;
    }

    for m in markers.iter().filter(|m| m.active) {
        canvas.fill_circle(m.x, m.y, m.radius * CORE_RADIUS_RATIO, CORE_COLOR)?;
    }

    Ok(markers.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::{Op, RecordingCanvas};
    use brainfield_core::{ChannelReading, ELECTRODE_COUNT};

    fn layout(snapshot: Option<&DeviceSnapshot>, t: f64) -> Vec<ElectrodeMarker> {
        layout_markers(snapshot, &ActivityBands::default(), &CoordinateMapper::default(), t, 400, 400)
    }

    #[test]
    fn test_absent_snapshot_neutral() {
        let markers = layout(None, 1.3);
        assert_eq!(markers.len(), ELECTRODE_COUNT);
        for m in &markers {
            assert_eq!(m.band, 0);
            assert!(!m.active);
            assert!((m.radius - 4.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_top_band_largest_radius() {
        let snapshot = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(4, 200)]);
        let bands = ActivityBands::default();
        for step in 0..20 {
            let markers = layout(Some(&snapshot), f64::from(step) * 0.37);
            let hot = markers.iter().find(|m| m.channel_id == 4).unwrap();
            assert_eq!(hot.band, bands.top_index());
            assert_eq!(hot.color, Rgba8::WHITE);
            assert!(markers.iter().filter(|m| m.channel_id != 4).all(|m| m.radius < hot.radius));
        }
    }

    #[test]
    fn test_changed_pulses_wider() {
        let steady = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(7, 40)]);
        let changed = DeviceSnapshot::from_channels(0, vec![ChannelReading::new(7, 40).with_change(2)]);

        let spread = |snapshot: &DeviceSnapshot| {
            let radii: Vec<f32> = (0..64)
                .map(|k| layout(Some(snapshot), f64::from(k) * 0.1).into_iter().find(|m| m.channel_id == 7).unwrap().radius)
                .collect();
            let max = radii.iter().copied().fold(f32::MIN, f32::max);
            let min = radii.iter().copied().fold(f32::MAX, f32::min);
            max - min
        };

        assert!(spread(&changed) > 4.0 * spread(&steady));
    }

    #[test]
    fn test_scale_follows_panel() {
        let small = layout_markers(None, &ActivityBands::default(), &CoordinateMapper::default(), 0.0, 200, 600);
        assert!((small[0].radius - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_three_pass_order() {
        let snapshot = DeviceSnapshot::from_channels(
            0,
            vec![ChannelReading::new(1, 12).with_change(1), ChannelReading::new(2, 60)],
        );
        let markers = layout(Some(&snapshot), 0.5);
        let mut canvas = RecordingCanvas::new(400, 400);
        let drawn = draw_markers(&mut canvas, &markers, 0.5).unwrap();
        assert_eq!(drawn, ELECTRODE_COUNT);

        let lighter = canvas.ops.iter().position(|op| *op == Op::Composite(CompositeMode::Lighter)).unwrap();
        let over = canvas.ops.iter().position(|op| *op == Op::Composite(CompositeMode::SourceOver)).unwrap();
        let gradients: Vec<usize> =
            canvas.ops.iter().enumerate().filter(|(_, op)| **op == Op::Gradient).map(|(i, _)| i).collect();
        assert_eq!(gradients.len(), 1);
        assert!(lighter < gradients[0] && gradients[0] < over);

        let circles = canvas.ops.iter().filter(|op| matches!(op, Op::Circle { .. })).count();
        assert_eq!(circles, ELECTRODE_COUNT + 2);
        assert!(matches!(canvas.ops.last(), Some(Op::Circle { color, .. }) if *color == CORE_COLOR));
    }
}
