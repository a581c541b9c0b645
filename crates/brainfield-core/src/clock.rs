//! Animation clock and pulse factors
//!
//! Every panel owns one [`AnimationClock`]. The frame loop advances it once
//! per frame; glow, marker pulsing and the field brightening of changed
//! channels all read the same phase.

use serde::{Deserialize, Serialize};

use crate::types::ChannelReading;

/// Default phase increment per animation frame
pub const DEFAULT_CLOCK_INCREMENT: f64 = 0.05;

/// Extra field intensity of a changed channel at the top of its pulse
pub const CHANGED_FIELD_BOOST: f32 = 0.25;

/// Per-panel monotonically increasing animation phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    phase: f64,
    increment: f64,
}

impl AnimationClock {
    /// Start at `seed` (typically random per panel, to desynchronize panels).
    pub fn new(seed: f64, increment: f64) -> Self {
        Self { phase: seed, increment }
    }

    /// Advance by one frame and return the new phase.
    pub fn advance(&mut self) -> f64 {
        self.phase += self.increment;
        self.phase
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase increment per frame.
    #[inline]
    pub fn increment(&self) -> f64 {
        self.increment
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_CLOCK_INCREMENT)
    }
}

/// Sinusoidal size modulation `1 + amplitude · sin(frequency · t)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PulseFactor {
    /// Peak deviation from 1
    pub amplitude: f32,
    /// Angular frequency in radians per unit phase
    pub frequency: f32,
}

impl PulseFactor {
    /// Channel transitioned this tick: fast and pronounced.
    pub const CHANGED: Self = Self { amplitude: 0.35, frequency: 4.0 };

    /// Quiescently active channel: slow and subtle.
    pub const STEADY: Self = Self { amplitude: 0.06, frequency: 1.0 };

    /// Inactive channel: no pulse.
    pub const NONE: Self = Self { amplitude: 0.0, frequency: 0.0 };

    /// Pulse profile for a reading (or for an absent one).
    pub fn for_reading(reading: Option<&ChannelReading>) -> Self {
        match reading {
            Some(r) if r.is_active() && r.changed => Self::CHANGED,
            Some(r) if r.is_active() => Self::STEADY,
            _ => Self::NONE,
        }
    }

    /// Factor at phase `t`.
    pub fn at(&self, t: f64) -> f32 {
        1.0 + self.amplitude * libm::sinf(self.frequency * t as f32)
    }
}

/// Glow strength in `[0, 1]` for changed channels.
pub fn glow_strength(t: f64) -> f32 {
    0.5 + 0.5 * libm::sinf(4.0 * t as f32)
}

/// Multiplier applied to a changed channel's field sample.
pub fn changed_intensity(t: f64) -> f32 {
    1.0 + CHANGED_FIELD_BOOST * glow_strength(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_monotonically() {
        let mut clock = AnimationClock::new(1.5, 0.05);
        let mut last = clock.phase();
        for _ in 0..100 {
            let next = clock.advance();
            assert!(next > last);
            last = next;
        }
        assert!((clock.phase() - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_changed_channel_pulses_harder() {
        let steady = ChannelReading::new(3, 80);
        let changed = ChannelReading::new(3, 80).with_change(2);

        let a = PulseFactor::for_reading(Some(&steady));
        let b = PulseFactor::for_reading(Some(&changed));
        assert!(b.amplitude > a.amplitude);
        assert!(b.frequency > a.frequency);

        // Same phase, larger deviation from 1
        let t = 0.3;
        assert!((b.at(t) - 1.0).abs() > (a.at(t) - 1.0).abs());
    }

    #[test]
    fn test_inactive_channel_does_not_pulse() {
        let quiet = ChannelReading::new(3, 0).with_change(0);
        assert_eq!(PulseFactor::for_reading(Some(&quiet)), PulseFactor::NONE);
        assert_eq!(PulseFactor::for_reading(None), PulseFactor::NONE);
        assert_eq!(PulseFactor::NONE.at(12.3), 1.0);
    }

    #[test]
    fn test_glow_strength_bounds() {
        for k in 0..200 {
            let g = glow_strength(f64::from(k) * 0.037);
            assert!((0.0..=1.0).contains(&g));
        }
    }
}
