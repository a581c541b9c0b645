//! Activity bands for electrode markers
//!
//! Marker color and base radius follow a monotonic step function of a
//! channel's total transition count.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ConfigError;

/// One step of the band table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityBand {
    /// Lowest total transition count in this band
    pub min_transitions: u32,
    /// Marker fill color
    pub color: Rgb,
    /// Marker radius in pixels at the reference panel size
    pub base_radius: f32,
}

const fn band(min_transitions: u32, color: Rgb, base_radius: f32) -> ActivityBand {
    ActivityBand { min_transitions, color, base_radius }
}

/// Default table: inactive grey through blue, green, amber and red to white.
const DEFAULT_BANDS: [ActivityBand; 11] = [
    band(0, [156, 163, 175], 4.0),
    band(1, [96, 165, 250], 4.5),
    band(5, [59, 130, 246], 5.0),
    band(10, [45, 212, 191], 5.5),
    band(20, [34, 197, 94], 6.0),
    band(35, [163, 230, 53], 6.5),
    band(50, [250, 204, 21], 7.0),
    band(75, [251, 146, 60], 7.5),
    band(100, [239, 68, 68], 8.0),
    band(150, [236, 72, 153], 9.0),
    band(200, [255, 255, 255], 10.0),
];

/// Ordered band table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ActivityBand>", into = "Vec<ActivityBand>")]
pub struct ActivityBands {
    bands: Vec<ActivityBand>,
}

impl ActivityBands {
    /// Build a table from bands sorted by threshold.
    ///
    /// # Errors
    ///
    /// The table must be non-empty, start at 0 and have strictly increasing
    /// thresholds.
    pub fn new(bands: Vec<ActivityBand>) -> Result<Self, ConfigError> {
        let first = bands.first().ok_or(ConfigError::EmptyBands)?;
        if first.min_transitions != 0 {
            return Err(ConfigError::FirstBandNotZero { threshold: first.min_transitions });
        }
        for (index, pair) in bands.windows(2).enumerate() {
            if pair[1].min_transitions <= pair[0].min_transitions {
                return Err(ConfigError::UnorderedBands { index: index + 1 });
            }
        }
        Ok(Self { bands })
    }

    /// Index and band for a total transition count.
    pub fn classify(&self, total_transitions: u32) -> (usize, &ActivityBand) {
        let index = self
            .bands
            .iter()
            .rposition(|b| total_transitions >= b.min_transitions)
            .unwrap_or(0);
        (index, &self.bands[index])
    }

    /// Index of the highest band.
    pub fn top_index(&self) -> usize {
        self.bands.len() - 1
    }

    /// All bands, low to high.
    pub fn bands(&self) -> &[ActivityBand] {
        &self.bands
    }

    /// Largest base radius in the table.
    pub fn max_radius(&self) -> f32 {
        self.bands.iter().map(|b| b.base_radius).fold(0.0, f32::max)
    }
}

impl Default for ActivityBands {
    fn default() -> Self {
        Self { bands: DEFAULT_BANDS.to_vec() }
    }
}

impl TryFrom<Vec<ActivityBand>> for ActivityBands {
    type Error = ConfigError;

    fn try_from(bands: Vec<ActivityBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<ActivityBands> for Vec<ActivityBand> {
    fn from(bands: ActivityBands) -> Self {
        bands.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_step_function() {
        let bands = ActivityBands::default();
        assert_eq!(bands.classify(0).0, 0);
        assert_eq!(bands.classify(1).0, 1);
        assert_eq!(bands.classify(4).0, 1);
        assert_eq!(bands.classify(5).0, 2);
        assert_eq!(bands.classify(199).0, 9);
        assert_eq!(bands.classify(200).0, bands.top_index());
        assert_eq!(bands.classify(u32::MAX).0, bands.top_index());
    }

    #[test]
    fn test_radius_monotonic() {
        let bands = ActivityBands::default();
        let mut last = 0.0;
        for total in 0..400 {
            let radius = bands.classify(total).1.base_radius;
            assert!(radius >= last);
            last = radius;
        }
        assert_eq!(bands.classify(200).1.base_radius, bands.max_radius());
    }

    #[test]
    fn test_invalid_tables() {
        assert_eq!(ActivityBands::new(vec![]).unwrap_err(), ConfigError::EmptyBands);
        assert_eq!(
            ActivityBands::new(vec![band(3, [0, 0, 0], 1.0)]).unwrap_err(),
            ConfigError::FirstBandNotZero { threshold: 3 }
        );
        assert_eq!(
            ActivityBands::new(vec![band(0, [0, 0, 0], 1.0), band(0, [1, 1, 1], 2.0)]).unwrap_err(),
            ConfigError::UnorderedBands { index: 1 }
        );
    }

    #[test]
    fn test_four_band_table() {
        let bands = ActivityBands::new(vec![
            band(0, [128, 128, 128], 4.0),
            band(1, [0, 128, 255], 5.0),
            band(50, [255, 200, 0], 7.0),
            band(150, [255, 0, 0], 9.0),
        ])
        .unwrap();
        assert_eq!(bands.classify(70).1.color, [255, 200, 0]);
    }
}
