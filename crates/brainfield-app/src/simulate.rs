//! Deterministic snapshot simulator.
//!
//! Stands in for the capture hardware: produces per-device snapshots with
//! cumulative transition counts so the renderer can be exercised without a
//! logic analyzer attached.

use std::collections::HashMap;

use brainfield_core::{ChannelReading, DeviceSnapshot, ELECTRODE_COUNT};
use clap::ValueEnum;

/// Activity patterns the simulator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Every channel reports zero transitions
    Quiet,
    /// A single channel (LC2) at 200 transitions, nothing else reported
    Hotspot,
    /// Random sparse activity with a per-device bias
    Mixed,
    /// Mixed activity plus a rotating regional burst every 8 ticks
    Burst,
}

/// Channel of the hotspot scenario
pub const HOTSPOT_CHANNEL: u8 = 4;

/// Total transitions of the hotspot channel
pub const HOTSPOT_TOTAL: u32 = 200;

/// Ticks between bursts
const BURST_PERIOD: u64 = 8;

/// Transitions added to each channel of a bursting region
const BURST_TRANSITIONS: u32 = 10;

/// Snapshot generator with per-device running totals.
#[derive(Debug)]
pub struct Simulator {
    scenario: Scenario,
    rng: u64,
    tick: u64,
    totals: HashMap<u32, [u32; ELECTRODE_COUNT]>,
}

impl Simulator {
    /// Create a simulator; equal seeds give equal sequences.
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self { scenario, rng: seed | 1, tick: 0, totals: HashMap::new() }
    }

    /// xorshift64*
    fn next_u32(&mut self) -> u32 {
        self.rng ^= self.rng >> 12;
        self.rng ^= self.rng << 25;
        self.rng ^= self.rng >> 27;
        (self.rng.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }

    /// Advance the shared tick counter.
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Snapshot for one device at the current tick.
    pub fn snapshot(&mut self, device_id: u32) -> DeviceSnapshot {
        match self.scenario {
            Scenario::Quiet => {
                let channels = (0..ELECTRODE_COUNT as u8).map(|id| ChannelReading::new(id, 0)).collect();
                DeviceSnapshot::from_channels(device_id, channels)
            }
            Scenario::Hotspot => {
                DeviceSnapshot::from_channels(device_id, vec![ChannelReading::new(HOTSPOT_CHANNEL, HOTSPOT_TOTAL)])
            }
            Scenario::Mixed | Scenario::Burst => self.random_walk(device_id),
        }
    }

    fn random_walk(&mut self, device_id: u32) -> DeviceSnapshot {
        let burst_region = (self.scenario == Scenario::Burst && self.tick % BURST_PERIOD == 0)
            .then(|| (self.tick / BURST_PERIOD % 6) as usize);

        let mut deltas = [0u32; ELECTRODE_COUNT];
        for (id, delta) in deltas.iter_mut().enumerate() {
            // Per-device bias toward different channels
            let rate = 8 + (id as u32 * 7 + device_id % 45 * 13) % 45;
            if self.next_u32() % 100 < rate {
                *delta = 1 + self.next_u32() % 3;
            }
            if burst_region == Some(id / 4) {
                *delta += BURST_TRANSITIONS;
            }
        }

        let totals = self.totals.entry(device_id).or_insert([0; ELECTRODE_COUNT]);
        let channels = totals
            .iter_mut()
            .zip(deltas)
            .enumerate()
            .map(|(id, (total, delta))| {
                *total = total.saturating_add(delta);
                let mut reading = ChannelReading::new(id as u8, *total).with_change(delta);
                reading.current_state = (*total % 2) as u8;
                reading
            })
            .collect();

        DeviceSnapshot::from_channels(device_id, channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Simulator::new(Scenario::Mixed, 42);
        let mut b = Simulator::new(Scenario::Mixed, 42);
        for _ in 0..10 {
            assert_eq!(a.snapshot(3), b.snapshot(3));
            a.advance();
            b.advance();
        }
    }

    #[test]
    fn test_quiet_is_inactive() {
        let snapshot = Simulator::new(Scenario::Quiet, 1).snapshot(0);
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.channels.len(), ELECTRODE_COUNT);
    }

    #[test]
    fn test_hotspot_single_channel() {
        let snapshot = Simulator::new(Scenario::Hotspot, 1).snapshot(2);
        assert_eq!(snapshot.channels.len(), 1);
        assert_eq!(snapshot.reading(HOTSPOT_CHANNEL).unwrap().total_transitions, HOTSPOT_TOTAL);
        assert_eq!(snapshot.active_count(), 1);
    }

    #[test]
    fn test_totals_never_decrease() {
        let mut sim = Simulator::new(Scenario::Burst, 9);
        let mut previous = [0u32; ELECTRODE_COUNT];
        for _ in 0..20 {
            let snapshot = sim.snapshot(1);
            for reading in &snapshot.channels {
                let id = usize::from(reading.channel_id);
                assert!(reading.total_transitions >= previous[id]);
                assert_eq!(reading.changed, reading.transitions_this_tick > 0);
                previous[id] = reading.total_transitions;
            }
            sim.advance();
        }
    }

    #[test]
    fn test_burst_marks_region() {
        // Tick 0 bursts region 0 (channels 0-3)
        let snapshot = Simulator::new(Scenario::Burst, 5).snapshot(0);
        for id in 0..4u8 {
            let reading = snapshot.reading(id).unwrap();
            assert!(reading.changed);
            assert!(reading.transitions_this_tick >= BURST_TRANSITIONS);
        }
    }

    #[test]
    fn test_large_device_ids() {
        let mut sim = Simulator::new(Scenario::Mixed, 7);
        let snapshot = sim.snapshot(u32::MAX);
        assert_eq!(snapshot.device_id, u32::MAX);
        assert_eq!(snapshot.channels.len(), ELECTRODE_COUNT);
    }
}
