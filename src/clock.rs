//! Fixed-step clock
//!
//! Frames arrive at whatever rate the host manages; the simulation always
//! advances in whole ticks of `1 / TICK_RATE` seconds.

use crate::consts::{MAX_SUBSTEPS, TICK_RATE};

/// Seconds per simulation tick
pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
/// Longest frame the clock will account for
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    accumulator: f32,
    /// Ticks dropped because a frame needed more than `MAX_SUBSTEPS`
    pub dropped: u64,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed time and return how many ticks to run
    ///
    /// Never more than `MAX_SUBSTEPS`; time beyond that is discarded.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }

        if self.accumulator >= SIM_DT {
            let excess = (self.accumulator / SIM_DT) as u64;
            self.dropped += excess;
            log::debug!("Clock behind, dropping {excess} ticks");
            self.accumulator %= SIM_DT;
        }
        steps
    }

    /// Fraction of a tick left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_frames() {
        let mut clock = FixedClock::new();
        let total: u32 = (0..100).map(|_| clock.advance(0.02)).sum();
        // 2 s at 100 Hz, give or take float drift on the last tick
        assert!((199..=200).contains(&total));
        assert_eq!(clock.dropped, 0);
    }

    #[test]
    fn test_substep_cap() {
        let mut clock = FixedClock::new();
        assert_eq!(clock.advance(0.5), MAX_SUBSTEPS);
        assert!(clock.dropped > 0);
        assert!(clock.alpha() < 1.0);
        // Nothing carried over from the long frame
        assert!(clock.advance(SIM_DT * 0.5) <= 1);
    }

    #[test]
    fn test_rejects_bad_dt() {
        let mut clock = FixedClock::new();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.advance(f32::NAN), 0);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut clock = FixedClock::new();
        assert_eq!(clock.advance(SIM_DT * 0.6), 0);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
    }
}
