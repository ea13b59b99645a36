/// Keeps track of the position inside one waveform cycle.
///
/// The phase is normalized: a full cycle spans `[0, 1)`. Every frame the phase moves forward
/// by `frequency / sample_rate` and wraps by subtracting (or adding, for negative
/// frequencies) one, so it never leaves the interval and is never snapped back to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
    increment: f64,
}

impl PhaseAccumulator {
    pub fn new(frequency: f64, sample_rate: u32) -> Self {
        Self::new_at(0.0, frequency, sample_rate)
    }

    /// Starts accumulating from a previously persisted phase.
    pub fn new_at(phase: f64, frequency: f64, sample_rate: u32) -> Self {
        Self {
            phase: wrap(phase),
            increment: increment(frequency, sample_rate),
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Returns the phase of the current frame and moves on to the next one.
    #[inline]
    pub fn next(&mut self) -> f64 {
        let current = self.phase;
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        } else if self.phase < 0.0 {
            self.phase += 1.0;
        }
        if !(0.0..1.0).contains(&self.phase) {
            self.phase = wrap(self.phase);
        }
        current
    }

    /// Advances `frames` frames at once and returns the resulting phase.
    pub fn advance(&mut self, frames: usize) -> f64 {
        for _ in 0..frames {
            self.next();
        }
        self.phase
    }
}

/// Phase step per frame. A zero sample rate yields no movement at all.
#[inline]
pub fn increment(frequency: f64, sample_rate: u32) -> f64 {
    if sample_rate == 0 || !frequency.is_finite() {
        return 0.0;
    }
    frequency / sample_rate as f64
}

// Increments bigger than a whole cycle escape a single subtraction
fn wrap(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(1.0);
    // rem_euclid rounds tiny negative values up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut accumulator = PhaseAccumulator::new(480.0, 48000);
        let end = accumulator.advance(100);
        assert!(
            end < 1e-9 || end > 1.0 - 1e-9,
            "Phase did not return to start: {}",
            end
        );

        let mut accumulator = PhaseAccumulator::new_at(0.3, 480.0, 48000);
        let end = accumulator.advance(100);
        assert!((end - 0.3).abs() < 1e-9, "Phase drifted: {}", end);
    }

    #[test]
    fn test_next_returns_current_frame() {
        let mut accumulator = PhaseAccumulator::new(12000.0, 48000);
        assert_eq!(accumulator.next(), 0.0);
        assert_eq!(accumulator.next(), 0.25);
        assert_eq!(accumulator.next(), 0.5);
        assert_eq!(accumulator.next(), 0.75);
        assert_eq!(accumulator.next(), 0.0);
    }

    #[test]
    fn test_degenerate_frequencies() {
        let mut still = PhaseAccumulator::new_at(0.2, 0.0, 48000);
        assert_eq!(still.advance(1000), 0.2);

        let mut reversed = PhaseAccumulator::new(-12000.0, 48000);
        reversed.next();
        assert_eq!(reversed.phase(), 0.75);
        for _ in 0..1000 {
            let phase = reversed.next();
            assert!((0.0..1.0).contains(&phase));
        }

        assert_eq!(increment(440.0, 0), 0.0);
        assert_eq!(increment(f64::NAN, 48000), 0.0);
    }

    #[test]
    fn test_phase_stays_in_range() {
        for frequency in [1.0, 440.0, 12345.6, 47999.0, 100_000.0, -3000.0] {
            let mut accumulator = PhaseAccumulator::new(frequency, 48000);
            for _ in 0..10_000 {
                let phase = accumulator.next();
                assert!((0.0..1.0).contains(&phase), "{} escaped at {}", phase, frequency);
            }
        }
        assert_eq!(PhaseAccumulator::new_at(2.5, 1.0, 48000).phase(), 0.5);
        assert_eq!(PhaseAccumulator::new_at(f64::NAN, 1.0, 48000).phase(), 0.0);
    }
}
