//! Sine oscillator for modulation sources.
//!
//! Feeds the chorus delay-time sweep and the tremolo amplitude swing. The
//! frequency is supplied per sample because it is itself an automatable graph
//! parameter.

use core::f32::consts::TAU;
use libm::sinf;

/// Phase-accumulating sine oscillator, output in `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use stompbox_core::SineOscillator;
///
/// let mut osc = SineOscillator::new(48000.0);
/// assert_eq!(osc.next(2.0), 0.0); // starts at phase zero
/// ```
#[derive(Debug, Clone)]
pub struct SineOscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    sample_rate: f32,
}

impl SineOscillator {
    /// Create an oscillator at phase zero.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    /// Next sample at `frequency` Hz.
    #[inline]
    pub fn next(&mut self, frequency: f32) -> f32 {
        let output = sinf(self.phase * TAU);

        let inc = if frequency.is_finite() {
            frequency / self.sample_rate
        } else {
            0.0
        };
        self.phase += inc;
        // rem_euclid keeps negative and > 1 increments in range
        if !(0.0..1.0).contains(&self.phase) {
            self.phase = self.phase.rem_euclid(1.0);
        }

        output
    }

    /// Current phase (0.0 - 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
