//! Envelope follower for tracking signal amplitude.
//!
//! Drives the compressor node's level detector. Times are in seconds so they
//! map one-to-one onto the compressor's `attack` and `release` parameters.

use libm::expf;

/// Peak envelope follower with separate attack and release times.
///
/// # Example
///
/// ```rust
/// use stompbox_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0);
/// env.set_times(0.003, 0.25);
/// let level = env.process(0.5);
/// assert!(level > 0.0 && level < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Current envelope level (linear)
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    /// Attack time in seconds (for change detection)
    attack: f32,
    /// Release time in seconds (for change detection)
    release: f32,
}

impl EnvelopeFollower {
    /// Create a follower with 3 ms attack and 250 ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack: 0.003,
            release: 0.25,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set attack and release in seconds.
    ///
    /// Coefficients are only recomputed when a value actually changed, so
    /// this is cheap enough to call once per sample from the render loop.
    #[inline]
    pub fn set_times(&mut self, attack: f32, release: f32) {
        if attack == self.attack && release == self.release {
            return;
        }
        self.attack = attack;
        self.release = release;
        self.recalculate_coefficients();
    }

    /// Attack time in seconds.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Release time in seconds.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Process a sample and return the current envelope level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();

        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };

        // y[n] = coeff * y[n-1] + (1 - coeff) * x[n]
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_abs;
        self.envelope
    }

    /// Current envelope level without processing new input.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = Self::coefficient(self.attack, self.sample_rate);
        self.release_coeff = Self::coefficient(self.release, self.sample_rate);
    }

    // coeff = exp(-1 / (seconds * sample_rate)); zero time means "follow instantly"
    fn coefficient(seconds: f32, sample_rate: f32) -> f32 {
        let samples = seconds * sample_rate;
        if samples < 1.0 {
            0.0
        } else {
            expf(-1.0 / samples)
        }
    }
}
