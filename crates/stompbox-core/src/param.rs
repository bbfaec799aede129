//! Parameter smoothing for zipper-free changes.
//!
//! Gains, filter cutoffs and delay times that jump between two values in a
//! live signal produce audible clicks. [`SmoothedParam`] approaches its target
//! exponentially (one-pole lowpass) and snaps onto it once the remaining
//! distance is below [`SETTLE_EPSILON`], so steady states are exact.
//!
//! ## Usage
//!
//! ```rust
//! use stompbox_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(0.0, 44100.0, 5.0);
//! gain.set_target(1.0);
//!
//! for _ in 0..44100 {
//!     let _g = gain.advance();
//! }
//! assert_eq!(gain.get(), 1.0);
//! ```

use libm::expf;

/// Distance below which a smoothed value is considered settled and snaps.
pub const SETTLE_EPSILON: f32 = 1e-6;

/// A parameter with built-in exponential smoothing.
///
/// The time constant is the time needed to cover 63.2% of the distance to the
/// target. After about 14 time constants the value lands exactly on the target.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Time constant in milliseconds
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with initial value.
    ///
    /// Smoothing is disabled until a time constant is configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Time constant in milliseconds
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// 5 ms time constant, the crossfade speed used for bypass switching.
    pub fn fast(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, 5.0)
    }

    /// Set the target value (parameter will smooth towards this).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and immediately snap to it (no smoothing).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate smoothing coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set the time constant in milliseconds. Zero means instant changes.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        if time_ms == self.smoothing_time_ms {
            return;
        }
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Configured time constant in milliseconds.
    #[inline]
    pub fn smoothing_time_ms(&self) -> f32 {
        self.smoothing_time_ms
    }

    /// Get the next smoothed value (advances by one sample).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let distance = self.target - self.current;
        // y[n] = y[n-1] + coeff * (target - y[n-1])
        let next = self.current + self.coeff * distance;
        // a step too small to change the float also counts as settled
        if distance.abs() < SETTLE_EPSILON || next == self.current {
            self.current = self.target;
        } else {
            self.current = next;
        }
        self.current
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value sits exactly on its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Skip ahead to the target value immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// Recalculate the one-pole coefficient.
    ///
    /// `coeff = 1 - exp(-1 / (tau * sample_rate))` with `tau` in seconds.
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
