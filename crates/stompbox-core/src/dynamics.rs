//! Feed-forward compressor with a soft knee.
//!
//! The detector is a peak [`EnvelopeFollower`]; the gain computer works in dB
//! with a quadratic knee centred on the threshold:
//!
//! ```text
//! x <= T - W/2         : no reduction
//! x >= T + W/2         : (T - x) * (1 - 1/R)
//! otherwise            : -(1 - 1/R) * (x - T + W/2)^2 / (2W)
//! ```

use crate::envelope::EnvelopeFollower;
use crate::math::{db_to_linear, linear_to_db};

/// Settings for one compressor sample, as read from the node's parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Threshold in dB.
    pub threshold: f32,
    /// Knee width in dB (0 = hard knee).
    pub knee: f32,
    /// Compression ratio (n:1).
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold: -24.0,
            knee: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

/// Gain reduction in dB (zero or negative) for a detector level in dB.
#[inline]
pub fn gain_reduction_db(level_db: f32, settings: &CompressorSettings) -> f32 {
    let ratio = settings.ratio.max(1.0);
    let slope = 1.0 - 1.0 / ratio;
    let knee = settings.knee.max(0.0);
    let over = level_db - settings.threshold;

    if knee <= 0.0 {
        if over <= 0.0 { 0.0 } else { -over * slope }
    } else if over <= -knee / 2.0 {
        0.0
    } else if over >= knee / 2.0 {
        -over * slope
    } else {
        let x = over + knee / 2.0;
        -slope * x * x / (2.0 * knee)
    }
}

/// Mono compressor state.
#[derive(Debug, Clone)]
pub struct Compressor {
    detector: EnvelopeFollower,
    reduction_db: f32,
}

impl Compressor {
    /// Create a compressor at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            detector: EnvelopeFollower::new(sample_rate),
            reduction_db: 0.0,
        }
    }

    /// Compress one sample.
    #[inline]
    pub fn process(&mut self, input: f32, settings: &CompressorSettings) -> f32 {
        self.detector.set_times(settings.attack, settings.release);
        let level = self.detector.process(input);
        self.reduction_db = gain_reduction_db(linear_to_db(level), settings);
        input * db_to_linear(self.reduction_db)
    }

    /// Most recent gain reduction in dB (zero or negative).
    pub fn reduction_db(&self) -> f32 {
        self.reduction_db
    }

    /// Clear the detector.
    pub fn reset(&mut self) {
        self.detector.reset();
        self.reduction_db = 0.0;
    }
}
