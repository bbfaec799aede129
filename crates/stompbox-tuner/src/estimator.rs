//! Hybrid pitch estimator.
//!
//! # Pipeline
//!
//! 1. **Presence gate** - buffers whose RMS is below the noise floor carry
//!    no pitch.
//! 2. **YIN** - cumulative-mean-normalised difference function over the first
//!    half of the buffer; the first dip below the absolute threshold (descended
//!    to its local minimum) wins, otherwise the global minimum if it is at
//!    most 0.5 and lies inside the window. Parabolic interpolation refines
//!    the lag.
//! 3. **Autocorrelation fallback** - only when YIN fails. The buffer is
//!    trimmed to its first and last quiet samples, the first local peak of the
//!    raw autocorrelation inside the guitar's period range is refined by
//!    parabolic interpolation.
//! 4. **Validation and clarity gate** - out-of-range or low-confidence results
//!    are dropped without touching the smoothing state.
//! 5. **Smoothing** - small moves are blended with the previous output, then a
//!    median over the last five outputs removes single-frame octave slips.
//!
//! ```text
//! d(τ)  = Σ (x[j] - x[j+τ])²
//! d'(τ) = d(τ) · τ / Σ_{k=1..τ} d(k)      d'(0) = 1
//! ```

use std::collections::VecDeque;

use stompbox_core::rms;

use crate::correlation::Correlator;
use crate::note::{TunerData, note_from_frequency};

/// YIN results outside this band count as a YIN failure.
const YIN_RANGE_HZ: (f32, f32) = (60.0, 1500.0);
/// Final accepted band.
const ACCEPT_RANGE_HZ: (f32, f32) = (50.0, 1500.0);
/// Global-minimum fallback is rejected above this normalised difference.
const YIN_GLOBAL_MAX: f64 = 0.5;
/// Samples quieter than this bound the autocorrelation window.
const TRIM_THRESHOLD: f32 = 0.2;
/// Highest clarity the autocorrelation path can report.
const ACF_CLARITY: f32 = 0.8;
/// Relative change below which a new reading is blended with the last one.
const SMOOTHING_WINDOW: f32 = 0.1;
/// Outputs kept for the median filter.
const MAX_HISTORY: usize = 5;
/// Median kicks in once this many outputs exist.
const MEDIAN_MIN: usize = 3;

/// Which detector(s) to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// YIN only.
    Yin,
    /// Autocorrelation only.
    Autocorrelation,
    /// YIN, falling back to autocorrelation.
    #[default]
    Hybrid,
}

/// Estimator tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunerConfig {
    /// RMS below which a buffer is treated as silence.
    pub noise_floor: f32,
    /// YIN absolute threshold on the normalised difference.
    pub yin_threshold: f32,
    /// Readings with lower clarity are discarded.
    pub clarity_threshold: f32,
    /// Weight of the previous output when blending small moves.
    pub smoothing: f32,
    /// Detector selection.
    pub algorithm: Algorithm,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            noise_floor: 0.01,
            yin_threshold: 0.1,
            clarity_threshold: 0.5,
            smoothing: 0.8,
            algorithm: Algorithm::Hybrid,
        }
    }
}

/// Raw detector output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReading {
    /// Frequency in Hz; zero or negative means no pitch.
    pub frequency: f32,
    /// Confidence, 0..1.
    pub clarity: f32,
}

impl PitchReading {
    /// No pitch.
    pub const NONE: PitchReading = PitchReading {
        frequency: 0.0,
        clarity: 0.0,
    };

    /// True when a frequency was found.
    pub fn is_pitched(&self) -> bool {
        self.frequency > 0.0
    }
}

/// Stateful pitch estimator.
///
/// # Example
///
/// ```rust
/// use stompbox_tuner::{PitchEstimator, TunerConfig};
///
/// let sr = 44100.0;
/// let tone: Vec<f32> = (0..4096)
///     .map(|i| 0.5 * (std::f32::consts::TAU * 110.0 * i as f32 / sr).sin())
///     .collect();
///
/// let mut estimator = PitchEstimator::new(TunerConfig::default());
/// let reading = estimator.process(&tone, sr);
/// assert_eq!((reading.note, reading.octave), ("A", 2));
/// ```
#[derive(Debug)]
pub struct PitchEstimator {
    config: TunerConfig,
    correlator: Correlator,
    /// Difference function, normalised in place.
    yin: Vec<f64>,
    acf: Vec<f64>,
    last_frequency: f32,
    history: VecDeque<f32>,
}

impl Default for PitchEstimator {
    fn default() -> Self {
        Self::new(TunerConfig::default())
    }
}

impl PitchEstimator {
    /// Creates an estimator with empty history.
    pub fn new(config: TunerConfig) -> Self {
        Self {
            config,
            correlator: Correlator::new(),
            yin: Vec::new(),
            acf: Vec::new(),
            last_frequency: 0.0,
            history: VecDeque::with_capacity(MAX_HISTORY + 1),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Replaces the configuration. History is kept.
    pub fn set_config(&mut self, config: TunerConfig) {
        self.config = config;
    }

    /// Clears the smoothing history.
    pub fn reset(&mut self) {
        self.last_frequency = 0.0;
        self.history.clear();
    }

    /// Last smoothed output, 0 if none.
    pub fn last_frequency(&self) -> f32 {
        self.last_frequency
    }

    /// Detects the pitch of `buffer` and folds it into the smoothing state.
    ///
    /// Never fails: anything that is not a confident pitch is
    /// [`PitchReading::NONE`].
    pub fn detect(&mut self, buffer: &[f32], sample_rate: f32) -> PitchReading {
        if buffer.len() < 8 || sample_rate.is_nan() || sample_rate <= 0.0 {
            return PitchReading::NONE;
        }
        if rms(buffer) < self.config.noise_floor {
            return PitchReading::NONE;
        }

        let mut reading = PitchReading::NONE;
        if self.config.algorithm != Algorithm::Autocorrelation {
            reading = self.yin(buffer, sample_rate);
        }
        if self.config.algorithm != Algorithm::Yin && !reading.is_pitched() {
            reading = self.autocorrelate(buffer, sample_rate);
        }

        let f = reading.frequency;
        if !reading.is_pitched()
            || !f.is_finite()
            || f < ACCEPT_RANGE_HZ.0
            || f > ACCEPT_RANGE_HZ.1
            || reading.clarity < self.config.clarity_threshold
        {
            return PitchReading::NONE;
        }

        PitchReading {
            frequency: self.smooth(f),
            clarity: reading.clarity,
        }
    }

    /// [`detect`](Self::detect) mapped to a note reading.
    pub fn process(&mut self, buffer: &[f32], sample_rate: f32) -> TunerData {
        let reading = self.detect(buffer, sample_rate);
        if !reading.is_pitched() {
            return TunerData::SILENT;
        }
        let mut data = note_from_frequency(reading.frequency);
        if data.is_pitched() {
            data.clarity = reading.clarity;
        }
        data
    }

    fn smooth(&mut self, frequency: f32) -> f32 {
        let mut f = frequency;
        let last = self.last_frequency;
        if last > 0.0 && (f - last).abs() / last < SMOOTHING_WINDOW {
            let alpha = self.config.smoothing;
            f = alpha * last + (1.0 - alpha) * f;
        }

        self.history.push_back(f);
        if self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }

        let len = self.history.len();
        if len >= MEDIAN_MIN {
            let mut sorted = [0.0_f32; MAX_HISTORY];
            for (slot, &h) in sorted.iter_mut().zip(&self.history) {
                *slot = h;
            }
            sorted[..len].sort_by(f32::total_cmp);
            f = sorted[len / 2];
        }

        self.last_frequency = f;
        f
    }

    fn yin(&mut self, buffer: &[f32], sample_rate: f32) -> PitchReading {
        let half = buffer.len() / 2;
        if half < 4 {
            return PitchReading::NONE;
        }

        self.correlator.difference(buffer, half, &mut self.yin);
        let d = &mut self.yin;

        d[0] = 1.0;
        let mut running = 0.0;
        for tau in 1..half {
            running += d[tau];
            d[tau] = if running > 0.0 {
                d[tau] * tau as f64 / running
            } else {
                1.0
            };
        }

        let threshold = f64::from(self.config.yin_threshold);
        let mut found = None;
        let mut tau = 2;
        while tau < half - 1 {
            if d[tau] < threshold {
                while tau + 1 < half && d[tau + 1] < d[tau] {
                    tau += 1;
                }
                found = Some(tau);
                break;
            }
            tau += 1;
        }

        let tau = match found {
            Some(t) if t < half - 1 => t,
            _ => {
                let mut min_tau = 2;
                for i in 2..half {
                    if d[i] < d[min_tau] {
                        min_tau = i;
                    }
                }
                // a minimum on the last lag is the window edge, not a dip
                if min_tau + 1 >= half
                    || d[min_tau] > d[min_tau + 1]
                    || d[min_tau] > YIN_GLOBAL_MAX
                {
                    return PitchReading::NONE;
                }
                min_tau
            }
        };

        let better_tau = if tau < 1 || tau >= half - 1 {
            tau as f64
        } else {
            let (s0, s1, s2) = (d[tau - 1], d[tau], d[tau + 1]);
            let denominator = 2.0 * s1 - s2 - s0;
            if denominator.abs() < 1e-10 {
                tau as f64
            } else {
                tau as f64 + (s2 - s0) / (2.0 * denominator)
            }
        };

        let frequency = (f64::from(sample_rate) / better_tau) as f32;
        if !(YIN_RANGE_HZ.0..=YIN_RANGE_HZ.1).contains(&frequency) {
            return PitchReading::NONE;
        }

        PitchReading {
            frequency,
            clarity: (1.0 - d[tau]).clamp(0.0, 1.0) as f32,
        }
    }

    fn autocorrelate(&mut self, buffer: &[f32], sample_rate: f32) -> PitchReading {
        let size = buffer.len();
        let max_samples = size / 2;

        let r1 = (0..size / 2)
            .find(|&i| buffer[i].abs() < TRIM_THRESHOLD)
            .unwrap_or(0);
        let r2 = (1..size / 2)
            .map(|i| size - i)
            .find(|&i| buffer[i].abs() < TRIM_THRESHOLD)
            .unwrap_or(size - 1);
        let trimmed = &buffer[r1..r2];
        if trimmed.len() < 2 {
            return PitchReading::NONE;
        }

        self.correlator
            .autocorrelation(trimmed, max_samples, &mut self.acf);
        let r = &self.acf;

        let min_period = ((sample_rate / 2000.0) as usize).max(1);
        let max_period = (sample_rate / 50.0) as usize;
        let upper = max_period.min(max_samples.saturating_sub(1));

        let Some(peak) = (min_period..upper).find(|&i| r[i] > r[i - 1] && r[i] > r[i + 1]) else {
            return PitchReading::NONE;
        };

        let (y1, y2, y3) = (r[peak - 1], r[peak], r[peak + 1]);
        let a = (y1 + y3 - 2.0 * y2) / 2.0;
        let b = (y3 - y1) / 2.0;
        let shift = if a == 0.0 { 0.0 } else { -b / (2.0 * a) };

        let sharpness = if r[0] > 0.0 { (y2 / r[0]) as f32 } else { 0.0 };
        PitchReading {
            frequency: (f64::from(sample_rate) / (peak as f64 + shift)) as f32,
            clarity: sharpness.clamp(0.0, ACF_CLARITY),
        }
    }
}
