//! Stompbox Tuner - pitch estimation for the pedalboard tuner
//!
//! The tuner reads the dry input through an analyser tap and turns each
//! window into a [`TunerData`] reading.
//!
//! - [`PitchEstimator`] - YIN with an autocorrelation fallback, clarity gate,
//!   smoothing and a median filter
//! - [`Correlator`] - FFT-backed difference and autocorrelation kernels
//! - [`note_from_frequency`] - equal-temperament note, octave and cents
//! - [`closest_string`] - standard-tuning string guide
//!
//! # Example
//!
//! ```rust
//! use stompbox_tuner::{PitchEstimator, TuningDirection};
//!
//! let sr = 44100.0;
//! let flat_a: Vec<f32> = (0..4096)
//!     .map(|i| 0.5 * (std::f32::consts::TAU * 108.0 * i as f32 / sr).sin())
//!     .collect();
//!
//! let mut tuner = PitchEstimator::default();
//! let reading = tuner.process(&flat_a, sr);
//! let guide = reading.closest_string().unwrap();
//! assert_eq!(guide.string.name, "A2");
//! assert_eq!(guide.direction(), TuningDirection::Tighten);
//! ```

pub mod correlation;
pub mod estimator;
pub mod note;

pub use correlation::Correlator;
pub use estimator::{Algorithm, PitchEstimator, PitchReading, TunerConfig};
pub use note::{
    A4_FREQUENCY, GuitarString, IN_TUNE_CENTS, NOTE_NAMES, NOTE_RANGE_HZ, STANDARD_TUNING,
    STRING_GUIDE_MIN_CLARITY, StringMatch, TunerData, TuningDirection, cents_between,
    closest_string, midi_to_frequency, note_from_frequency,
};
