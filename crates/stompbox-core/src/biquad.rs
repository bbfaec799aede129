//! Biquad (bi-quadratic) filter.
//!
//! Second-order IIR section used for tone controls, the wah band-pass, reverb
//! damping and the tuner's band-limiting tap. Coefficients follow the RBJ
//! Audio EQ Cookbook.

use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Response shape of a [`Biquad`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Second-order low-pass.
    Lowpass,
    /// Second-order high-pass.
    Highpass,
    /// Constant 0 dB peak gain band-pass.
    Bandpass,
}

impl FilterKind {
    /// Coefficients `(b0, b1, b2, a0, a1, a2)` for this response.
    pub fn coefficients(self, frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
        match self {
            FilterKind::Lowpass => lowpass_coefficients(frequency, q, sample_rate),
            FilterKind::Highpass => highpass_coefficients(frequency, q, sample_rate),
            FilterKind::Bandpass => bandpass_coefficients(frequency, q, sample_rate),
        }
    }
}

/// Direct Form I biquad:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Recomputes the coefficients for `kind` at the given cutoff and Q.
    ///
    /// The cutoff is kept strictly inside (0, Nyquist) and Q above a small
    /// positive floor so the section stays stable for any input.
    pub fn configure(&mut self, kind: FilterKind, frequency: f32, q: f32, sample_rate: f32) {
        let nyquist = sample_rate * 0.5;
        let frequency = frequency.clamp(1.0, nyquist * 0.99);
        let q = q.max(0.01);
        let (b0, b1, b2, a0, a1, a2) = kind.coefficients(frequency, q, sample_rate);
        self.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clears the filter state without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Low-pass coefficients (RBJ cookbook).
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-pass coefficients (RBJ cookbook).
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Band-pass coefficients with constant 0 dB peak gain (RBJ cookbook).
///
/// Bandwidth is `frequency / q`, so higher Q gives the narrow vocal peak a wah
/// pedal is known for.
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = alpha;
    let b1 = 0.0;
    let b2 = -alpha;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_by_default() {
        let mut biquad = Biquad::new();
        for i in 0..10 {
            let input = i as f32 * 0.1;
            assert!((biquad.process(input) - input).abs() < 1e-4);
        }
    }

    #[test]
    fn clear_zeroes_state() {
        let mut biquad = Biquad::new();
        biquad.configure(FilterKind::Lowpass, 1000.0, 0.707, 44100.0);
        for _ in 0..10 {
            biquad.process(1.0);
        }
        biquad.clear();
        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.x2, 0.0);
        assert_eq!(biquad.y1, 0.0);
        assert_eq!(biquad.y2, 0.0);
    }

    #[test]
    fn lowpass_has_unity_dc_gain() {
        let mut biquad = Biquad::new();
        biquad.configure(FilterKind::Lowpass, 3000.0, 0.707, 44100.0);
        let mut out = 0.0;
        for _ in 0..4410 {
            out = biquad.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3, "DC gain {out}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut biquad = Biquad::new();
        biquad.configure(FilterKind::Highpass, 60.0, 0.707, 44100.0);
        let mut out = 1.0;
        for _ in 0..44100 {
            out = biquad.process(1.0);
        }
        assert!(out.abs() < 1e-3, "DC leak {out}");
    }

    #[test]
    fn configure_survives_out_of_range_cutoff() {
        let mut biquad = Biquad::new();
        biquad.configure(FilterKind::Bandpass, 40_000.0, 0.0, 44100.0);
        for _ in 0..1000 {
            assert!(biquad.process(0.5).is_finite());
        }
    }
}
