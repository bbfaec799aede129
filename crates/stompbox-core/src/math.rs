//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared by the graph nodes, the meter and the tuner.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`rms`] - Root mean square of a block
//! - [`flush_denormal`] - Keep feedback loops out of subnormal range

use libm::{expf, logf, sqrtf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use stompbox_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Input is floored at 1e-10 (-200 dB) so silence maps to a finite level.
///
/// # Example
/// ```rust
/// use stompbox_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Root mean square of a block. Empty input is silence.
///
/// ```rust
/// use stompbox_core::rms;
///
/// assert_eq!(rms(&[]), 0.0);
/// assert!((rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
/// ```
#[inline]
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    sqrtf(sum / samples.len() as f32)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush subnormal values to zero.
///
/// Recirculating delay networks decay towards zero forever; once a value is
/// this small it is inaudible and only costs CPU.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for db in [-60.0_f32, -20.0, -6.0, 0.0, 6.0] {
            assert!((linear_to_db(db_to_linear(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn silence_is_finite_in_db() {
        assert!(linear_to_db(0.0).is_finite());
        assert!(linear_to_db(0.0) <= -199.0);
    }

    #[test]
    fn rms_of_full_scale_sine_is_root_half() {
        let n = 1000;
        let sine: Vec<f32> = (0..n)
            .map(|i| libm::sinf(2.0 * core::f32::consts::PI * i as f32 / n as f32))
            .collect();
        assert!((rms(&sine) - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn flush_denormal_zeroes_tiny_values() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(0.25), 0.25);
    }
}
