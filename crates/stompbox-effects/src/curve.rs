//! Distortion transfer curves.
//!
//! ```text
//! k    = amount · 300
//! x_i  = 2i / N - 1
//! f(x) = (3 + k) · x · 20° / (π + k·|x|)
//! ```
//!
//! The amount is quantised to hundredths before the table is computed, so the
//! cache holds at most 101 curves and every amount sharing a key shares the
//! same table. Curves are immutable and never evicted; readers on the audio
//! thread only ever see a fully built `Arc`.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use stompbox_core::graph::TransferCurve;

/// Entries per curve.
pub const CURVE_SAMPLES: usize = 8192;

/// Highest cache key.
const MAX_KEY: u8 = 100;

/// Cache key for an amount: `round(amount · 100)` clamped to `0..=100`.
///
/// Non-finite amounts map to 0.
pub fn curve_key(amount: f32) -> u8 {
    if !amount.is_finite() {
        return 0;
    }
    (amount * 100.0).round().clamp(0.0, f32::from(MAX_KEY)) as u8
}

/// Computes the table for a quantised key.
fn build_curve(key: u8) -> TransferCurve {
    let k = f32::from(key) / 100.0 * 300.0;
    let deg = PI / 180.0;
    let samples = (0..CURVE_SAMPLES)
        .map(|i| {
            let x = (i * 2) as f32 / CURVE_SAMPLES as f32 - 1.0;
            (3.0 + k) * x * 20.0 * deg / (PI + k * x.abs())
        })
        .collect();
    TransferCurve::new(samples)
}

/// Memoised curve tables keyed by quantised amount.
#[derive(Debug, Default)]
pub struct CurveCache {
    curves: Mutex<HashMap<u8, Arc<TransferCurve>>>,
}

impl CurveCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache behind [`distortion_curve`].
    pub fn global() -> &'static CurveCache {
        static GLOBAL: OnceLock<CurveCache> = OnceLock::new();
        GLOBAL.get_or_init(CurveCache::new)
    }

    /// Curve for `amount`, built on first use.
    pub fn get(&self, amount: f32) -> Arc<TransferCurve> {
        let key = curve_key(amount);
        let mut curves = self.curves.lock();
        Arc::clone(
            curves
                .entry(key)
                .or_insert_with(|| Arc::new(build_curve(key))),
        )
    }

    /// Number of cached curves.
    pub fn len(&self) -> usize {
        self.curves.lock().len()
    }

    /// True if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.curves.lock().is_empty()
    }
}

/// Shared distortion curve for `amount` (nominally 0..1).
///
/// ```rust
/// use std::sync::Arc;
/// use stompbox_effects::distortion_curve;
///
/// let a = distortion_curve(0.5);
/// let b = distortion_curve(0.504);
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(a.len(), 8192);
/// ```
pub fn distortion_curve(amount: f32) -> Arc<TransferCurve> {
    CurveCache::global().get(amount)
}
