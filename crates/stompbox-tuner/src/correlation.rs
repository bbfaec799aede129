//! FFT-backed correlation kernels for pitch detection.
//!
//! Both kernels replace an O(n · lags) direct sum with the cross-correlation
//! theorem:
//!
//! ```text
//! R_ab(τ) = IFFT( conj(A(f)) · B(f) )[τ]
//! ```
//!
//! with zero padding so the circular result does not wrap into the lags we
//! read. Work is done in `f64`: the YIN difference is a small number obtained
//! by subtracting large energy sums, and single precision loses it.
//!
//! Plans, spectra and scratch space are kept between calls; a call only
//! allocates when the input length changes.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Cached forward/inverse plans for one transform size.
struct Plan {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

/// Reusable correlation engine.
pub struct Correlator {
    planner: FftPlanner<f64>,
    plan: Option<Plan>,
    a: Vec<Complex<f64>>,
    b: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl core::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Correlator")
            .field("size", &self.plan.as_ref().map(|p| p.size))
            .finish_non_exhaustive()
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    /// Creates a correlator with no plan yet.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            plan: None,
            a: Vec::new(),
            b: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Makes sure plans and buffers exist for `size`.
    fn prepare(&mut self, size: usize) {
        if self.plan.as_ref().is_some_and(|p| p.size == size) {
            return;
        }
        let forward = self.planner.plan_fft_forward(size);
        let inverse = self.planner.plan_fft_inverse(size);
        let scratch = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        self.a = vec![Complex::default(); size];
        self.b = vec![Complex::default(); size];
        self.scratch = vec![Complex::default(); scratch];
        self.plan = Some(Plan {
            size,
            forward,
            inverse,
        });
    }

    fn load(buf: &mut [Complex<f64>], samples: &[f32]) {
        for (slot, &s) in buf.iter_mut().zip(samples) {
            *slot = Complex::new(f64::from(s), 0.0);
        }
        buf[samples.len()..].fill(Complex::default());
    }

    /// YIN difference function.
    ///
    /// ```text
    /// d(τ) = Σ_{j<W} (x[j] - x[j+τ])²  =  E₀ + E(τ) - 2·r(τ)
    /// ```
    ///
    /// for `τ` in `0..window`, where `W = window`, `E₀` is the energy of the
    /// first window, `E(τ)` the energy of the window starting at `τ` (kept as a
    /// running sum) and `r(τ)` the cross-correlation of the first window with
    /// the whole buffer. Requires `2 * window - 1 <= x.len()`. `out` is resized
    /// to `window`.
    pub fn difference(&mut self, x: &[f32], window: usize, out: &mut Vec<f64>) {
        out.clear();
        out.resize(window, 0.0);
        if window == 0 || x.len() < 2 * window - 1 {
            return;
        }

        let size = (x.len() + window).next_power_of_two();
        self.prepare(size);
        let Some(plan) = &self.plan else { return };

        Self::load(&mut self.a, &x[..window]);
        Self::load(&mut self.b, x);
        plan.forward.process_with_scratch(&mut self.a, &mut self.scratch);
        plan.forward.process_with_scratch(&mut self.b, &mut self.scratch);
        for (ca, cb) in self.a.iter_mut().zip(&self.b) {
            *ca = ca.conj() * cb;
        }
        plan.inverse.process_with_scratch(&mut self.a, &mut self.scratch);
        let norm = 1.0 / size as f64;

        let sq = |i: usize| {
            let v = f64::from(x[i]);
            v * v
        };
        let e0: f64 = (0..window).map(sq).sum();
        let mut e_tau = e0;
        for tau in 1..window {
            e_tau += sq(tau + window - 1) - sq(tau - 1);
            let r = self.a[tau].re * norm;
            out[tau] = (e0 + e_tau - 2.0 * r).max(0.0);
        }
    }

    /// Raw autocorrelation `r(k) = Σ_{i<n-k} x[i]·x[i+k]` for `k` in
    /// `0..lags`. `out` is resized to `lags`.
    pub fn autocorrelation(&mut self, x: &[f32], lags: usize, out: &mut Vec<f64>) {
        out.clear();
        out.resize(lags, 0.0);
        if x.is_empty() || lags == 0 {
            return;
        }

        let size = (2 * x.len()).next_power_of_two();
        self.prepare(size);
        let Some(plan) = &self.plan else { return };

        Self::load(&mut self.a, x);
        plan.forward.process_with_scratch(&mut self.a, &mut self.scratch);
        for c in &mut self.a {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        plan.inverse.process_with_scratch(&mut self.a, &mut self.scratch);
        let norm = 1.0 / size as f64;

        let valid = lags.min(x.len());
        for (k, slot) in out.iter_mut().enumerate().take(valid) {
            *slot = self.a[k].re * norm;
        }
    }
}
