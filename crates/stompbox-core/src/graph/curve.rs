//! Transfer curves for the wave-shaper node.

/// Immutable lookup table mapping input in `[-1, 1]` to output.
///
/// Entry `i` of an `N`-entry table is the output for input `2i/(N-1) - 1`.
/// Inputs between entries are linearly interpolated; inputs outside `[-1, 1]`
/// use the end entries.
///
/// ```rust
/// use stompbox_core::graph::TransferCurve;
///
/// let curve = TransferCurve::new(vec![-1.0, 0.0, 1.0]);
/// assert_eq!(curve.lookup(0.5), 0.5);
/// assert_eq!(curve.lookup(4.0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCurve {
    samples: Vec<f32>,
}

impl TransferCurve {
    /// Wraps a table of samples.
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Table entries.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True for an empty table, which shapes nothing.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Shapes one sample.
    #[inline]
    pub fn lookup(&self, x: f32) -> f32 {
        let n = self.samples.len();
        match n {
            0 => return x,
            1 => return self.samples[0],
            _ => {}
        }

        let x = if x.is_finite() { x.clamp(-1.0, 1.0) } else { 0.0 };
        let pos = (x + 1.0) * 0.5 * (n - 1) as f32;
        let i = pos as usize;
        if i >= n - 1 {
            return self.samples[n - 1];
        }
        let frac = pos - i as f32;
        let a = self.samples[i];
        let b = self.samples[i + 1];
        a + (b - a) * frac
    }
}
