//! Circular-buffer delay line with fractional reads.
//!
//! Building block for the graph's delay node (chorus, echo, reverb network).
//! The buffer is allocated once at construction and never reallocates.
//!
//! Reads happen before the current sample is written, so a delay of `d`
//! samples returns the input written `d` calls ago. The shortest possible
//! delay is one sample, which is what makes feedback loops through a delay
//! line computable sample by sample.

/// Variable-length delay line with linear interpolation.
///
/// # Example
///
/// ```rust
/// use stompbox_core::DelayLine;
///
/// let mut delay = DelayLine::new(100);
/// delay.write(1.0);
/// for _ in 0..9 {
///     delay.write(0.0);
/// }
/// // the impulse was written 10 writes ago
/// assert_eq!(delay.read(10.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Circular buffer storage
    buffer: Vec<f32>,
    /// Next write position
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line able to hold `max_delay_samples` of history.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");
        Self {
            // one extra slot for the interpolation neighbour
            buffer: vec![0.0; max_delay_samples + 2],
            write_pos: 0,
        }
    }

    /// Creates a delay line from sample rate and max delay time in seconds.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        let max_samples = (sample_rate * max_seconds).ceil().max(1.0) as usize;
        Self::new(max_samples)
    }

    /// Longest delay, in samples, that [`read`](Self::read) can honour.
    pub fn max_delay(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    /// Reads the sample `delay_samples` writes in the past.
    ///
    /// The delay is clamped to `[1, max_delay]`; fractional delays are linearly
    /// interpolated.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(1.0, self.max_delay())
        } else {
            1.0
        };

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let pos = (self.write_pos + len - delay_int) % len;
        let older = (pos + len - 1) % len;
        let a = self.buffer[pos];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Clears the delay line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_delay_returns_impulse_on_time() {
        let mut delay = DelayLine::new(64);
        let mut hit_at = None;
        for n in 0..64 {
            let out = delay.read(17.0);
            if out == 1.0 {
                hit_at = Some(n);
            }
            delay.write(if n == 0 { 1.0 } else { 0.0 });
        }
        assert_eq!(hit_at, Some(17));
    }

    #[test]
    fn fractional_delay_interpolates() {
        let mut delay = DelayLine::new(16);
        delay.write(1.0);
        delay.write(0.0);
        // impulse is 2 writes back; halfway between 1 and 2 gives half
        assert!((delay.read(1.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delay_is_clamped_to_capacity() {
        let mut delay = DelayLine::from_time(1000.0, 0.5);
        assert_eq!(delay.max_delay(), 500.0);
        delay.write(0.25);
        assert!(delay.read(1_000.0).is_finite());
        assert_eq!(delay.read(0.0), 0.25);
    }

    #[test]
    fn clear_silences_history() {
        let mut delay = DelayLine::new(8);
        for _ in 0..8 {
            delay.write(1.0);
        }
        delay.clear();
        assert_eq!(delay.read(3.0), 0.0);
    }
}
