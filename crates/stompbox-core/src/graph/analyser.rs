//! Lock-free time-domain taps.
//!
//! The render thread appends every sample that passes through an analyser
//! node to a ring of atomics; any other thread can copy out the most recent
//! window at any time. Readers may observe a window that straddles a block
//! boundary, which is harmless for metering and pitch detection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::math::rms;

#[derive(Debug)]
struct TapShared {
    ring: Box<[AtomicU32]>,
    mask: usize,
    size: usize,
    /// Total samples written; ring index is `written & mask`.
    written: AtomicUsize,
}

/// Shared ring holding the newest `size` samples seen by an analyser node.
#[derive(Debug, Clone)]
pub struct AnalyserTap {
    shared: Arc<TapShared>,
}

impl AnalyserTap {
    /// Creates a tap holding `size` samples (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let capacity = size.next_power_of_two();
        let ring = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        Self {
            shared: Arc::new(TapShared {
                ring,
                mask: capacity - 1,
                size,
                written: AtomicUsize::new(0),
            }),
        }
    }

    /// Window size requested at construction.
    pub fn size(&self) -> usize {
        self.shared.size
    }

    /// Total samples pushed so far.
    pub fn samples_written(&self) -> usize {
        self.shared.written.load(Ordering::Acquire)
    }

    /// Appends one sample. Single writer: the renderer.
    #[inline]
    pub(crate) fn push(&self, sample: f32) {
        let shared = &*self.shared;
        let w = shared.written.load(Ordering::Relaxed);
        shared.ring[w & shared.mask].store(sample.to_bits(), Ordering::Relaxed);
        shared.written.store(w.wrapping_add(1), Ordering::Release);
    }

    /// Copies the newest `min(buf.len(), size)` samples into the start of
    /// `buf`, oldest first. Positions never written read as zero; the rest
    /// of `buf` is zeroed. Returns the number of samples copied.
    pub fn time_domain_data(&self, buf: &mut [f32]) -> usize {
        let shared = &*self.shared;
        let n = buf.len().min(shared.size);
        let written = shared.written.load(Ordering::Acquire);

        for (i, slot) in buf.iter_mut().enumerate().take(n) {
            // absolute index of this sample in the write history
            let back = n - i;
            *slot = if back > written {
                0.0
            } else {
                let idx = (written - back) & shared.mask;
                f32::from_bits(shared.ring[idx].load(Ordering::Relaxed))
            };
        }
        buf[n..].fill(0.0);
        n
    }

    /// RMS of the newest `window` samples.
    pub fn rms(&self, window: usize) -> f32 {
        let mut buf = vec![0.0; window.min(self.shared.size)];
        self.time_domain_data(&mut buf);
        rms(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_newest_samples_oldest_first() {
        let tap = AnalyserTap::new(4);
        for i in 0..10 {
            tap.push(i as f32);
        }
        let mut buf = [0.0; 4];
        assert_eq!(tap.time_domain_data(&mut buf), 4);
        assert_eq!(buf, [6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn unwritten_history_reads_as_zero() {
        let tap = AnalyserTap::new(8);
        tap.push(1.0);
        tap.push(2.0);
        let mut buf = [9.0; 4];
        tap.time_domain_data(&mut buf);
        assert_eq!(buf, [0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn window_is_limited_to_size() {
        let tap = AnalyserTap::new(3);
        for i in 0..5 {
            tap.push(i as f32);
        }
        let mut buf = [7.0; 5];
        assert_eq!(tap.time_domain_data(&mut buf), 3);
        assert_eq!(buf, [2.0, 3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn rms_of_constant() {
        let tap = AnalyserTap::new(128);
        for _ in 0..200 {
            tap.push(-0.5);
        }
        assert!((tap.rms(128) - 0.5).abs() < 1e-6);
    }
}
