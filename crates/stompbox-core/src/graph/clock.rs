//! Render-side counters shared with the control thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Frames rendered since the graph was compiled.
#[derive(Debug, Clone)]
pub struct AudioClock {
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl AudioClock {
    pub(crate) fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    /// Total frames rendered.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Rendered time in seconds.
    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Sample rate the clock counts at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub(crate) fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}

/// Fraction of the real-time budget the last block took, in percent.
#[derive(Debug, Clone, Default)]
pub struct RenderLoad {
    bits: Arc<AtomicU32>,
}

impl RenderLoad {
    /// Last measured load in percent (0 before the first block).
    pub fn percent(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub(crate) fn store(&self, percent: f32) {
        self.bits.store(percent.to_bits(), Ordering::Relaxed);
    }
}
