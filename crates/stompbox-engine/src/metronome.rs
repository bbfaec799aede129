//! Click metronome.
//!
//! A sine tone shaped by a decay envelope, mixed straight into the output
//! after the master volume. The controller's scheduler fires one click per
//! beat; the first beat of every bar is pitched higher.

use std::time::Duration;

/// Slowest tempo.
pub const MIN_BPM: u32 = 40;
/// Fastest tempo.
pub const MAX_BPM: u32 = 240;
/// Tempo of a fresh engine.
pub const DEFAULT_BPM: u32 = 120;
/// Clicks per bar; the first is accented.
pub const BEATS_PER_BAR: u8 = 4;

pub(crate) const ACCENT_HZ: f32 = 1000.0;
pub(crate) const BEAT_HZ: f32 = 800.0;
pub(crate) const CLICK_PEAK: f32 = 0.3;
pub(crate) const CLICK_DECAY_SECS: f32 = 0.1;

/// Metronome settings and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetronomeState {
    /// True while clicking (or set to click once connected).
    pub running: bool,
    /// Tempo in beats per minute.
    pub bpm: u32,
    /// Position of the last click in the bar, 0 = accent.
    pub beat: u8,
}

impl Default for MetronomeState {
    fn default() -> Self {
        Self {
            running: false,
            bpm: DEFAULT_BPM,
            beat: 0,
        }
    }
}

impl MetronomeState {
    /// Time between clicks.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use stompbox_engine::MetronomeState;
    ///
    /// let m = MetronomeState::default();
    /// assert_eq!(m.beat_interval(), Duration::from_millis(500));
    /// ```
    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / f64::from(self.bpm.max(1)))
    }
}

/// Clamps a tempo into `MIN_BPM..=MAX_BPM`.
pub fn clamp_bpm(bpm: u32) -> u32 {
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Tone of the click at bar position `beat`.
pub(crate) fn click_frequency(beat: u8) -> f32 {
    if beat % BEATS_PER_BAR == 0 {
        ACCENT_HZ
    } else {
        BEAT_HZ
    }
}
