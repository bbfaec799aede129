//! Observable engine state.

use stompbox_effects::{PedalParams, PedalState};
use stompbox_tuner::TunerData;

use crate::metronome::MetronomeState;

/// Lifecycle of the audio connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No streams open.
    #[default]
    Disconnected,
    /// `connect()` is in progress.
    Connecting,
    /// Streams running, graph live.
    Connected,
}

/// Health figures refreshed while connected, zero otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceStats {
    /// Render time as a percentage of the real-time budget.
    pub cpu: f32,
    /// Latency of one device buffer in milliseconds.
    pub latency_ms: f32,
    /// Audio rendered since connect, in seconds.
    pub uptime_secs: f64,
}

/// Everything a front end displays, copied out in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    /// Connection lifecycle.
    pub connection: ConnectionState,
    /// Shorthand for `connection == Connected`.
    pub is_connected: bool,
    /// True while a connect attempt runs.
    pub is_loading: bool,
    /// User-facing message of the last failure.
    pub error: Option<String>,
    /// Input level, 0..1.
    pub input_level: f32,
    /// Latest tuner reading.
    pub tuner_data: TunerData,
    /// Engaged pedals.
    pub pedal_state: PedalState,
    /// Knob values.
    pub params: PedalParams,
    /// Health figures.
    pub performance_stats: PerformanceStats,
    /// Metronome tempo and position.
    pub metronome: MetronomeState,
}
