//! Engine controller: connection lifecycle and live control of the board.
//!
//! The controller lives on the host thread. `connect()` opens the capture
//! stream, builds and compiles the pedalboard graph and hands the renderer
//! to the output stream's callback. From then on the host only touches
//! shared state: parameter automation, curve slots and analyser taps.
//!
//! ```text
//! input callback ──► bounded queue ──► output callback
//!                                      GraphRenderer::render
//!                                      mono ─► every output channel
//! ```
//!
//! Periodic work (level meter, tuner, performance stats, metronome clicks)
//! runs inside [`EngineController::poll`], which the host calls from its own
//! loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use stompbox_config::{EngineConfig, Preset};
use stompbox_core::graph::{
    AnalyserNode, AudioClock, DecayNode, GainNode, GraphRenderer, OscillatorNode, RenderLoad,
};
use stompbox_effects::{EffectChain, PARAM_TIME_CONSTANT, ParamKey, Pedal, PedalParams, PedalState};
use stompbox_io::{
    AudioBackend, AudioDevice, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback,
    PermissionState, StreamHandle,
};
use stompbox_tuner::{Algorithm, PitchEstimator, TunerConfig, TunerData};

use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::metronome::{BEATS_PER_BAR, MetronomeState, clamp_bpm, click_frequency};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::snapshot::{ConnectionState, EngineSnapshot, PerformanceStats};

/// Input level shown for a full-scale RMS of 0.2.
const METER_SCALE: f32 = 5.0;

/// Pending stream error messages kept between polls.
const ERROR_QUEUE: usize = 16;

/// Periodic jobs of a connected engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineTask {
    Meter,
    Tuner,
    Performance,
    Click,
}

/// Everything that exists only while connected.
struct Session {
    // stream handles first: dropping them stops the callbacks
    _input: StreamHandle,
    _output: StreamHandle,
    chain: EffectChain,
    master: GainNode,
    meter: AnalyserNode,
    tuner_tap: AnalyserNode,
    tuner_buf: Vec<f32>,
    click_tone: OscillatorNode,
    click: DecayNode,
    clock: AudioClock,
    load: RenderLoad,
    sample_rate: f32,
    node_count: usize,
    dropped: Arc<AtomicU64>,
    dropped_seen: u64,
    errors: Receiver<String>,
}

fn tuner_config(config: &EngineConfig) -> TunerConfig {
    TunerConfig {
        noise_floor: config.tuner.noise_floor,
        yin_threshold: config.tuner.yin_threshold,
        clarity_threshold: config.tuner.clarity_threshold,
        smoothing: config.tuner.smoothing,
        algorithm: Algorithm::Hybrid,
    }
}

fn error_sink(tx: Sender<String>, direction: &'static str) -> ErrorCallback {
    Box::new(move |message: &str| {
        let _ = tx.try_send(format!("{direction} stream: {message}"));
    })
}

fn capture_callback(tx: Sender<f32>, dropped: Arc<AtomicU64>) -> InputCallback {
    Box::new(move |data: &[f32]| {
        for &sample in data {
            if tx.try_send(sample).is_err() {
                dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    })
}

/// Output callback: drain captured samples, render, fan mono out.
///
/// Scratch buffers are sized once here; the callback itself never allocates.
fn render_callback(
    mut renderer: GraphRenderer,
    rx: Receiver<f32>,
    block: usize,
    channels: usize,
) -> OutputCallback {
    let block = block.max(1);
    let channels = channels.max(1);
    let mut input = vec![0.0_f32; block];
    let mut mono = vec![0.0_f32; block];
    Box::new(move |data: &mut [f32]| {
        // drift guard: past two spare blocks, drop back to one
        let needed = data.len() / channels;
        let backlog = rx.len();
        if backlog > needed + 2 * block {
            for _ in 0..backlog - needed - block {
                let _ = rx.try_recv();
            }
        }

        for chunk in data.chunks_mut(block * channels) {
            let frames = chunk.len() / channels;
            for s in &mut input[..frames] {
                *s = rx.try_recv().unwrap_or(0.0);
            }
            renderer.render(&input[..frames], &mut mono[..frames]);
            for (frame, &s) in chunk.chunks_mut(channels).zip(&mono[..frames]) {
                frame.fill(s);
            }
        }
    })
}

/// Owns the audio connection and the board state.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use stompbox_config::EngineConfig;
/// use stompbox_effects::Pedal;
/// use stompbox_engine::EngineController;
/// use stompbox_io::MockBackend;
///
/// let backend = MockBackend::new();
/// let mut engine = EngineController::new(Box::new(backend.clone()), EngineConfig::default());
/// engine.connect().unwrap();
///
/// engine.toggle_pedal(Pedal::Delay);
/// engine.update_param("delay", "time", 0.5).unwrap();
///
/// backend.pump(&[0.25; 128], 128);
/// engine.poll(Instant::now() + Duration::from_millis(100));
/// assert!(engine.snapshot().input_level > 0.0);
///
/// engine.disconnect();
/// assert!(!backend.is_input_open());
/// ```
pub struct EngineController {
    backend: Box<dyn AudioBackend>,
    config: EngineConfig,
    connection: ConnectionState,
    is_loading: bool,
    error: Option<String>,
    pedal_state: PedalState,
    params: PedalParams,
    input_level: f32,
    tuner_data: TunerData,
    last_pitch_at: Option<Instant>,
    performance: PerformanceStats,
    estimator: PitchEstimator,
    scheduler: Scheduler<EngineTask>,
    tuner_task: Option<TaskHandle>,
    metronome: MetronomeState,
    next_beat: u8,
    click_task: Option<TaskHandle>,
    session: Option<Session>,
}

impl core::fmt::Debug for EngineController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineController")
            .field("backend", &self.backend.name())
            .field("connection", &self.connection)
            .field("error", &self.error)
            .field("tasks", &self.scheduler.len())
            .field("metronome", &self.metronome)
            .finish_non_exhaustive()
    }
}

impl EngineController {
    /// Disconnected controller with every pedal off and default knobs.
    pub fn new(backend: Box<dyn AudioBackend>, config: EngineConfig) -> Self {
        let estimator = PitchEstimator::new(tuner_config(&config));
        Self {
            backend,
            config,
            connection: ConnectionState::Disconnected,
            is_loading: false,
            error: None,
            pedal_state: PedalState::default(),
            params: PedalParams::default(),
            input_level: 0.0,
            tuner_data: TunerData::SILENT,
            last_pitch_at: None,
            performance: PerformanceStats::default(),
            estimator,
            scheduler: Scheduler::new(),
            tuner_task: None,
            metronome: MetronomeState::default(),
            next_beat: 0,
            click_task: None,
            session: None,
        }
    }

    /// Opens the devices and starts processing.
    ///
    /// A no-op while connected. On failure the engine is left disconnected,
    /// every partially opened device is released and the user-facing message
    /// is kept in [`error`](Self::error).
    pub fn connect(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.connection = ConnectionState::Connecting;
        self.is_loading = true;
        self.error = None;

        let result = self.open_session();
        self.is_loading = false;

        match result {
            Ok(session) => {
                tracing::info!(
                    backend = self.backend.name(),
                    sample_rate = session.sample_rate,
                    buffer_size = self.config.buffer_size,
                    nodes = session.node_count,
                    "audio engine connected"
                );
                self.session = Some(session);
                self.connection = ConnectionState::Connected;
                self.start_tasks(Instant::now());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio connection failed");
                self.disconnect();
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    fn open_session(&self) -> Result<Session> {
        if self.backend.permission_state() == PermissionState::Denied {
            return Err(EngineError::PermissionDenied(
                "capture access denied".to_string(),
            ));
        }

        let config = &self.config;
        let block = config.buffer_size as usize;
        let input_config = BackendStreamConfig {
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
            channels: 1,
            device_name: config.input_device.clone(),
        };

        let (audio_tx, audio_rx) = crossbeam_channel::bounded::<f32>(block * config.input_queue_blocks);
        let (error_tx, error_rx) = crossbeam_channel::bounded::<String>(ERROR_QUEUE);
        let dropped = Arc::new(AtomicU64::new(0));

        let input = self.backend.build_input_stream(
            &input_config,
            capture_callback(audio_tx, Arc::clone(&dropped)),
            error_sink(error_tx.clone(), "input"),
        )?;

        let sample_rate = self.backend.actual_sample_rate(&input_config) as f32;
        let board = Board::build(sample_rate, &self.params, &self.pedal_state, config)?;
        let renderer = board.graph.compile()?;
        tracing::debug!(nodes = renderer.node_count(), "pedalboard graph compiled");
        let clock = renderer.clock().clone();
        let load = renderer.load().clone();

        let output_config = BackendStreamConfig {
            channels: config.output_channels,
            device_name: config.output_device.clone(),
            ..input_config
        };
        let output = self.backend.build_output_stream(
            &output_config,
            render_callback(renderer, audio_rx, block, usize::from(config.output_channels)),
            error_sink(error_tx, "output"),
        )?;

        Ok(Session {
            _input: input,
            _output: output,
            node_count: board.graph.node_count(),
            chain: board.chain,
            master: board.master,
            meter: board.meter,
            tuner_buf: vec![0.0; config.tuner_buffer_size],
            tuner_tap: board.tuner_tap,
            click_tone: board.click_tone,
            click: board.click,
            clock,
            load,
            sample_rate,
            dropped,
            dropped_seen: 0,
            errors: error_rx,
        })
    }

    fn start_tasks(&mut self, now: Instant) {
        self.scheduler
            .every(EngineTask::Meter, self.config.meter_interval(), now);
        self.scheduler
            .every(EngineTask::Performance, self.config.perf_interval(), now);
        if self.pedal_state.tuner {
            self.start_tuner(now);
        }
        if self.metronome.running {
            self.schedule_clicks(now);
        }
    }

    fn start_tuner(&mut self, now: Instant) {
        if self.tuner_task.is_none() {
            self.estimator.reset();
            self.last_pitch_at = None;
            self.tuner_task = Some(self.scheduler.every(
                EngineTask::Tuner,
                self.config.tuner_interval(),
                now,
            ));
        }
    }

    fn stop_tuner(&mut self) {
        if let Some(handle) = self.tuner_task.take() {
            self.scheduler.cancel(handle);
        }
        self.estimator.reset();
        self.last_pitch_at = None;
        self.tuner_data = TunerData::SILENT;
    }

    /// Starts the metronome. The first click sounds immediately when
    /// connected; otherwise clicking begins one beat after `connect()`.
    pub fn start_metronome(&mut self) {
        if self.metronome.running {
            return;
        }
        self.metronome.running = true;
        self.next_beat = 0;
        if self.session.is_some() {
            self.click();
            self.schedule_clicks(Instant::now());
        }
        tracing::debug!(bpm = self.metronome.bpm, "metronome started");
    }

    /// Stops the metronome and rewinds to the first beat.
    pub fn stop_metronome(&mut self) {
        if let Some(handle) = self.click_task.take() {
            self.scheduler.cancel(handle);
        }
        self.metronome.running = false;
        self.metronome.beat = 0;
        self.next_beat = 0;
    }

    /// Sets the tempo, clamped to 40..=240 BPM, and returns the value used.
    ///
    /// A running metronome keeps its bar position; the next click comes one
    /// new beat interval from now.
    pub fn set_bpm(&mut self, bpm: u32) -> u32 {
        self.metronome.bpm = clamp_bpm(bpm);
        if self.click_task.is_some() {
            self.schedule_clicks(Instant::now());
        }
        self.metronome.bpm
    }

    fn schedule_clicks(&mut self, now: Instant) {
        if let Some(handle) = self.click_task.take() {
            self.scheduler.cancel(handle);
        }
        self.click_task = Some(self.scheduler.every(
            EngineTask::Click,
            self.metronome.beat_interval(),
            now,
        ));
    }

    fn click(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let beat = self.next_beat;
        session.click_tone.frequency.set_value(click_frequency(beat));
        session.click.trigger();
        self.metronome.beat = beat;
        self.next_beat = (beat + 1) % BEATS_PER_BAR;
    }

    /// Stops processing and releases the devices.
    ///
    /// Idempotent. Readings go back to zero; a stored error stays visible.
    pub fn disconnect(&mut self) {
        self.scheduler.cancel_all();
        self.tuner_task = None;
        self.click_task = None;
        self.metronome.beat = 0;
        self.next_beat = 0;
        let was_connected = self.session.take().is_some();

        self.connection = ConnectionState::Disconnected;
        self.input_level = 0.0;
        self.tuner_data = TunerData::SILENT;
        self.last_pitch_at = None;
        self.performance = PerformanceStats::default();
        self.estimator.reset();

        if was_connected {
            tracing::info!("audio engine disconnected");
        }
    }

    /// Flips `pedal` and returns its new engaged state.
    ///
    /// While disconnected only the stored state changes.
    pub fn toggle_pedal(&mut self, pedal: Pedal) -> bool {
        let engaged = self.pedal_state.toggle(pedal);

        if pedal == Pedal::Tuner {
            if engaged && self.session.is_some() {
                self.start_tuner(Instant::now());
            } else if !engaged {
                self.stop_tuner();
            }
        } else if let Some(session) = self.session.as_mut() {
            session.chain.set_bypass(pedal, !engaged);
        } else {
            tracing::debug!(%pedal, "{}", EngineError::GraphNotReady);
        }

        tracing::debug!(%pedal, engaged, "pedal toggled");
        engaged
    }

    /// Sets `effect.field` from the string boundary.
    ///
    /// Unknown pairs are rejected; values are clamped into range.
    pub fn update_param(&mut self, effect: &str, field: &str, value: f32) -> Result<()> {
        let key = ParamKey::parse(effect, field).ok_or_else(|| {
            EngineError::UnknownParam(stompbox_effects::UnknownParam {
                effect: effect.to_string(),
                field: field.to_string(),
            })
        })?;
        self.update(key, value);
        Ok(())
    }

    /// Sets one knob, clamped into its range, and pushes it live.
    pub fn update(&mut self, key: ParamKey, value: f32) {
        if key == ParamKey::Volume {
            self.set_volume(value);
            return;
        }
        let value = key.descriptor().clamp(value);
        self.params.set(key, value);
        match &self.session {
            Some(session) => session.chain.apply(key, &self.params),
            None => tracing::debug!(%key, "{}", EngineError::GraphNotReady),
        }
    }

    /// Sets the master volume, clamped to 0..1.
    pub fn set_volume(&mut self, value: f32) {
        let value = ParamKey::Volume.descriptor().clamp(value);
        self.params.volume = value;
        if let Some(session) = &self.session {
            session
                .master
                .gain
                .set_target_at_time(value, PARAM_TIME_CONSTANT);
        }
    }

    /// Loads a whole board: pedal switches, every knob, volume.
    pub fn apply_preset(&mut self, preset: &Preset) {
        let changed: Vec<Pedal> = self.pedal_state.diff(&preset.pedal_state).collect();
        for pedal in changed {
            self.toggle_pedal(pedal);
        }
        for key in ParamKey::ALL {
            if key != ParamKey::Volume {
                self.update(key, preset.params.get(key));
            }
        }
        self.set_volume(preset.params.volume);
        tracing::info!(preset = %preset.id, "preset applied");
    }

    /// Capture permission as reported by the backend.
    pub fn check_permission(&self) -> PermissionState {
        self.backend.permission_state()
    }

    /// Devices visible to the backend.
    pub fn devices(&self) -> Result<Vec<AudioDevice>> {
        Ok(self.backend.list_devices()?)
    }

    /// Runs the periodic tasks that are due at `now`.
    ///
    /// A stream failure reported since the last poll disconnects the engine.
    pub fn poll(&mut self, now: Instant) {
        let failure = self
            .session
            .as_ref()
            .and_then(|s| s.errors.try_recv().ok());
        if let Some(message) = failure {
            tracing::warn!(error = %message, "audio stream failed");
            self.disconnect();
            self.error = Some(EngineError::Backend(message).user_message());
            return;
        }

        for task in self.scheduler.due(now) {
            match task {
                EngineTask::Meter => self.update_meter(),
                EngineTask::Tuner => self.update_tuner(now),
                EngineTask::Performance => self.update_performance(),
                EngineTask::Click => self.click(),
            }
        }
    }

    fn update_meter(&mut self) {
        if let Some(session) = &self.session {
            let rms = session.meter.tap().rms(self.config.meter_window);
            self.input_level = (rms * METER_SCALE).min(1.0);
        }
    }

    fn update_tuner(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.tuner_tap.tap().time_domain_data(&mut session.tuner_buf);
        let reading = self
            .estimator
            .process(&session.tuner_buf, session.sample_rate);

        if reading.is_pitched() {
            self.tuner_data = reading;
            self.last_pitch_at = Some(now);
        } else {
            let expired = self
                .last_pitch_at
                .is_none_or(|t| now.saturating_duration_since(t) >= self.config.tuner_hold());
            if expired {
                self.tuner_data = TunerData::SILENT;
            }
        }
    }

    fn update_performance(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let dropped = session.dropped.load(Ordering::Relaxed);
        if dropped > session.dropped_seen {
            tracing::warn!(
                samples = dropped - session.dropped_seen,
                "input queue full, samples dropped"
            );
            session.dropped_seen = dropped;
        }
        self.performance = PerformanceStats {
            cpu: session.load.percent(),
            latency_ms: self.config.buffer_size as f32 * 1000.0 / session.sample_rate,
            uptime_secs: session.clock.seconds(),
        };
    }

    /// Copy of everything a front end shows.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            connection: self.connection,
            is_connected: self.is_connected(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            input_level: self.input_level,
            tuner_data: self.tuner_data,
            pedal_state: self.pedal_state,
            params: self.params,
            performance_stats: self.performance,
            metronome: self.metronome,
        }
    }

    /// Connection lifecycle.
    pub fn state(&self) -> ConnectionState {
        self.connection
    }

    /// True while streams are running.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// True while `connect()` runs.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// User-facing message of the last failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Engaged pedals.
    pub fn pedal_state(&self) -> &PedalState {
        &self.pedal_state
    }

    /// Knob values.
    pub fn params(&self) -> &PedalParams {
        &self.params
    }

    /// Latest input level, 0..1.
    pub fn input_level(&self) -> f32 {
        self.input_level
    }

    /// Latest tuner reading.
    pub fn tuner_data(&self) -> TunerData {
        self.tuner_data
    }

    /// Latest health figures.
    pub fn performance_stats(&self) -> PerformanceStats {
        self.performance
    }

    /// Metronome tempo and position.
    pub fn metronome(&self) -> MetronomeState {
        self.metronome
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the audio backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Graph node count while connected.
    pub fn node_count(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.node_count)
    }

    /// Sample rate of the running graph.
    pub fn sample_rate(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.sample_rate)
    }

    /// Live effect chain, for inspection.
    pub fn chain(&self) -> Option<&EffectChain> {
        self.session.as_ref().map(|s| &s.chain)
    }

    /// Live master gain node.
    pub fn master_gain(&self) -> Option<&GainNode> {
        self.session.as_ref().map(|s| &s.master)
    }

    /// Number of periodic tasks currently scheduled.
    pub fn scheduled_tasks(&self) -> usize {
        self.scheduler.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stompbox_io::MockBackend;

    fn engine() -> (MockBackend, EngineController) {
        let backend = MockBackend::new();
        let engine = EngineController::new(Box::new(backend.clone()), EngineConfig::default());
        (backend, engine)
    }

    #[test]
    fn starts_disconnected_and_silent() {
        let (_, engine) = engine();
        let snap = engine.snapshot();
        assert_eq!(snap.connection, ConnectionState::Disconnected);
        assert!(!snap.is_connected && !snap.is_loading);
        assert_eq!(snap.tuner_data, TunerData::SILENT);
        assert_eq!(snap.performance_stats, PerformanceStats::default());
        assert!(engine.node_count().is_none());
    }

    #[test]
    fn connect_schedules_meter_and_perf_only() {
        let (_, mut engine) = engine();
        engine.connect().unwrap();
        assert_eq!(engine.scheduled_tasks(), 2);
        engine.toggle_pedal(Pedal::Tuner);
        assert_eq!(engine.scheduled_tasks(), 3);
        engine.toggle_pedal(Pedal::Tuner);
        assert_eq!(engine.scheduled_tasks(), 2);
        engine.start_metronome();
        assert_eq!(engine.scheduled_tasks(), 3);
        engine.set_bpm(90);
        assert_eq!(engine.scheduled_tasks(), 3);
        engine.disconnect();
        assert_eq!(engine.scheduled_tasks(), 0);
        assert!(engine.metronome().running);
    }

    #[test]
    fn render_callback_fans_out_to_all_channels() {
        let mut g = stompbox_core::graph::AudioGraph::new(44100.0);
        let (src, dst) = (g.source(), g.destination());
        g.connect(src, dst).unwrap();
        let renderer = g.compile().unwrap();

        let (tx, rx) = crossbeam_channel::bounded(64);
        for s in [0.1, 0.2, 0.3] {
            tx.send(s).unwrap();
        }
        let mut callback = render_callback(renderer, rx, 2, 2);
        let mut out = vec![9.0; 8];
        callback(&mut out);
        // three queued samples, the fourth frame underruns to silence
        assert_eq!(out, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.0, 0.0]);
    }

    #[test]
    fn render_callback_trims_backlog() {
        let mut g = stompbox_core::graph::AudioGraph::new(44100.0);
        let (src, dst) = (g.source(), g.destination());
        g.connect(src, dst).unwrap();
        let renderer = g.compile().unwrap();

        let (tx, rx) = crossbeam_channel::bounded(64);
        for i in 0..20 {
            tx.send(i as f32).unwrap();
        }
        let mut callback = render_callback(renderer, rx, 2, 1);
        let mut out = vec![0.0; 4];
        callback(&mut out);
        // backlog 20 > 4 + 2 * 2: trimmed to 4 + 2, one block stays queued
        assert_eq!(out, vec![14.0, 15.0, 16.0, 17.0]);
        callback(&mut out);
        assert_eq!(out, vec![18.0, 19.0, 0.0, 0.0]);
    }

    #[test]
    fn tuner_hold_keeps_last_reading() {
        let (backend, mut engine) = engine();
        engine.toggle_pedal(Pedal::Tuner);
        engine.connect().unwrap();

        let t0 = Instant::now();
        let reading = TunerData {
            frequency: 110.0,
            note: "A",
            cents: 0,
            octave: 2,
            clarity: 0.9,
        };
        engine.tuner_data = reading;
        engine.last_pitch_at = Some(t0);

        // silence in the tap: reading held until the hold time passes
        backend.pump(&[0.0; 128], 128);
        engine.update_tuner(t0 + Duration::from_millis(500));
        assert_eq!(engine.tuner_data(), reading);
        engine.update_tuner(t0 + Duration::from_millis(1000));
        assert_eq!(engine.tuner_data(), TunerData::SILENT);
    }
}
