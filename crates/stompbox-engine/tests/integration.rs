//! Integration tests for the engine controller over the mock backend.
//!
//! Each test drives the engine the way a host would: connect, push device
//! periods through `MockBackend::pump`, and call `poll` with explicit
//! instants.

use std::time::{Duration, Instant};

use stompbox_config::{EngineConfig, get_factory_preset};
use stompbox_engine::{
    ConnectionState, EngineController, EngineError, MAX_BPM, MetronomeState, PerformanceStats,
};
use stompbox_effects::{ParamKey, Pedal};
use stompbox_io::{Error, MockBackend, PermissionState};
use stompbox_tuner::TunerData;

const BLOCK: usize = 128;
const SAMPLE_RATE: f32 = 44100.0;

fn engine() -> (MockBackend, EngineController) {
    let backend = MockBackend::new();
    let engine = EngineController::new(Box::new(backend.clone()), EngineConfig::default());
    (backend, engine)
}

fn sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * (core::f32::consts::TAU * freq_hz * n as f32 / SAMPLE_RATE).sin())
        .collect()
}

/// Pumps `signal` in device-sized periods and returns the interleaved output.
fn play(backend: &MockBackend, signal: &[f32]) -> Vec<f32> {
    let mut out = Vec::with_capacity(signal.len() * 2);
    for block in signal.chunks(BLOCK) {
        out.extend(backend.pump(block, block.len()));
    }
    out
}

fn later(ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(ms)
}

#[test]
fn connect_opens_both_streams_and_passes_audio() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();

    let snap = engine.snapshot();
    assert_eq!(snap.connection, ConnectionState::Connected);
    assert!(snap.is_connected);
    assert!(!snap.is_loading);
    assert!(snap.error.is_none());

    assert_eq!(backend.input_config().unwrap().channels, 1);
    assert_eq!(backend.output_config().unwrap().channels, 2);
    assert_eq!(engine.sample_rate(), Some(44100.0));

    // every pedal off: input at master volume on both channels
    let out = backend.pump(&[0.1; BLOCK], BLOCK);
    assert_eq!(out.len(), BLOCK * 2);
    let expected = 0.1 * engine.params().volume;
    assert!(out.iter().all(|s| (s - expected).abs() < 1e-5), "{:?}", &out[..4]);
}

#[test]
fn second_connect_is_a_no_op() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    engine.connect().unwrap();
    assert_eq!(backend.open_counts(), (1, 1));
    assert!(engine.is_connected());
}

#[test]
fn disconnect_releases_devices_and_resets_readings() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    play(&backend, &[0.3; BLOCK * 4]);
    engine.poll(later(5000));
    assert!(engine.input_level() > 0.0);

    engine.disconnect();
    assert!(!backend.is_input_open());
    assert!(!backend.is_output_open());
    let snap = engine.snapshot();
    assert_eq!(snap.connection, ConnectionState::Disconnected);
    assert_eq!(snap.input_level, 0.0);
    assert_eq!(snap.tuner_data, TunerData::SILENT);
    assert_eq!(snap.performance_stats, PerformanceStats::default());
    assert!(engine.node_count().is_none());

    // idempotent, and reconnect works
    engine.disconnect();
    engine.connect().unwrap();
    assert_eq!(backend.open_counts(), (2, 2));
}

#[test]
fn disconnect_with_locked_tuner_resets_and_stays_silent() {
    let (backend, mut engine) = engine();
    engine.toggle_pedal(Pedal::Tuner);
    engine.connect().unwrap();

    play(&backend, &sine(110.0, 0.5, 8192));
    let t1 = later(1000);
    engine.poll(t1);
    assert_eq!(engine.tuner_data().note, "A");

    engine.disconnect();
    let silent = TunerData {
        frequency: 0.0,
        note: "-",
        cents: 0,
        octave: 0,
        clarity: 0.0,
    };
    assert_eq!(engine.tuner_data(), silent);
    assert_eq!(engine.scheduled_tasks(), 0);

    // polling while disconnected never brings a reading back
    for ms in [50, 500, 1500, 5000] {
        engine.poll(t1 + Duration::from_millis(ms));
        assert_eq!(engine.tuner_data(), silent);
    }
    assert!(engine.pedal_state().tuner);

    // the tuner comes back on reconnect, starting from silence
    engine.connect().unwrap();
    assert_eq!(engine.scheduled_tasks(), 3);
    assert_eq!(engine.tuner_data(), silent);
    play(&backend, &sine(110.0, 0.5, 8192));
    engine.poll(later(7000));
    assert_eq!(engine.tuner_data().note, "A");
}

#[test]
fn compressor_only_settles_wet() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    assert!(engine.toggle_pedal(Pedal::Compressor));

    let state = engine.pedal_state();
    assert!(state.compressor);
    for pedal in Pedal::ALL.into_iter().filter(|&p| p != Pedal::Compressor) {
        assert!(!state.get(pedal), "{pedal}");
    }

    // 100 ms is twenty time constants of the bypass ramp
    play(&backend, &sine(220.0, 0.3, 4410));
    let chain = engine.chain().unwrap();
    let mixer = chain.mixer(Pedal::Compressor).unwrap();
    assert!(mixer.wet_gain().gain.value() > 0.999);
    assert!(mixer.dry_gain().gain.value() < 1e-3);
    for pedal in Pedal::ALL.into_iter().filter(|p| p.has_stage() && *p != Pedal::Compressor) {
        let mixer = chain.mixer(pedal).unwrap();
        assert!(mixer.dry_gain().gain.value() > 0.999, "{pedal}");
        assert!(mixer.wet_gain().gain.value() < 1e-3, "{pedal}");
    }
}

#[test]
fn denied_permission_fails_without_opening_anything() {
    let (backend, mut engine) = engine();
    backend.set_permission(PermissionState::Denied);
    assert_eq!(engine.check_permission(), PermissionState::Denied);

    let err = engine.connect().unwrap_err();
    assert!(matches!(err, EngineError::PermissionDenied(_)));
    assert_eq!(engine.state(), ConnectionState::Disconnected);
    assert!(!engine.is_loading());
    assert!(engine.error().unwrap().starts_with("Microphone permission denied"));
    assert_eq!(backend.open_counts(), (0, 0));
}

#[test]
fn busy_input_device_is_reported() {
    let (backend, mut engine) = engine();
    backend.fail_input(Some(Error::DeviceBusy("EBUSY".into())));

    let err = engine.connect().unwrap_err();
    assert!(matches!(err, EngineError::DeviceBusy(_)));
    assert_eq!(
        engine.error(),
        Some("Audio device is in use by another application.")
    );
    assert!(!engine.is_connected());
}

#[test]
fn missing_output_device_releases_the_input() {
    let (backend, mut engine) = engine();
    backend.fail_output(Some(Error::DeviceNotFound("hw:9".into())));

    let err = engine.connect().unwrap_err();
    assert!(matches!(err, EngineError::DeviceNotFound(_)));
    assert_eq!(engine.error(), Some("No audio device found."));
    assert!(!backend.is_input_open());
    assert_eq!(engine.scheduled_tasks(), 0);

    // the next attempt clears the error
    backend.fail_output(None);
    engine.connect().unwrap();
    assert!(engine.error().is_none());
}

#[test]
fn stream_error_disconnects_on_next_poll() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    backend.emit_error("device unplugged");

    engine.poll(Instant::now());
    assert_eq!(engine.state(), ConnectionState::Disconnected);
    assert!(!backend.is_output_open());
    let message = engine.error().unwrap();
    assert!(message.starts_with("Audio connection error"), "{message}");
    assert!(message.contains("device unplugged"));
}

#[test]
fn toggling_pedals_keeps_the_graph() {
    let (_, mut engine) = engine();
    engine.connect().unwrap();
    let nodes = engine.node_count().unwrap();

    for pedal in Pedal::ALL {
        assert!(engine.toggle_pedal(pedal));
        if pedal.has_stage() {
            assert!(!engine.chain().unwrap().is_bypassed(pedal), "{pedal}");
        }
    }
    for pedal in Pedal::ALL {
        assert!(!engine.toggle_pedal(pedal));
    }
    assert_eq!(engine.node_count(), Some(nodes));
    assert!(Pedal::ALL
        .iter()
        .all(|&p| engine.chain().unwrap().is_bypassed(p)));
}

#[test]
fn toggle_while_disconnected_is_applied_on_connect() {
    let (_, mut engine) = engine();
    assert!(engine.toggle_pedal(Pedal::Delay));
    assert!(engine.pedal_state().delay);

    engine.connect().unwrap();
    assert!(!engine.chain().unwrap().is_bypassed(Pedal::Delay));
    assert!(engine.chain().unwrap().is_bypassed(Pedal::Reverb));
}

#[test]
fn update_param_clamps_and_rejects_unknown_keys() {
    let (_, mut engine) = engine();
    engine.connect().unwrap();

    engine.update_param("delay", "time", 0.5).unwrap();
    assert_eq!(engine.params().delay.time, 0.5);

    engine.update_param("delay", "time", 50.0).unwrap();
    assert_eq!(engine.params().delay.time, ParamKey::DelayTime.descriptor().max);

    let before = *engine.params();
    let err = engine.update_param("fuzz", "gain", 1.0).unwrap_err();
    assert_eq!(err.to_string(), "unknown parameter: fuzz.gain");
    assert_eq!(*engine.params(), before);
}

#[test]
fn volume_ramps_master_gain() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();

    engine.set_volume(2.0);
    assert_eq!(engine.params().volume, 1.0);
    engine.update_param("volume", "", 0.25).unwrap();
    assert_eq!(engine.params().volume, 0.25);
    assert_eq!(engine.master_gain().unwrap().gain.target(), 0.25);

    // a second of audio is well past the ramp's time constant
    let out = play(&backend, &[0.4; 44100]);
    let last = out[out.len() - 1];
    assert!((last - 0.1).abs() < 1e-3, "{last}");
}

#[test]
fn preset_sets_pedals_and_knobs() {
    let (_, mut engine) = engine();
    engine.connect().unwrap();
    engine.toggle_pedal(Pedal::Chorus);

    let blues = get_factory_preset("blues").unwrap();
    engine.apply_preset(&blues);

    assert_eq!(*engine.pedal_state(), blues.pedal_state);
    assert_eq!(*engine.params(), blues.params);
    let chain = engine.chain().unwrap();
    for pedal in Pedal::ALL.into_iter().filter(|p| p.has_stage()) {
        assert_eq!(chain.is_bypassed(pedal), !blues.pedal_state.get(pedal), "{pedal}");
    }
}

#[test]
fn preset_before_connect_builds_the_same_board() {
    let (_, mut engine) = engine();
    let metal = get_factory_preset("metal").unwrap();
    engine.apply_preset(&metal);
    engine.connect().unwrap();

    let chain = engine.chain().unwrap();
    for pedal in Pedal::ALL.into_iter().filter(|p| p.has_stage()) {
        assert_eq!(chain.is_bypassed(pedal), !metal.pedal_state.get(pedal), "{pedal}");
    }
}

#[test]
fn meter_follows_input_level() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();

    play(&backend, &[0.05; BLOCK * 2]);
    engine.poll(later(100));
    // rms 0.05 scaled by five
    assert!((engine.input_level() - 0.25).abs() < 1e-4);

    play(&backend, &[0.5; BLOCK * 2]);
    engine.poll(later(200));
    assert_eq!(engine.input_level(), 1.0);
}

#[test]
fn performance_stats_after_perf_interval() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    play(&backend, &[0.1; BLOCK * 10]);

    engine.poll(later(100));
    assert_eq!(engine.performance_stats(), PerformanceStats::default());

    engine.poll(later(3100));
    let stats = engine.performance_stats();
    assert!((stats.latency_ms - 128.0 / 44.1).abs() < 1e-3);
    assert!((stats.uptime_secs - (BLOCK * 10) as f64 / 44100.0).abs() < 1e-6);
    assert!(stats.cpu >= 0.0);
}

#[test]
fn tuner_reads_a_string_and_clears_after_hold() {
    let (backend, mut engine) = engine();
    engine.toggle_pedal(Pedal::Tuner);
    engine.connect().unwrap();
    assert_eq!(engine.scheduled_tasks(), 3);

    play(&backend, &sine(110.0, 0.5, 8192));
    let t1 = later(1000);
    engine.poll(t1);
    let reading = engine.tuner_data();
    assert_eq!(reading.note, "A");
    assert_eq!(reading.octave, 2);
    assert!(reading.cents.abs() < 5, "cents {}", reading.cents);

    // silence: the last reading holds, then drops to the sentinel
    play(&backend, &[0.0; 8192]);
    engine.poll(t1 + Duration::from_millis(500));
    assert_eq!(engine.tuner_data(), reading);
    engine.poll(t1 + Duration::from_millis(1100));
    assert_eq!(engine.tuner_data(), TunerData::SILENT);
}

#[test]
fn tuner_off_stops_readings() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    play(&backend, &sine(110.0, 0.5, 8192));
    engine.poll(later(1000));
    assert_eq!(engine.tuner_data(), TunerData::SILENT);

    engine.toggle_pedal(Pedal::Tuner);
    engine.poll(later(2000));
    assert!(engine.tuner_data().is_pitched());

    engine.toggle_pedal(Pedal::Tuner);
    assert_eq!(engine.tuner_data(), TunerData::SILENT);
    assert_eq!(engine.scheduled_tasks(), 2);
}

#[test]
fn devices_come_from_the_backend() {
    let (_, engine) = engine();
    let devices = engine.devices().unwrap();
    assert!(devices.iter().any(|d| d.name == "Mock Input" && d.is_input));
    assert_eq!(engine.backend_name(), "mock");
}

/// Rising zero crossings of the left channel.
fn rising_crossings(interleaved: &[f32]) -> usize {
    let left: Vec<f32> = interleaved.iter().step_by(2).copied().collect();
    left.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count()
}

#[test]
fn metronome_clicks_with_accent_on_the_first_beat() {
    let (backend, mut engine) = engine();
    engine.connect().unwrap();
    assert_eq!(engine.metronome(), MetronomeState::default());

    // off: silence in, silence out
    let out = play(&backend, &[0.0; 4480]);
    assert!(out.iter().all(|&s| s == 0.0));

    engine.start_metronome();
    assert!(engine.snapshot().metronome.running);
    assert_eq!(engine.metronome().beat, 0);
    let accent = play(&backend, &[0.0; 4480]);
    let peak = accent.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    assert!(peak > 0.25 && peak <= 0.3 + 1e-6, "{peak}");
    // 100 ms of 1000 Hz
    let n = rising_crossings(&accent);
    assert!((95..=105).contains(&n), "{n}");

    // one beat later at 120 BPM
    engine.poll(later(510));
    assert_eq!(engine.metronome().beat, 1);
    let beat = play(&backend, &[0.0; 4480]);
    let n = rising_crossings(&beat);
    assert!((75..=85).contains(&n), "{n}");

    engine.stop_metronome();
    engine.poll(later(2000));
    assert_eq!(engine.metronome().beat, 0);
    let out = play(&backend, &[0.0; 4480]);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn metronome_tempo_is_clamped_and_survives_reconnect() {
    let (_, mut engine) = engine();
    assert_eq!(engine.set_bpm(1000), MAX_BPM);
    engine.start_metronome();
    assert_eq!(engine.scheduled_tasks(), 0);

    engine.connect().unwrap();
    assert_eq!(engine.scheduled_tasks(), 3);
    engine.disconnect();
    assert!(engine.metronome().running);
    assert_eq!(engine.metronome().bpm, MAX_BPM);
}
