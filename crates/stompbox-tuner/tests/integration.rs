//! Integration tests for stompbox-tuner.
//!
//! Feeds tones through an analyser tap on a compiled graph, the way the
//! engine's tuner reads the dry input, and checks the resulting readings.

use stompbox_core::graph::AudioGraph;
use stompbox_tuner::{
    Algorithm, PitchEstimator, TunerConfig, TunerData, TuningDirection, midi_to_frequency,
};

const SAMPLE_RATE: f32 = 44100.0;
const WINDOW: usize = 4096;
const TAU: f32 = core::f32::consts::TAU;

fn sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

/// Plucked-string-like tone: decaying harmonics 1..=5.
fn plucked(freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE;
            let env = libm::expf(-t * 0.5);
            (1..=5)
                .map(|h| {
                    let h = h as f32;
                    libm::sinf(TAU * freq_hz * h * t) * 0.4 / h
                })
                .sum::<f32>()
                * env
        })
        .collect()
}

/// Renders `signal` through source -> analyser and returns the tap window.
fn capture_through_analyser(signal: &[f32]) -> Vec<f32> {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let analyser = graph.create_analyser(WINDOW);
    graph.connect(graph.source(), analyser.id()).unwrap();
    graph.connect(analyser.id(), graph.destination()).unwrap();
    let mut renderer = graph.compile().unwrap();

    let mut out = vec![0.0; 256];
    for block in signal.chunks(256) {
        renderer.render(block, &mut out[..block.len()]);
    }

    let mut window = vec![0.0; WINDOW];
    analyser.tap().time_domain_data(&mut window);
    window
}

#[test]
fn a2_through_analyser_reads_as_a2() {
    let window = capture_through_analyser(&sine(110.0, 0.5, WINDOW * 2));
    let mut tuner = PitchEstimator::default();
    let data = tuner.process(&window, SAMPLE_RATE);

    assert_eq!(data.note, "A");
    assert_eq!(data.octave, 2);
    assert!(data.cents.abs() < 5, "cents {}", data.cents);
    assert!(data.clarity > tuner.config().clarity_threshold);
}

#[test]
fn every_open_string_is_recognised() {
    let expected = [
        (82.41, "E", 2),
        (110.0, "A", 2),
        (146.83, "D", 3),
        (196.0, "G", 3),
        (246.94, "B", 3),
        (329.63, "E", 4),
    ];
    for (freq, note, octave) in expected {
        let mut tuner = PitchEstimator::default();
        let data = tuner.process(&plucked(freq, WINDOW), SAMPLE_RATE);
        assert_eq!((data.note, data.octave), (note, octave), "{freq} Hz: {data:?}");

        let guide = data.closest_string().unwrap();
        assert_eq!(guide.direction(), TuningDirection::InTune, "{freq} Hz");
    }
}

#[test]
fn sharp_string_says_loosen() {
    let mut tuner = PitchEstimator::default();
    let data = tuner.process(&sine(midi_to_frequency(45) * 1.02, 0.5, WINDOW), SAMPLE_RATE);
    let guide = data.closest_string().unwrap();
    assert_eq!(guide.string.name, "A2");
    assert_eq!(guide.direction(), TuningDirection::Loosen);
}

#[test]
fn silence_through_analyser_is_silent() {
    let window = capture_through_analyser(&vec![0.0; WINDOW]);
    let mut tuner = PitchEstimator::default();
    assert_eq!(tuner.process(&window, SAMPLE_RATE), TunerData::SILENT);
}

#[test]
fn partially_filled_tap_reads_zeros() {
    // only half a window has been rendered; the rest of the tap is zero
    let window = capture_through_analyser(&sine(220.0, 0.5, WINDOW / 2));
    assert!(window[..WINDOW / 2].iter().all(|&s| s == 0.0));
    let mut tuner = PitchEstimator::default();
    let data = tuner.process(&window, SAMPLE_RATE);
    assert!(data == TunerData::SILENT || data.note == "A");
}

#[test]
fn yin_only_and_hybrid_agree_on_clean_tone() {
    let tone = sine(196.0, 0.4, WINDOW);
    let mut yin = PitchEstimator::new(TunerConfig {
        algorithm: Algorithm::Yin,
        ..TunerConfig::default()
    });
    let mut hybrid = PitchEstimator::default();
    let a = yin.detect(&tone, SAMPLE_RATE);
    let b = hybrid.detect(&tone, SAMPLE_RATE);
    assert!((a.frequency - b.frequency).abs() < 1e-3);
}

#[test]
fn tuner_follows_string_change_after_reset() {
    let mut tuner = PitchEstimator::default();
    for _ in 0..5 {
        tuner.process(&sine(110.0, 0.5, WINDOW), SAMPLE_RATE);
    }
    tuner.reset();
    let data = tuner.process(&sine(146.83, 0.5, WINDOW), SAMPLE_RATE);
    assert_eq!((data.note, data.octave), ("D", 3));
}
