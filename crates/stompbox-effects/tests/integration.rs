//! Integration tests for stompbox-effects.
//!
//! Builds the full pedalboard chain on a graph and checks what comes out of
//! the sink: transparency when bypassed, click-free engage, echoes, stable
//! output with every pedal on and live knob changes without rebuilds.

use stompbox_core::graph::AudioGraph;
use stompbox_effects::{
    CHAIN_ORDER, EffectChain, ParamKey, Pedal, PedalParams, PedalState, distortion_curve,
};

const SAMPLE_RATE: f32 = 44100.0;
const TAU: f32 = core::f32::consts::TAU;

fn generate_sine(freq_hz: f32, amplitude: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|n| amplitude * libm::sinf(TAU * freq_hz * n as f32 / SAMPLE_RATE))
        .collect()
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0, |m, s| m.max(s.abs()))
}

fn board(params: &PedalParams, state: &PedalState) -> (AudioGraph, EffectChain) {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let (src, dst) = (graph.source(), graph.destination());
    let chain = EffectChain::build(&mut graph, src, dst, params, state).unwrap();
    (graph, chain)
}

fn all_on() -> PedalState {
    let mut state = PedalState::default();
    for pedal in CHAIN_ORDER {
        state.set(pedal, true);
    }
    state
}

#[test]
fn every_pedal_on_stays_finite_and_bounded() {
    let (graph, _chain) = board(&PedalParams::default(), &all_on());
    let mut r = graph.compile().unwrap();

    let input = generate_sine(196.0, 0.8, SAMPLE_RATE as usize * 2);
    let mut out = vec![0.0; input.len()];
    for (i, o) in input.chunks(128).zip(out.chunks_mut(128)) {
        r.render(i, o);
    }
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(peak(&out) < 10.0, "peak {}", peak(&out));
    assert!(peak(&out[out.len() / 2..]) > 0.01);
}

#[test]
fn engaging_a_pedal_does_not_click() {
    let mut params = PedalParams::default();
    params.tremolo.depth = 1.0;
    let (graph, mut chain) = board(&params, &PedalState::default());
    let mut r = graph.compile().unwrap();

    let input = generate_sine(110.0, 0.5, 4096);
    let mut out = vec![0.0; 4096];
    r.render(&input[..2048], &mut out[..2048]);
    chain.set_bypass(Pedal::Tremolo, false);
    r.render(&input[2048..], &mut out[2048..]);

    // an instant switch would jump by up to half the amplitude; the ramp
    // keeps every step close to the sine's own slope (about 0.008)
    let max_step = out
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max);
    assert!(max_step < 0.02, "max step {max_step}");
    assert!(!chain.is_bypassed(Pedal::Tremolo));
}

#[test]
fn delay_pedal_echoes_through_the_chain() {
    let mut params = PedalParams::default();
    params.delay.time = 0.1;
    params.delay.feedback = 0.0;
    params.delay.mix = 1.0;
    let state = PedalState {
        delay: true,
        ..PedalState::default()
    };
    let (graph, _chain) = board(&params, &state);
    let mut r = graph.compile().unwrap();

    // let the engage ramp settle on silence first
    let mut scratch = vec![0.0; 4410];
    r.render(&vec![0.0; 4410], &mut scratch);

    let mut input = vec![0.0; 8820];
    input[0] = 1.0;
    let mut out = vec![0.0; 8820];
    r.render(&input, &mut out);

    assert!((out[0] - 1.0).abs() < 1e-4);
    assert!((out[4410] - 1.0).abs() < 1e-3, "echo {}", out[4410]);
    assert!(out[10..4400].iter().all(|s| s.abs() < 1e-4));
}

#[test]
fn knob_changes_never_rebuild() {
    let (graph, chain) = board(&PedalParams::default(), &all_on());
    let nodes = graph.node_count();
    let edges = graph.edge_count();

    let mut params = PedalParams::default();
    for key in ParamKey::ALL {
        let d = key.descriptor();
        params.set(key, d.max);
        chain.apply(key, &params);
    }
    chain.apply_all(&PedalParams::default());

    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
}

#[test]
fn drive_gain_knob_swaps_curve_live() {
    let (graph, chain) = board(&PedalParams::default(), &PedalState::default());
    let mut r = graph.compile().unwrap();

    let mut params = PedalParams::default();
    params.drive.gain = 0.2;
    chain.apply(ParamKey::DriveGain, &params);

    let current = chain.drive().shaper().curve().unwrap();
    assert!(std::sync::Arc::ptr_eq(&current, &distortion_curve(0.1)));

    let mut out = vec![0.0; 64];
    r.render(&[0.3; 64], &mut out);
    assert!(out.iter().all(|s| s.is_finite()));
}

#[test]
fn wah_resonates_at_pedal_position() {
    let mut params = PedalParams::default();
    params.wah.frequency = 0.4; // 1000 Hz
    let state = PedalState {
        wah: true,
        ..PedalState::default()
    };
    let (graph, _chain) = board(&params, &state);

    let measure = |freq: f32| {
        let mut r = graph.compile().unwrap();
        let input = generate_sine(freq, 0.5, 8192);
        let mut out = vec![0.0; 8192];
        r.render(&input, &mut out);
        peak(&out[4096..])
    };
    let centre = measure(1000.0);
    let off = measure(4000.0);
    assert!(centre > off * 4.0, "centre {centre} off {off}");
}
