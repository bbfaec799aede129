//! Full audio graph of a connected pedalboard.
//!
//! ```text
//!          ┌─► effect chain ─► master gain ─► destination
//! source ──┼─► meter analyser
//!          └─► highpass 60 Hz ─► lowpass 1500 Hz ─► tuner analyser
//!
//! click oscillator ─► click gain ─► destination
//! click decay ──────► click gain.gain
//! ```
//!
//! The meter and tuner taps run in parallel with the chain and do not feed
//! the output. They and the metronome click are always built, so toggling
//! the tuner or the metronome never changes the graph.

use core::f32::consts::FRAC_1_SQRT_2;

use stompbox_config::EngineConfig;
use stompbox_core::FilterKind;
use stompbox_core::graph::{
    AnalyserNode, AudioGraph, DecayNode, GainNode, GraphError, OscillatorNode,
};
use stompbox_effects::{EffectChain, PedalParams, PedalState};

use crate::metronome::{ACCENT_HZ, CLICK_DECAY_SECS, CLICK_PEAK};

/// Tuner band-limiting corners in Hz.
const TUNER_HIGHPASS_HZ: f32 = 60.0;
const TUNER_LOWPASS_HZ: f32 = 1500.0;

/// Uncompiled graph plus the handles the controller keeps.
pub(crate) struct Board {
    pub(crate) graph: AudioGraph,
    pub(crate) chain: EffectChain,
    pub(crate) master: GainNode,
    pub(crate) meter: AnalyserNode,
    pub(crate) tuner_tap: AnalyserNode,
    pub(crate) click_tone: OscillatorNode,
    pub(crate) click: DecayNode,
}

impl Board {
    pub(crate) fn build(
        sample_rate: f32,
        params: &PedalParams,
        state: &PedalState,
        config: &EngineConfig,
    ) -> Result<Self, GraphError> {
        let mut graph = AudioGraph::new(sample_rate);
        let source = graph.source();
        let destination = graph.destination();

        let master = graph.create_gain(params.volume);
        let chain = EffectChain::build(&mut graph, source, master.id(), params, state)?;
        graph.connect(master.id(), destination)?;

        let meter = graph.create_analyser(config.meter_window);
        graph.connect(source, meter.id())?;

        let highpass = graph.create_biquad(FilterKind::Highpass, TUNER_HIGHPASS_HZ, FRAC_1_SQRT_2);
        let lowpass = graph.create_biquad(FilterKind::Lowpass, TUNER_LOWPASS_HZ, FRAC_1_SQRT_2);
        let tuner_tap = graph.create_analyser(config.tuner_buffer_size);
        graph.connect(source, highpass.id())?;
        graph.connect(highpass.id(), lowpass.id())?;
        graph.connect(lowpass.id(), tuner_tap.id())?;

        let click_tone = graph.create_oscillator(ACCENT_HZ);
        let click_gain = graph.create_gain(0.0);
        let click = graph.create_decay(CLICK_PEAK, CLICK_DECAY_SECS);
        graph.connect(click_tone.id(), click_gain.id())?;
        graph.connect_param(click.id(), &click_gain.gain)?;
        graph.connect(click_gain.id(), destination)?;

        tracing::debug!(
            sample_rate,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "pedalboard graph built"
        );

        Ok(Self {
            graph,
            chain,
            master,
            meter,
            tuner_tap,
            click_tone,
            click,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stompbox_effects::Pedal;

    #[test]
    fn node_count_does_not_depend_on_state() {
        let config = EngineConfig::default();
        let params = PedalParams::default();
        let off = Board::build(44100.0, &params, &PedalState::default(), &config).unwrap();
        let mut all_on = PedalState::default();
        for pedal in Pedal::ALL {
            all_on.set(pedal, true);
        }
        let on = Board::build(44100.0, &params, &all_on, &config).unwrap();
        assert_eq!(off.graph.node_count(), on.graph.node_count());
    }

    #[test]
    fn bypassed_board_passes_input_at_master_volume() {
        let config = EngineConfig::default();
        let mut params = PedalParams::default();
        params.volume = 0.5;
        let board = Board::build(44100.0, &params, &PedalState::default(), &config).unwrap();
        let mut renderer = board.graph.compile().unwrap();

        let input = vec![0.4; 256];
        let mut out = vec![0.0; 256];
        renderer.render(&input, &mut out);
        assert!(out.iter().all(|s| (s - 0.2).abs() < 1e-5));
        assert!((board.meter.tap().rms(128) - 0.4).abs() < 1e-5);
    }

    #[test]
    fn click_is_mixed_after_master_volume() {
        let config = EngineConfig::default();
        let mut params = PedalParams::default();
        params.volume = 0.0;
        let board = Board::build(44100.0, &params, &PedalState::default(), &config).unwrap();
        let mut renderer = board.graph.compile().unwrap();

        let mut out = vec![0.0; 512];
        renderer.render(&[0.4; 512], &mut out);
        assert!(out.iter().all(|&s| s == 0.0));

        board.click.trigger();
        renderer.render(&[0.4; 512], &mut out);
        let peak = out.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.2 && peak <= CLICK_PEAK + 1e-6, "{peak}");
    }
}
