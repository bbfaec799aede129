//! Tremolo pedal.
//!
//! The amplitude gain rests at `1 - depth/2` and the LFO, scaled by
//! `depth/2`, is added to it, so the gain swings between `1 - depth` and 1
//! and never inverts the signal.

use stompbox_core::graph::{AudioGraph, GainNode, GraphError, NodeId, OscillatorNode};

use crate::params::{PARAM_TIME_CONSTANT, ParamKey, TremoloParams};

/// LFO-driven amplitude gain.
#[derive(Debug, Clone)]
pub struct TremoloStage {
    lfo: OscillatorNode,
    depth: GainNode,
    amplitude: GainNode,
}

fn resting_gain(depth: f32) -> f32 {
    1.0 - depth * 0.5
}

impl TremoloStage {
    /// Builds the stage with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &TremoloParams,
    ) -> Result<Self, GraphError> {
        let lfo = graph.create_oscillator(params.rate);
        let depth = graph.create_gain(params.depth * 0.5);
        let amplitude = graph.create_gain(resting_gain(params.depth));

        graph.connect(lfo.id(), depth.id())?;
        graph.connect_param(depth.id(), &amplitude.gain)?;
        graph.connect(wet_in, amplitude.id())?;
        graph.connect(amplitude.id(), wet_out)?;

        Ok(Self {
            lfo,
            depth,
            amplitude,
        })
    }

    /// Pushes one knob onto the nodes. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &TremoloParams) {
        match key {
            ParamKey::TremoloRate => self
                .lfo
                .frequency
                .set_target_at_time(params.rate, PARAM_TIME_CONSTANT),
            ParamKey::TremoloDepth => {
                self.depth
                    .gain
                    .set_target_at_time(params.depth * 0.5, PARAM_TIME_CONSTANT);
                self.amplitude
                    .gain
                    .set_target_at_time(resting_gain(params.depth), PARAM_TIME_CONSTANT);
            }
            _ => {}
        }
    }

    /// Modulation oscillator.
    pub fn lfo(&self) -> &OscillatorNode {
        &self.lfo
    }

    /// Modulation depth gain.
    pub fn depth(&self) -> &GainNode {
        &self.depth
    }

    /// Modulated amplitude gain.
    pub fn amplitude(&self) -> &GainNode {
        &self.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_swings_between_one_minus_depth_and_one() {
        let sr = 1000.0;
        let mut graph = AudioGraph::new(sr);
        let (src, dst) = (graph.source(), graph.destination());
        let params = TremoloParams {
            rate: 5.0,
            depth: 0.6,
        };
        TremoloStage::build(&mut graph, src, dst, &params).unwrap();
        let mut r = graph.compile().unwrap();

        let mut out = vec![0.0; 1000];
        r.render(&vec![1.0; 1000], &mut out);
        let max = out.iter().copied().fold(f32::MIN, f32::max);
        let min = out.iter().copied().fold(f32::MAX, f32::min);
        assert!((max - 1.0).abs() < 0.01, "max {max}");
        assert!((min - 0.4).abs() < 0.01, "min {min}");
    }
}
