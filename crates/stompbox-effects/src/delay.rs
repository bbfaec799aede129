//! Delay pedal: feedback delay with a wet level and a direct path.

use stompbox_core::graph::{AudioGraph, DelayNode, GainNode, GraphError, NodeId};

use crate::params::{DelayParams, PARAM_TIME_CONSTANT, ParamKey};

/// Longest delay time, in seconds.
pub const DELAY_MAX_SECONDS: f32 = 2.0;

/// Delay line, feedback loop and wet gain.
#[derive(Debug, Clone)]
pub struct DelayStage {
    delay: DelayNode,
    feedback: GainNode,
    mix: GainNode,
}

impl DelayStage {
    /// Builds the stage with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &DelayParams,
    ) -> Result<Self, GraphError> {
        let delay = graph.create_delay(DELAY_MAX_SECONDS);
        delay.delay_time.set_value(params.time);
        let feedback = graph.create_gain(params.feedback);
        let mix = graph.create_gain(params.mix);

        graph.connect(wet_in, delay.id())?;
        graph.connect(delay.id(), feedback.id())?;
        graph.connect(feedback.id(), delay.id())?;
        graph.connect(delay.id(), mix.id())?;
        graph.connect(mix.id(), wet_out)?;
        graph.connect(wet_in, wet_out)?;

        Ok(Self {
            delay,
            feedback,
            mix,
        })
    }

    /// Pushes one knob onto the nodes. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &DelayParams) {
        let (param, value) = match key {
            ParamKey::DelayTime => (&self.delay.delay_time, params.time),
            ParamKey::DelayFeedback => (&self.feedback.gain, params.feedback),
            ParamKey::DelayMix => (&self.mix.gain, params.mix),
            _ => return,
        };
        param.set_target_at_time(value, PARAM_TIME_CONSTANT);
    }

    /// Delay line.
    pub fn delay(&self) -> &DelayNode {
        &self.delay
    }

    /// Feedback gain.
    pub fn feedback(&self) -> &GainNode {
        &self.feedback
    }

    /// Wet level gain.
    pub fn mix(&self) -> &GainNode {
        &self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_arrives_after_delay_time() {
        let sr = 1000.0;
        let mut graph = AudioGraph::new(sr);
        let (src, dst) = (graph.source(), graph.destination());
        let params = DelayParams {
            time: 0.1,
            feedback: 0.5,
            mix: 1.0,
        };
        DelayStage::build(&mut graph, src, dst, &params).unwrap();
        let mut r = graph.compile().unwrap();

        let mut input = vec![0.0; 400];
        input[0] = 1.0;
        let mut out = vec![0.0; 400];
        r.render(&input, &mut out);

        assert_eq!(out[0], 1.0);
        assert!((out[100] - 1.0).abs() < 1e-6, "first echo {}", out[100]);
        assert!((out[200] - 0.5).abs() < 1e-6, "second echo {}", out[200]);
        assert!(out[1..100].iter().all(|&s| s.abs() < 1e-6));
    }
}
