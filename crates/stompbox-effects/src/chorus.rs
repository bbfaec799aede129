//! Chorus pedal.
//!
//! ```text
//!                 LFO(rate) ─► depth gain ─┐ (delay time)
//!                                          ▼
//! wet_in ──┬──────────────────────────► delay ─┬──────► wet_out
//!          │                             ▲     │          ▲
//!          │                             └─ fb ┘          │
//!          └──────────────────────────────────────────────┘
//! ```
//!
//! The delay sweeps `5 ms ± depth · 3 ms`; the direct path is mixed in so the
//! modulated copy beats against the dry signal.

use stompbox_core::graph::{AudioGraph, DelayNode, GainNode, GraphError, NodeId, OscillatorNode};

use crate::params::{ChorusParams, PARAM_TIME_CONSTANT, ParamKey};

/// Longest delay the chorus line holds, in seconds.
pub const CHORUS_MAX_DELAY: f32 = 0.05;
/// Centre of the sweep, in seconds.
pub const CHORUS_BASE_DELAY: f32 = 0.005;
/// Sweep half-width at depth = 1, in seconds.
const DEPTH_SCALE: f32 = 0.003;
/// Feedback gain at feedback = 1.
const FEEDBACK_SCALE: f32 = 0.7;

/// Modulated delay with feedback plus a direct path.
#[derive(Debug, Clone)]
pub struct ChorusStage {
    delay: DelayNode,
    lfo: OscillatorNode,
    depth: GainNode,
    feedback: GainNode,
}

impl ChorusStage {
    /// Builds the stage with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &ChorusParams,
    ) -> Result<Self, GraphError> {
        let delay = graph.create_delay(CHORUS_MAX_DELAY);
        delay.delay_time.set_value(CHORUS_BASE_DELAY);
        let lfo = graph.create_oscillator(params.rate);
        let depth = graph.create_gain(params.depth * DEPTH_SCALE);
        let feedback = graph.create_gain(params.feedback * FEEDBACK_SCALE);

        graph.connect(lfo.id(), depth.id())?;
        graph.connect_param(depth.id(), &delay.delay_time)?;
        graph.connect(wet_in, delay.id())?;
        graph.connect(delay.id(), feedback.id())?;
        graph.connect(feedback.id(), delay.id())?;
        graph.connect(delay.id(), wet_out)?;
        graph.connect(wet_in, wet_out)?;

        Ok(Self {
            delay,
            lfo,
            depth,
            feedback,
        })
    }

    /// Pushes one knob onto the nodes. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &ChorusParams) {
        match key {
            ParamKey::ChorusRate => self
                .lfo
                .frequency
                .set_target_at_time(params.rate, PARAM_TIME_CONSTANT),
            ParamKey::ChorusDepth => self
                .depth
                .gain
                .set_target_at_time(params.depth * DEPTH_SCALE, PARAM_TIME_CONSTANT),
            ParamKey::ChorusFeedback => self
                .feedback
                .gain
                .set_target_at_time(params.feedback * FEEDBACK_SCALE, PARAM_TIME_CONSTANT),
            _ => {}
        }
    }

    /// Modulated delay line.
    pub fn delay(&self) -> &DelayNode {
        &self.delay
    }

    /// Sweep oscillator.
    pub fn lfo(&self) -> &OscillatorNode {
        &self.lfo
    }

    /// Sweep width gain.
    pub fn depth(&self) -> &GainNode {
        &self.depth
    }

    /// Feedback gain.
    pub fn feedback(&self) -> &GainNode {
        &self.feedback
    }
}
