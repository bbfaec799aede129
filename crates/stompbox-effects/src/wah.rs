//! Wah pedal: one resonant bandpass.

use stompbox_core::FilterKind;
use stompbox_core::graph::{AudioGraph, BiquadNode, GraphError, NodeId};

use crate::params::{PARAM_TIME_CONSTANT, ParamKey, WahParams};

/// Centre frequency for a pedal position.
pub fn wah_center_hz(position: f32) -> f32 {
    200.0 + position * 2000.0
}

/// Bandpass filter swept by the pedal position.
#[derive(Debug, Clone)]
pub struct WahStage {
    filter: BiquadNode,
}

impl WahStage {
    /// Builds the stage with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &WahParams,
    ) -> Result<Self, GraphError> {
        let filter = graph.create_biquad(
            FilterKind::Bandpass,
            wah_center_hz(params.frequency),
            params.resonance,
        );
        graph.connect(wet_in, filter.id())?;
        graph.connect(filter.id(), wet_out)?;
        Ok(Self { filter })
    }

    /// Pushes one knob onto the filter. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &WahParams) {
        match key {
            ParamKey::WahFrequency => self
                .filter
                .frequency
                .set_target_at_time(wah_center_hz(params.frequency), PARAM_TIME_CONSTANT),
            ParamKey::WahResonance => self
                .filter
                .q
                .set_target_at_time(params.resonance, PARAM_TIME_CONSTANT),
            _ => {}
        }
    }

    /// The bandpass filter.
    pub fn filter(&self) -> &BiquadNode {
        &self.filter
    }
}
