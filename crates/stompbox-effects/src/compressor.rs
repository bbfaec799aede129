//! Compressor pedal.

use stompbox_core::graph::{AudioGraph, CompressorNode, GraphError, NodeId};

use crate::params::{CompressorParams, PARAM_TIME_CONSTANT, ParamKey};

/// Fixed knee width in dB.
pub const COMPRESSOR_KNEE_DB: f32 = 5.0;

/// A single compressor node between the wet points.
#[derive(Debug, Clone)]
pub struct CompressorStage {
    node: CompressorNode,
}

impl CompressorStage {
    /// Builds the stage and wires `wet_in -> compressor -> wet_out`.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &CompressorParams,
    ) -> Result<Self, GraphError> {
        let node = graph.create_compressor();
        node.threshold.set_value(params.threshold);
        node.ratio.set_value(params.ratio);
        node.attack.set_value(params.attack);
        node.release.set_value(params.release);
        node.knee.set_value(COMPRESSOR_KNEE_DB);

        graph.connect(wet_in, node.id())?;
        graph.connect(node.id(), wet_out)?;
        Ok(Self { node })
    }

    /// Pushes one knob onto the node. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &CompressorParams) {
        let (param, value) = match key {
            ParamKey::CompressorThreshold => (&self.node.threshold, params.threshold),
            ParamKey::CompressorRatio => (&self.node.ratio, params.ratio),
            ParamKey::CompressorAttack => (&self.node.attack, params.attack),
            ParamKey::CompressorRelease => (&self.node.release, params.release),
            _ => return,
        };
        param.set_target_at_time(value, PARAM_TIME_CONSTANT);
    }

    /// The compressor node.
    pub fn node(&self) -> &CompressorNode {
        &self.node
    }
}
