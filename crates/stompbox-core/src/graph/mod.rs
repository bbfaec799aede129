//! Audio graph host.
//!
//! A small node-graph runtime in the shape of a browser audio context: gain,
//! biquad, delay, oscillator, decay envelope, compressor, wave-shaper and
//! analyser nodes wired
//! by audio edges, plus modulation edges that add a node's output to another
//! node's parameter.
//!
//! # Architecture
//!
//! The system uses a **two-object split**:
//!
//! - [`AudioGraph`] - owned by the control thread. Creates nodes, records
//!   edges, hands out typed handles and runs [`compile()`](AudioGraph::compile).
//! - [`GraphRenderer`] - owned by the audio callback. Renders mono blocks
//!   sample by sample with zero allocations.
//!
//! The two sides share only lock-free state: [`AudioParam`] automation words,
//! wave-shaper curve slots (`arc-swap`), [`AnalyserTap`] rings, the
//! [`AudioClock`] and the [`RenderLoad`] gauge.
//!
//! # Feedback
//!
//! Audio edges into a delay node are cut when ordering the graph, so loops
//! that pass through a delay render with the delay's own latency (at least one
//! sample). Any other cycle is rejected with [`GraphError::Cycle`].

mod analyser;
mod clock;
mod context;
mod curve;
mod node;
mod param;
mod render;

pub use analyser::AnalyserTap;
pub use clock::{AudioClock, RenderLoad};
pub use context::AudioGraph;
pub use curve::TransferCurve;
pub use node::{
    AnalyserNode, BiquadNode, CompressorNode, DecayNode, DelayNode, GainNode, NodeId, NodeKind,
    OscillatorNode, WaveShaperNode,
};
pub use param::AudioParam;
pub use render::GraphRenderer;

/// Errors raised while wiring or compiling a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node does not exist in this graph.
    NodeNotFound(NodeId),
    /// A node cannot feed itself directly.
    SelfLoop(NodeId),
    /// The graph contains a cycle that does not pass through a delay node.
    Cycle,
    /// The parameter belongs to a different graph.
    ForeignParam,
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::SelfLoop(id) => write!(f, "node {id} cannot connect to itself"),
            Self::Cycle => write!(f, "graph contains a cycle without a delay node"),
            Self::ForeignParam => write!(f, "parameter belongs to another graph"),
        }
    }
}

impl std::error::Error for GraphError {}
