//! Graph construction.
//!
//! [`AudioGraph`] is owned by the control thread. It records nodes, audio
//! edges and modulation edges, and hands out typed node handles. Nothing here
//! runs audio: [`compile`](AudioGraph::compile) turns the recorded topology
//! into a [`GraphRenderer`] that the audio callback owns.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;

use super::GraphError;
use super::analyser::AnalyserTap;
use super::clock::{AudioClock, RenderLoad};
use super::curve::TransferCurve;
use super::node::{
    AnalyserNode, BiquadNode, CompressorNode, DecayNode, DelayNode, GainNode, NodeId, NodeKind,
    OscillatorNode, WaveShaperNode,
};
use super::param::AudioParam;
use super::render::GraphRenderer;
use crate::biquad::FilterKind;
use crate::dynamics::CompressorSettings;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Processing performed by a node.
#[derive(Debug, Clone)]
pub(crate) enum NodeOp {
    Source,
    Destination,
    Gain,
    Biquad(FilterKind),
    Delay { max_seconds: f32 },
    Oscillator,
    Decay(Arc<AtomicU32>),
    Compressor,
    WaveShaper(Arc<ArcSwapOption<TransferCurve>>),
    Analyser(AnalyserTap),
}

/// Per-node construction data kept until compile time.
#[derive(Debug, Clone)]
pub(crate) struct NodeSpec {
    pub(crate) op: NodeOp,
    /// Automatable parameters in the order the node's processor reads them.
    pub(crate) params: Vec<AudioParam>,
}

impl NodeSpec {
    fn new(op: NodeOp, params: Vec<AudioParam>) -> Self {
        Self { op, params }
    }

    pub(crate) fn kind(&self) -> NodeKind {
        match self.op {
            NodeOp::Source => NodeKind::Source,
            NodeOp::Destination => NodeKind::Destination,
            NodeOp::Gain => NodeKind::Gain,
            NodeOp::Biquad(_) => NodeKind::Biquad,
            NodeOp::Delay { .. } => NodeKind::Delay,
            NodeOp::Oscillator => NodeKind::Oscillator,
            NodeOp::Decay(_) => NodeKind::Decay,
            NodeOp::Compressor => NodeKind::Compressor,
            NodeOp::WaveShaper(_) => NodeKind::WaveShaper,
            NodeOp::Analyser(_) => NodeKind::Analyser,
        }
    }
}

/// Audio graph under construction.
///
/// # Example
///
/// ```rust
/// use stompbox_core::graph::AudioGraph;
///
/// let mut graph = AudioGraph::new(48000.0);
/// let gain = graph.create_gain(0.5);
/// graph.connect(graph.source(), gain.id()).unwrap();
/// graph.connect(gain.id(), graph.destination()).unwrap();
///
/// let mut renderer = graph.compile().unwrap();
/// let mut out = [0.0; 4];
/// renderer.render(&[1.0; 4], &mut out);
/// assert_eq!(out, [0.5; 4]);
/// ```
#[derive(Debug)]
pub struct AudioGraph {
    id: u64,
    sample_rate: f32,
    pub(crate) nodes: Vec<NodeSpec>,
    pub(crate) edges: Vec<(NodeId, NodeId)>,
    pub(crate) param_edges: Vec<(NodeId, AudioParam)>,
    source: NodeId,
    destination: NodeId,
    clock: AudioClock,
    load: RenderLoad,
}

impl AudioGraph {
    /// Creates a graph with its source and destination nodes.
    pub fn new(sample_rate: f32) -> Self {
        let mut graph = Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            sample_rate,
            nodes: Vec::new(),
            edges: Vec::new(),
            param_edges: Vec::new(),
            source: NodeId(0),
            destination: NodeId(1),
            clock: AudioClock::new(sample_rate),
            load: RenderLoad::default(),
        };
        graph.source = graph.push(NodeSpec::new(NodeOp::Source, Vec::new()));
        graph.destination = graph.push(NodeSpec::new(NodeOp::Destination, Vec::new()));
        graph
    }

    /// Sample rate the graph renders at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Node carrying the live input.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Node whose input is the rendered output.
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Number of nodes, including source and destination.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of audio edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Kind of a node, if it exists.
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.0 as usize).map(NodeSpec::kind)
    }

    /// Frame counter advanced by every renderer compiled from this graph.
    pub fn clock(&self) -> &AudioClock {
        &self.clock
    }

    /// Render load reported by the most recent renderer.
    pub fn load(&self) -> &RenderLoad {
        &self.load
    }

    fn push(&mut self, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(spec);
        id
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    fn param(&self, owner: NodeId, default: f32, min: f32, max: f32) -> AudioParam {
        AudioParam::new(self.id, owner, default, min, max)
    }

    /// Creates a gain node.
    pub fn create_gain(&mut self, initial: f32) -> GainNode {
        let id = self.next_id();
        let gain = self.param(id, initial, f32::MIN, f32::MAX);
        self.push(NodeSpec::new(NodeOp::Gain, vec![gain.clone()]));
        GainNode { id, gain }
    }

    /// Creates a biquad filter.
    pub fn create_biquad(&mut self, kind: FilterKind, frequency: f32, q: f32) -> BiquadNode {
        let id = self.next_id();
        let nyquist = self.sample_rate * 0.5;
        let frequency = self.param(id, frequency, 0.0, nyquist);
        let q = self.param(id, q, 1e-4, 1000.0);
        self.push(NodeSpec::new(
            NodeOp::Biquad(kind),
            vec![frequency.clone(), q.clone()],
        ));
        BiquadNode { id, frequency, q }
    }

    /// Creates a delay node holding up to `max_seconds` of audio.
    ///
    /// The delay time starts at zero, which renders as the one-sample minimum.
    pub fn create_delay(&mut self, max_seconds: f32) -> DelayNode {
        let id = self.next_id();
        let max_seconds = if max_seconds.is_finite() {
            max_seconds.max(1.0 / self.sample_rate)
        } else {
            1.0
        };
        let delay_time = self.param(id, 0.0, 0.0, max_seconds);
        self.push(NodeSpec::new(
            NodeOp::Delay { max_seconds },
            vec![delay_time.clone()],
        ));
        DelayNode { id, delay_time }
    }

    /// Creates a sine oscillator.
    pub fn create_oscillator(&mut self, frequency: f32) -> OscillatorNode {
        let id = self.next_id();
        let nyquist = self.sample_rate * 0.5;
        let frequency = self.param(id, frequency, -nyquist, nyquist);
        self.push(NodeSpec::new(NodeOp::Oscillator, vec![frequency.clone()]));
        OscillatorNode { id, frequency }
    }

    /// Creates a decay envelope starting at `peak` and lasting `decay_seconds`.
    ///
    /// The node is silent until its first trigger.
    pub fn create_decay(&mut self, peak: f32, decay_seconds: f32) -> DecayNode {
        let id = self.next_id();
        let triggers = Arc::new(AtomicU32::new(0));
        let peak = self.param(id, peak, 0.0, 1.0);
        let decay = self.param(id, decay_seconds, 1e-3, 10.0);
        self.push(NodeSpec::new(
            NodeOp::Decay(Arc::clone(&triggers)),
            vec![peak.clone(), decay.clone()],
        ));
        DecayNode {
            id,
            triggers,
            peak,
            decay,
        }
    }

    /// Creates a compressor with browser-default settings.
    pub fn create_compressor(&mut self) -> CompressorNode {
        let id = self.next_id();
        let d = CompressorSettings::default();
        let threshold = self.param(id, d.threshold, -100.0, 0.0);
        let knee = self.param(id, d.knee, 0.0, 40.0);
        let ratio = self.param(id, d.ratio, 1.0, 20.0);
        let attack = self.param(id, d.attack, 0.0, 1.0);
        let release = self.param(id, d.release, 0.0, 1.0);
        self.push(NodeSpec::new(
            NodeOp::Compressor,
            vec![
                threshold.clone(),
                knee.clone(),
                ratio.clone(),
                attack.clone(),
                release.clone(),
            ],
        ));
        CompressorNode {
            id,
            threshold,
            knee,
            ratio,
            attack,
            release,
        }
    }

    /// Creates a wave-shaper with no curve (pass-through).
    pub fn create_wave_shaper(&mut self) -> WaveShaperNode {
        let id = self.next_id();
        let curve = Arc::new(ArcSwapOption::empty());
        self.push(NodeSpec::new(NodeOp::WaveShaper(Arc::clone(&curve)), Vec::new()));
        WaveShaperNode { id, curve }
    }

    /// Creates an analyser holding the newest `size` samples.
    pub fn create_analyser(&mut self, size: usize) -> AnalyserNode {
        let id = self.next_id();
        let tap = AnalyserTap::new(size);
        self.push(NodeSpec::new(NodeOp::Analyser(tap.clone()), Vec::new()));
        AnalyserNode { id, tap }
    }

    fn check(&self, id: NodeId) -> Result<(), GraphError> {
        if (id.0 as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound(id))
        }
    }

    /// Connects the output of `from` to the input of `to`.
    ///
    /// Inputs are summed. Connecting the same pair twice has no further
    /// effect. Cycles are only rejected at compile time, since a cycle
    /// through a delay node is legal.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.check(from)?;
        self.check(to)?;
        if from == to {
            return Err(GraphError::SelfLoop(from));
        }
        if !self.edges.contains(&(from, to)) {
            self.edges.push((from, to));
        }
        Ok(())
    }

    /// Connects the output of `from` to a parameter, adding it to the
    /// parameter's intrinsic value every sample.
    pub fn connect_param(&mut self, from: NodeId, param: &AudioParam) -> Result<(), GraphError> {
        self.check(from)?;
        if param.shared.graph_id != self.id {
            return Err(GraphError::ForeignParam);
        }
        let owner = param.owner();
        if from == owner {
            return Err(GraphError::SelfLoop(from));
        }
        let exists = self
            .param_edges
            .iter()
            .any(|(f, p)| *f == from && p.same_as(param));
        if !exists {
            self.param_edges.push((from, param.clone()));
        }
        Ok(())
    }

    /// Compiles the current topology into a renderer.
    ///
    /// May be called repeatedly; each renderer starts with fresh filter and
    /// delay state but shares parameters, curves, taps and the clock with
    /// this graph.
    pub fn compile(&self) -> Result<GraphRenderer, GraphError> {
        let renderer = GraphRenderer::build(self, self.clock.clone(), self.load.clone())?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            param_edges = self.param_edges.len(),
            "graph compiled"
        );
        Ok(renderer)
    }
}
