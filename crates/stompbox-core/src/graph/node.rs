//! Node identities and typed node handles.
//!
//! Builder methods on [`AudioGraph`](super::AudioGraph) return one handle per
//! node type. A handle carries the node's [`NodeId`] for wiring and the node's
//! automatable [`AudioParam`]s; it stays valid for as long as the caller keeps
//! it, independently of how many times the graph is compiled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::ArcSwapOption;

use super::analyser::AnalyserTap;
use super::curve::TransferCurve;
use super::param::AudioParam;

/// Unique identifier for a node in an audio graph.
///
/// Node IDs are assigned sequentially and never reused within a graph instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The processing role of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Live input. Exactly one per graph.
    Source,
    /// Final output. Exactly one per graph.
    Destination,
    /// Multiplies its input by `gain`.
    Gain,
    /// Second-order filter.
    Biquad,
    /// Variable delay line; breaks feedback loops.
    Delay,
    /// Sine source, ignores audio input.
    Oscillator,
    /// Triggered one-shot decay envelope, ignores audio input.
    Decay,
    /// Dynamics compressor.
    Compressor,
    /// Table-lookup nonlinearity.
    WaveShaper,
    /// Pass-through with a time-domain tap.
    Analyser,
}

/// Gain node handle.
#[derive(Debug, Clone)]
pub struct GainNode {
    pub(crate) id: NodeId,
    /// Linear gain applied to the summed input.
    pub gain: AudioParam,
}

/// Biquad filter node handle.
#[derive(Debug, Clone)]
pub struct BiquadNode {
    pub(crate) id: NodeId,
    /// Cutoff / centre frequency in Hz.
    pub frequency: AudioParam,
    /// Quality factor.
    pub q: AudioParam,
}

/// Delay node handle.
#[derive(Debug, Clone)]
pub struct DelayNode {
    pub(crate) id: NodeId,
    /// Delay in seconds, bounded by the node's maximum.
    pub delay_time: AudioParam,
}

/// Sine oscillator node handle.
#[derive(Debug, Clone)]
pub struct OscillatorNode {
    pub(crate) id: NodeId,
    /// Frequency in Hz.
    pub frequency: AudioParam,
}

/// Decay envelope node handle.
///
/// Each [`trigger`](Self::trigger) restarts the envelope at `peak` and decays
/// it exponentially to a thousandth of full scale over `decay` seconds, after
/// which the node outputs silence until the next trigger. Connect it to a
/// gain parameter to shape a tone into a click.
#[derive(Debug, Clone)]
pub struct DecayNode {
    pub(crate) id: NodeId,
    pub(crate) triggers: Arc<AtomicU32>,
    /// Starting level.
    pub peak: AudioParam,
    /// Decay time in seconds.
    pub decay: AudioParam,
}

impl DecayNode {
    /// Restarts the envelope on the next rendered sample.
    pub fn trigger(&self) {
        self.triggers.fetch_add(1, Ordering::Release);
    }

    /// Number of triggers issued so far.
    pub fn trigger_count(&self) -> u32 {
        self.triggers.load(Ordering::Acquire)
    }
}

/// Compressor node handle.
#[derive(Debug, Clone)]
pub struct CompressorNode {
    pub(crate) id: NodeId,
    /// Threshold in dB.
    pub threshold: AudioParam,
    /// Knee width in dB.
    pub knee: AudioParam,
    /// Ratio (n:1).
    pub ratio: AudioParam,
    /// Attack in seconds.
    pub attack: AudioParam,
    /// Release in seconds.
    pub release: AudioParam,
}

/// Wave-shaper node handle.
#[derive(Debug, Clone)]
pub struct WaveShaperNode {
    pub(crate) id: NodeId,
    pub(crate) curve: Arc<ArcSwapOption<TransferCurve>>,
}

impl WaveShaperNode {
    /// Installs a new transfer curve. Takes effect on the next rendered sample.
    pub fn set_curve(&self, curve: Arc<TransferCurve>) {
        self.curve.store(Some(curve));
    }

    /// Removes the curve; the node passes audio through unchanged.
    pub fn clear_curve(&self) {
        self.curve.store(None);
    }

    /// The currently installed curve.
    pub fn curve(&self) -> Option<Arc<TransferCurve>> {
        self.curve.load_full()
    }
}

/// Analyser node handle.
#[derive(Debug, Clone)]
pub struct AnalyserNode {
    pub(crate) id: NodeId,
    pub(crate) tap: AnalyserTap,
}

impl AnalyserNode {
    /// Reader side of the node's sample ring.
    pub fn tap(&self) -> &AnalyserTap {
        &self.tap
    }
}

macro_rules! impl_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Graph node identifier.
                #[inline]
                pub fn id(&self) -> NodeId {
                    self.id
                }
            }
        )*
    };
}

impl_id!(
    GainNode,
    BiquadNode,
    DelayNode,
    OscillatorNode,
    DecayNode,
    CompressorNode,
    WaveShaperNode,
    AnalyserNode,
);
