//! Click-free bypass.
//!
//! ```text
//!            ┌──► dry ───────────────────────────────┐
//! input ─────┤                                       ├──► output
//!            └──► wet_input ─► [stage] ─► wet_output ─► wet ─┘
//! ```
//!
//! `output = dry · input + wet · stage(input)`. Switching ramps the two gains
//! with a 5 ms time constant instead of re-wiring the graph, so the stage keeps
//! running (delay tails, LFO phase) while bypassed.

use stompbox_core::graph::{AudioGraph, GainNode, GraphError, NodeId};

/// Crossfade time constant in seconds.
pub const BYPASS_TIME_CONSTANT: f32 = 0.005;

/// Dry/wet crossfader wrapped around one effect stage.
#[derive(Debug, Clone)]
pub struct BypassMixer {
    input: GainNode,
    output: GainNode,
    dry: GainNode,
    wet: GainNode,
    wet_input: GainNode,
    wet_output: GainNode,
    bypassed: bool,
}

impl BypassMixer {
    /// Creates the mixer nodes and lets `build_wet` wire the stage between
    /// the two wet points.
    ///
    /// The mixer starts bypassed (dry 1, wet 0). Errors from `build_wet` are
    /// returned unchanged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stompbox_core::graph::AudioGraph;
    /// use stompbox_effects::BypassMixer;
    ///
    /// let mut graph = AudioGraph::new(48000.0);
    /// let (mixer, half) = BypassMixer::new(&mut graph, |g, wet_in, wet_out| {
    ///     let half = g.create_gain(0.5);
    ///     g.connect(wet_in, half.id())?;
    ///     g.connect(half.id(), wet_out)?;
    ///     Ok(half)
    /// })
    /// .unwrap();
    /// assert!(mixer.is_bypassed());
    /// assert_eq!(half.gain.value(), 0.5);
    /// ```
    pub fn new<T, F>(graph: &mut AudioGraph, build_wet: F) -> Result<(Self, T), GraphError>
    where
        F: FnOnce(&mut AudioGraph, NodeId, NodeId) -> Result<T, GraphError>,
    {
        let input = graph.create_gain(1.0);
        let output = graph.create_gain(1.0);
        let dry = graph.create_gain(1.0);
        let wet = graph.create_gain(0.0);
        let wet_input = graph.create_gain(1.0);
        let wet_output = graph.create_gain(1.0);

        graph.connect(input.id(), dry.id())?;
        graph.connect(dry.id(), output.id())?;
        graph.connect(input.id(), wet_input.id())?;
        graph.connect(wet_output.id(), wet.id())?;
        graph.connect(wet.id(), output.id())?;

        let stage = build_wet(graph, wet_input.id(), wet_output.id())?;

        let mixer = Self {
            input,
            output,
            dry,
            wet,
            wet_input,
            wet_output,
            bypassed: true,
        };
        Ok((mixer, stage))
    }

    /// Ramps towards dry (`true`) or wet (`false`).
    ///
    /// Repeating the current state re-issues the same targets, which leaves
    /// the audio unchanged.
    pub fn set_bypass(&mut self, bypassed: bool) {
        let (dry, wet) = if bypassed { (1.0, 0.0) } else { (0.0, 1.0) };
        self.dry.gain.set_target_at_time(dry, BYPASS_TIME_CONSTANT);
        self.wet.gain.set_target_at_time(wet, BYPASS_TIME_CONSTANT);
        self.bypassed = bypassed;
    }

    /// Last requested state.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Node to connect the previous stage into.
    pub fn input(&self) -> NodeId {
        self.input.id()
    }

    /// Node to connect onwards from.
    pub fn output(&self) -> NodeId {
        self.output.id()
    }

    /// Dry-path gain.
    pub fn dry_gain(&self) -> &GainNode {
        &self.dry
    }

    /// Wet-path gain.
    pub fn wet_gain(&self) -> &GainNode {
        &self.wet
    }

    /// Entry point of the wet chain.
    pub fn wet_input(&self) -> NodeId {
        self.wet_input.id()
    }

    /// Exit point of the wet chain.
    pub fn wet_output(&self) -> NodeId {
        self.wet_output.id()
    }
}
