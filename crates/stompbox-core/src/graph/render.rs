//! Compiled, allocation-free graph execution.
//!
//! [`GraphRenderer`] is produced by [`AudioGraph::compile`] and moved into the
//! audio callback. Nodes are evaluated one sample at a time in a topological
//! order in which audio edges *into* delay nodes are cut: a delay node emits
//! its delayed output at its place in the order, and its input is written
//! after every node has run. That split is what lets feedback loops through a
//! delay line render without a block of latency.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use libm::{expf, logf};

use super::GraphError;
use super::analyser::AnalyserTap;
use super::clock::{AudioClock, RenderLoad};
use super::context::{AudioGraph, NodeOp};
use super::curve::TransferCurve;
use super::param::{AudioParam, unpack};
use crate::biquad::{Biquad, FilterKind};
use crate::delay::DelayLine;
use crate::dynamics::{Compressor, CompressorSettings};
use crate::math::flush_denormal;
use crate::oscillator::SineOscillator;
use crate::param::SmoothedParam;

/// Most parameters any node reads per sample (the compressor).
const MAX_NODE_PARAMS: usize = 5;

/// Level a decay envelope reaches at the end of its decay time.
const DECAY_FLOOR: f32 = 0.001;

/// Render-side state of one [`AudioParam`].
struct ParamState {
    param: AudioParam,
    smoother: SmoothedParam,
    last_word: u64,
    /// Nodes whose output is added to the intrinsic value.
    modulators: Vec<usize>,
    value: f32,
}

impl ParamState {
    fn new(param: &AudioParam, sample_rate: f32) -> Self {
        let word = param.automation();
        let (target, time_constant) = unpack(word);
        Self {
            param: param.clone(),
            smoother: SmoothedParam::with_config(target, sample_rate, time_constant * 1000.0),
            last_word: word,
            modulators: Vec::new(),
            value: target,
        }
    }

    /// Picks up automation written since the last block.
    #[inline]
    fn refresh(&mut self) {
        let word = self.param.automation();
        if word == self.last_word {
            return;
        }
        self.last_word = word;
        let (target, time_constant) = unpack(word);
        if time_constant <= 0.0 {
            self.smoother.set_immediate(target);
        } else {
            self.smoother.set_smoothing_time_ms(time_constant * 1000.0);
            self.smoother.set_target(target);
        }
    }
}

/// Render side of a [`DecayNode`](super::DecayNode).
struct DecayEnvelope {
    triggers: Arc<AtomicU32>,
    seen: u32,
    level: f32,
    coeff: f32,
    remaining: u32,
}

impl DecayEnvelope {
    fn new(triggers: &Arc<AtomicU32>) -> Self {
        Self {
            // triggers issued before compiling do not fire
            seen: triggers.load(Ordering::Acquire),
            triggers: Arc::clone(triggers),
            level: 0.0,
            coeff: 0.0,
            remaining: 0,
        }
    }

    #[inline]
    fn next(&mut self, peak: f32, decay: f32, sample_rate: f32) -> f32 {
        let count = self.triggers.load(Ordering::Acquire);
        if count != self.seen {
            self.seen = count;
            if peak > DECAY_FLOOR {
                let samples = (decay * sample_rate).max(1.0);
                self.level = peak;
                self.coeff = expf(logf(DECAY_FLOOR / peak) / samples);
                self.remaining = samples as u32;
            } else {
                self.remaining = 0;
            }
        }

        if self.remaining == 0 {
            return 0.0;
        }
        self.remaining -= 1;
        let out = self.level;
        self.level *= self.coeff;
        out
    }
}

enum Processor {
    Source,
    Destination,
    Gain,
    Biquad {
        kind: FilterKind,
        filter: Biquad,
        frequency: f32,
        q: f32,
    },
    Delay(DelayLine),
    Oscillator(SineOscillator),
    Decay(DecayEnvelope),
    Compressor(Compressor),
    WaveShaper(Arc<ArcSwapOption<TransferCurve>>),
    Analyser(AnalyserTap),
}

impl Processor {
    fn new(op: &NodeOp, sample_rate: f32) -> Self {
        match op {
            NodeOp::Source => Processor::Source,
            NodeOp::Destination => Processor::Destination,
            NodeOp::Gain => Processor::Gain,
            NodeOp::Biquad(kind) => Processor::Biquad {
                kind: *kind,
                filter: Biquad::new(),
                // NaN forces a coefficient update on the first sample
                frequency: f32::NAN,
                q: f32::NAN,
            },
            NodeOp::Delay { max_seconds } => {
                Processor::Delay(DelayLine::from_time(sample_rate, *max_seconds))
            }
            NodeOp::Oscillator => Processor::Oscillator(SineOscillator::new(sample_rate)),
            NodeOp::Decay(triggers) => Processor::Decay(DecayEnvelope::new(triggers)),
            NodeOp::Compressor => Processor::Compressor(Compressor::new(sample_rate)),
            NodeOp::WaveShaper(curve) => Processor::WaveShaper(Arc::clone(curve)),
            NodeOp::Analyser(tap) => Processor::Analyser(tap.clone()),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, params: &[f32], sample_rate: f32) -> f32 {
        match self {
            Processor::Source | Processor::Destination => input,
            Processor::Gain => input * params[0],
            Processor::Biquad {
                kind,
                filter,
                frequency,
                q,
            } => {
                if params[0] != *frequency || params[1] != *q {
                    *frequency = params[0];
                    *q = params[1];
                    filter.configure(*kind, *frequency, *q, sample_rate);
                }
                filter.process(input)
            }
            // input is written at the end of the sample
            Processor::Delay(line) => line.read(params[0] * sample_rate),
            Processor::Oscillator(osc) => osc.next(params[0]),
            Processor::Decay(env) => env.next(params[0], params[1], sample_rate),
            Processor::Compressor(comp) => {
                let settings = CompressorSettings {
                    threshold: params[0],
                    knee: params[1],
                    ratio: params[2],
                    attack: params[3],
                    release: params[4],
                };
                comp.process(input, &settings)
            }
            Processor::WaveShaper(slot) => match &*slot.load() {
                Some(curve) => curve.lookup(input),
                None => input,
            },
            Processor::Analyser(tap) => {
                tap.push(input);
                input
            }
        }
    }
}

/// Executes a compiled audio graph.
///
/// Rendering never allocates, locks or blocks.
pub struct GraphRenderer {
    sample_rate: f32,
    processors: Vec<Processor>,
    /// Audio sources of each node.
    inputs: Vec<Vec<usize>>,
    /// Slice of `params` read by each node.
    node_params: Vec<Range<usize>>,
    params: Vec<ParamState>,
    order: Vec<usize>,
    delays: Vec<usize>,
    /// Output of every node for the current sample.
    outputs: Vec<f32>,
    source: usize,
    destination: usize,
    clock: AudioClock,
    load: RenderLoad,
}

impl core::fmt::Debug for GraphRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphRenderer")
            .field("sample_rate", &self.sample_rate)
            .field("nodes", &self.processors.len())
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}

impl GraphRenderer {
    pub(crate) fn build(
        graph: &AudioGraph,
        clock: AudioClock,
        load: RenderLoad,
    ) -> Result<Self, GraphError> {
        let sample_rate = graph.sample_rate();
        let n = graph.nodes.len();

        let mut processors = Vec::with_capacity(n);
        let mut node_params = Vec::with_capacity(n);
        let mut params: Vec<ParamState> = Vec::new();
        for spec in &graph.nodes {
            processors.push(Processor::new(&spec.op, sample_rate));
            let start = params.len();
            params.extend(spec.params.iter().map(|p| ParamState::new(p, sample_rate)));
            node_params.push(start..params.len());
        }

        let is_delay = |idx: usize| matches!(graph.nodes[idx].op, NodeOp::Delay { .. });

        // dependency edges for ordering: (before, after)
        let mut deps: Vec<(usize, usize)> = Vec::new();
        let mut inputs = vec![Vec::new(); n];
        for &(from, to) in &graph.edges {
            let (from, to) = (from.0 as usize, to.0 as usize);
            inputs[to].push(from);
            if !is_delay(to) {
                deps.push((from, to));
            }
        }
        for (from, param) in &graph.param_edges {
            let from = from.0 as usize;
            let owner = param.owner().0 as usize;
            let slot = node_params[owner]
                .clone()
                .find(|&i| params[i].param.same_as(param))
                .ok_or(GraphError::ForeignParam)?;
            params[slot].modulators.push(from);
            deps.push((from, owner));
        }

        let order = kahn_sort(n, &deps)?;
        let delays = (0..n).filter(|&i| is_delay(i)).collect();

        Ok(Self {
            sample_rate,
            processors,
            inputs,
            node_params,
            params,
            order,
            delays,
            outputs: vec![0.0; n],
            source: graph.source().0 as usize,
            destination: graph.destination().0 as usize,
            clock,
            load,
        })
    }

    /// Sample rate the renderer runs at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of nodes being rendered.
    pub fn node_count(&self) -> usize {
        self.processors.len()
    }

    /// Shared frame counter.
    pub fn clock(&self) -> &AudioClock {
        &self.clock
    }

    /// Shared render load.
    pub fn load(&self) -> &RenderLoad {
        &self.load
    }

    /// Renders one block of mono audio.
    ///
    /// `output.len()` frames are produced; missing input frames are silence.
    pub fn render(&mut self, input: &[f32], output: &mut [f32]) {
        let start = Instant::now();

        for p in &mut self.params {
            p.refresh();
        }

        for (i, out) in output.iter_mut().enumerate() {
            let x = input.get(i).copied().unwrap_or(0.0);
            *out = self.tick(x);
        }

        for p in &self.params {
            p.param.publish(p.value);
        }

        self.clock.advance(output.len());

        if !output.is_empty() {
            let budget = output.len() as f32 / self.sample_rate;
            let elapsed = start.elapsed().as_secs_f32();
            self.load.store(elapsed / budget * 100.0);
        }
    }

    /// Renders one sample.
    #[inline]
    fn tick(&mut self, x: f32) -> f32 {
        let Self {
            sample_rate,
            processors,
            inputs,
            node_params,
            params,
            order,
            delays,
            outputs,
            source,
            destination,
            ..
        } = self;

        let mut values = [0.0_f32; MAX_NODE_PARAMS];
        for &n in order.iter() {
            if n == *source {
                outputs[n] = x;
                continue;
            }

            let range = node_params[n].clone();
            let count = range.len();
            for (slot, p) in params[range].iter_mut().enumerate() {
                let intrinsic = p.smoother.advance();
                let modulation: f32 = p.modulators.iter().map(|&m| outputs[m]).sum();
                let v = intrinsic + modulation;
                p.value = if v.is_nan() {
                    intrinsic
                } else {
                    v.clamp(p.param.min_value(), p.param.max_value())
                };
                values[slot] = p.value;
            }

            let input: f32 = inputs[n].iter().map(|&s| outputs[s]).sum();
            outputs[n] = processors[n].process(input, &values[..count], *sample_rate);
        }

        for &d in delays.iter() {
            let input: f32 = inputs[d].iter().map(|&s| outputs[s]).sum();
            if let Processor::Delay(line) = &mut processors[d] {
                line.write(flush_denormal(input));
            }
        }

        outputs[*destination]
    }
}

/// Kahn's algorithm over `n` nodes. Fails if any node is left unordered.
fn kahn_sort(n: usize, deps: &[(usize, usize)]) -> Result<Vec<usize>, GraphError> {
    let mut in_degree = vec![0u32; n];
    let mut outgoing = vec![Vec::new(); n];
    for &(from, to) in deps {
        in_degree[to] += 1;
        outgoing[from].push(to);
    }

    // seeded in reverse so nodes pop in creation order
    let mut queue: Vec<usize> = (0..n).rev().filter(|&i| in_degree[i] == 0).collect();
    let mut sorted = Vec::with_capacity(n);

    while let Some(idx) = queue.pop() {
        sorted.push(idx);
        for &to in &outgoing[idx] {
            in_degree[to] -= 1;
            if in_degree[to] == 0 {
                queue.push(to);
            }
        }
    }

    if sorted.len() != n {
        return Err(GraphError::Cycle);
    }
    Ok(sorted)
}
