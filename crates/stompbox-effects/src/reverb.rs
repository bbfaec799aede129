//! Reverb pedal: a small feedback delay network.
//!
//! ```text
//!          ┌─► delay₀ ─► lowpass₀ ─┬─► (Σ · 0.5) ─► mix ─► wet_out
//! wet_in ──┤      ▲               │
//!          │      └──── fb₀ ◄─────┘            (× 4 lines)
//!          └──────────────────────────────────────────► wet_out
//! ```
//!
//! Line lengths are mutually prime so the echoes of the four lines never
//! line up into an audible repeating pattern. The lowpass sits inside each
//! loop, so every pass darkens the tail.

use stompbox_core::FilterKind;
use stompbox_core::graph::{AudioGraph, BiquadNode, DelayNode, GainNode, GraphError, NodeId};

use crate::params::{PARAM_TIME_CONSTANT, ParamKey, ReverbParams};

/// Line lengths in samples at the reference rate.
const BASE_LENGTHS: [usize; 4] = [1307, 1637, 1811, 1931];
/// Rate the base lengths are tuned for.
const REFERENCE_RATE: f32 = 44100.0;
/// Damping cutoff inside each loop.
const DAMPING_HZ: f32 = 4000.0;
/// Loop gain at decay = 1.
const DECAY_SCALE: f32 = 0.75;
/// Level of the summed lines.
const SUM_GAIN: f32 = 0.5;
/// Headroom on the delay lines above the longest length.
const MAX_DELAY_SECONDS: f32 = 0.1;

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Line lengths in samples for `sample_rate`.
///
/// The reference lengths are scaled to the rate, then each length is nudged
/// upwards until it is coprime with every shorter line.
///
/// ```rust
/// use stompbox_effects::reverb_delay_lengths;
///
/// assert_eq!(reverb_delay_lengths(44100.0), [1307, 1637, 1811, 1931]);
/// ```
pub fn reverb_delay_lengths(sample_rate: f32) -> [usize; 4] {
    let scale = if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate / REFERENCE_RATE
    } else {
        1.0
    };
    let mut lengths = [0usize; 4];
    for i in 0..lengths.len() {
        let mut len = ((BASE_LENGTHS[i] as f32 * scale).round() as usize).max(2);
        while lengths[..i].iter().any(|&prev| len <= prev || gcd(len, prev) != 1) {
            len += 1;
        }
        lengths[i] = len;
    }
    lengths
}

/// One delay line of the network.
#[derive(Debug, Clone)]
pub struct ReverbLine {
    /// Delay line.
    pub delay: DelayNode,
    /// Damping filter in the loop.
    pub damping: BiquadNode,
    /// Loop gain.
    pub feedback: GainNode,
}

/// Four damped feedback lines plus a direct path.
#[derive(Debug, Clone)]
pub struct ReverbStage {
    lines: Vec<ReverbLine>,
    mix: GainNode,
}

impl ReverbStage {
    /// Builds the network with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        params: &ReverbParams,
    ) -> Result<Self, GraphError> {
        let sample_rate = graph.sample_rate();
        let sum = graph.create_gain(SUM_GAIN);
        let mix = graph.create_gain(params.mix);

        let mut lines = Vec::with_capacity(BASE_LENGTHS.len());
        for len in reverb_delay_lengths(sample_rate) {
            let delay = graph.create_delay(MAX_DELAY_SECONDS);
            delay.delay_time.set_value(len as f32 / sample_rate);
            let damping = graph.create_biquad(
                FilterKind::Lowpass,
                DAMPING_HZ,
                core::f32::consts::FRAC_1_SQRT_2,
            );
            let feedback = graph.create_gain(params.decay * DECAY_SCALE);

            graph.connect(wet_in, delay.id())?;
            graph.connect(delay.id(), damping.id())?;
            graph.connect(damping.id(), feedback.id())?;
            graph.connect(feedback.id(), delay.id())?;
            graph.connect(damping.id(), sum.id())?;

            lines.push(ReverbLine {
                delay,
                damping,
                feedback,
            });
        }

        graph.connect(sum.id(), mix.id())?;
        graph.connect(mix.id(), wet_out)?;
        graph.connect(wet_in, wet_out)?;

        Ok(Self { lines, mix })
    }

    /// Pushes one knob onto the nodes. Keys of other pedals are ignored.
    pub fn apply(&self, key: ParamKey, params: &ReverbParams) {
        match key {
            ParamKey::ReverbDecay => {
                for line in &self.lines {
                    line.feedback
                        .gain
                        .set_target_at_time(params.decay * DECAY_SCALE, PARAM_TIME_CONSTANT);
                }
            }
            ParamKey::ReverbMix => self
                .mix
                .gain
                .set_target_at_time(params.mix, PARAM_TIME_CONSTANT),
            _ => {}
        }
    }

    /// The network's lines, shortest first.
    pub fn lines(&self) -> &[ReverbLine] {
        &self.lines
    }

    /// Wet level gain.
    pub fn mix(&self) -> &GainNode {
        &self.mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mutually_prime(lengths: &[usize]) {
        for (i, &a) in lengths.iter().enumerate() {
            for &b in &lengths[i + 1..] {
                assert_eq!(gcd(a, b), 1, "{a} and {b} share a factor");
            }
        }
    }

    #[test]
    fn lengths_stay_mutually_prime_at_common_rates() {
        for sr in [22050.0, 32000.0, 44100.0, 48000.0, 88200.0, 96000.0, 192000.0] {
            let lengths = reverb_delay_lengths(sr);
            assert_mutually_prime(&lengths);
            assert!(lengths.windows(2).all(|w| w[0] < w[1]));
            // within a few samples of the scaled reference
            let scaled = (1931.0 * sr / 44100.0) as usize;
            assert!(lengths[3].abs_diff(scaled) < 16, "{sr}: {lengths:?}");
        }
    }

    #[test]
    fn lengths_fit_the_delay_lines() {
        let longest = reverb_delay_lengths(192000.0)[3] as f32 / 192000.0;
        assert!(longest < MAX_DELAY_SECONDS);
    }

    #[test]
    fn tail_decays() {
        let sr = 44100.0;
        let mut graph = AudioGraph::new(sr);
        let (src, dst) = (graph.source(), graph.destination());
        let params = ReverbParams {
            decay: 1.0,
            mix: 1.0,
        };
        ReverbStage::build(&mut graph, src, dst, &params).unwrap();
        let mut r = graph.compile().unwrap();

        let mut input = vec![0.0; sr as usize * 4];
        input[0] = 1.0;
        let mut out = vec![0.0; input.len()];
        r.render(&input, &mut out);

        let early: f32 = out[1300..10_000].iter().map(|s| s.abs()).fold(0.0, f32::max);
        let late: f32 = out[out.len() - 4410..]
            .iter()
            .map(|s| s.abs())
            .fold(0.0, f32::max);
        assert!(early > 0.01);
        assert!(late < early * 0.01, "early {early} late {late}");
    }
}
