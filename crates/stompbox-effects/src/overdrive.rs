//! Wave-shaper overdrive, used by both the drive and the distortion pedal.
//!
//! ```text
//! wet_in ─► pre-gain ─► wave-shaper(curve(gain · curve_scale)) ─► lowpass ─► wet_out
//! ```
//!
//! The tone filter sits after the curve so it also tames the harmonics the
//! curve generates.

use stompbox_core::FilterKind;
use stompbox_core::graph::{AudioGraph, BiquadNode, GainNode, GraphError, NodeId, WaveShaperNode};

use crate::curve::distortion_curve;
use crate::params::{PARAM_TIME_CONSTANT, ParamKey};

/// Butterworth Q for the tone filter.
const TONE_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Fixed constants that make a pedal sound like a drive or a distortion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverdriveVoicing {
    /// Linear gain before the curve.
    pub pre_gain: f32,
    /// Multiplier from the gain knob to the curve amount.
    pub curve_scale: f32,
    /// Tone filter cutoff at tone = 0, in Hz.
    pub tone_base_hz: f32,
    /// Cutoff added at tone = 1, in Hz.
    pub tone_span_hz: f32,
}

impl OverdriveVoicing {
    /// Drive pedal: gentle curve, brighter tone range.
    pub const DRIVE: OverdriveVoicing = OverdriveVoicing {
        pre_gain: 1.5,
        curve_scale: 0.5,
        tone_base_hz: 3000.0,
        tone_span_hz: 5000.0,
    };

    /// Distortion pedal: hot pre-gain, full curve.
    pub const DISTORTION: OverdriveVoicing = OverdriveVoicing {
        pre_gain: 4.0,
        curve_scale: 1.0,
        tone_base_hz: 2000.0,
        tone_span_hz: 6000.0,
    };

    /// Tone filter cutoff for a tone knob position.
    pub fn tone_hz(&self, tone: f32) -> f32 {
        self.tone_base_hz + tone * self.tone_span_hz
    }
}

/// Pre-gain, wave-shaper and tone filter.
#[derive(Debug, Clone)]
pub struct OverdriveStage {
    voicing: OverdriveVoicing,
    pre_gain: GainNode,
    shaper: WaveShaperNode,
    tone: BiquadNode,
}

impl OverdriveStage {
    /// Builds the stage with the given knob values.
    pub fn build(
        graph: &mut AudioGraph,
        wet_in: NodeId,
        wet_out: NodeId,
        voicing: OverdriveVoicing,
        gain: f32,
        tone: f32,
    ) -> Result<Self, GraphError> {
        let pre_gain = graph.create_gain(voicing.pre_gain);
        let shaper = graph.create_wave_shaper();
        shaper.set_curve(distortion_curve(gain * voicing.curve_scale));
        let tone = graph.create_biquad(FilterKind::Lowpass, voicing.tone_hz(tone), TONE_Q);

        graph.connect(wet_in, pre_gain.id())?;
        graph.connect(pre_gain.id(), shaper.id())?;
        graph.connect(shaper.id(), tone.id())?;
        graph.connect(tone.id(), wet_out)?;

        Ok(Self {
            voicing,
            pre_gain,
            shaper,
            tone,
        })
    }

    /// Swaps in the curve for a new gain knob value.
    pub fn set_gain(&self, gain: f32) {
        self.shaper
            .set_curve(distortion_curve(gain * self.voicing.curve_scale));
    }

    /// Moves the tone filter.
    pub fn set_tone(&self, tone: f32) {
        self.tone
            .frequency
            .set_target_at_time(self.voicing.tone_hz(tone), PARAM_TIME_CONSTANT);
    }

    /// Routes a gain or tone key of either overdrive pedal.
    pub fn apply(&self, key: ParamKey, value: f32) {
        match key {
            ParamKey::DriveGain | ParamKey::DistortionGain => self.set_gain(value),
            ParamKey::DriveTone | ParamKey::DistortionTone => self.set_tone(value),
            _ => {}
        }
    }

    /// Voicing constants.
    pub fn voicing(&self) -> OverdriveVoicing {
        self.voicing
    }

    /// Pre-gain node.
    pub fn pre_gain(&self) -> &GainNode {
        &self.pre_gain
    }

    /// Wave-shaper node.
    pub fn shaper(&self) -> &WaveShaperNode {
        &self.shaper
    }

    /// Tone filter node.
    pub fn tone_filter(&self) -> &BiquadNode {
        &self.tone
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn gain_change_swaps_cached_curve() {
        let mut graph = AudioGraph::new(44100.0);
        let (src, dst) = (graph.source(), graph.destination());
        let stage =
            OverdriveStage::build(&mut graph, src, dst, OverdriveVoicing::DRIVE, 0.7, 0.6).unwrap();

        let before = stage.shaper().curve().unwrap();
        assert!(Arc::ptr_eq(&before, &distortion_curve(0.35)));

        stage.apply(ParamKey::DriveGain, 1.0);
        let after = stage.shaper().curve().unwrap();
        assert!(Arc::ptr_eq(&after, &distortion_curve(0.5)));
    }

    #[test]
    fn tone_maps_to_cutoff() {
        assert_eq!(OverdriveVoicing::DRIVE.tone_hz(0.6), 6000.0);
        assert_eq!(OverdriveVoicing::DISTORTION.tone_hz(1.0), 8000.0);

        let mut graph = AudioGraph::new(44100.0);
        let (src, dst) = (graph.source(), graph.destination());
        let stage =
            OverdriveStage::build(&mut graph, src, dst, OverdriveVoicing::DISTORTION, 0.8, 0.0)
                .unwrap();
        assert_eq!(stage.tone_filter().frequency.value(), 2000.0);
        stage.apply(ParamKey::DistortionTone, 0.5);
        assert_eq!(stage.tone_filter().frequency.target(), 5000.0);
        assert_eq!(stage.pre_gain().gain.value(), 4.0);
    }
}
