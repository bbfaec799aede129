//! Pedal parameters.
//!
//! Each effect has a fixed-field record; the board keeps one of each plus the
//! master volume in [`PedalParams`]. Outside callers address a field by
//! `(effect, field)` strings, which [`ParamKey::parse`] turns into a
//! statically known key once at the boundary. Everything past that point
//! dispatches on the key.
//!
//! The store itself does not clamp: [`ParamKey::descriptor`] carries the range
//! and callers clamp before calling [`PedalParams::set`].

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use stompbox_core::{ParamDescriptor, ParamUnit};

use crate::pedal::Pedal;

/// Time constant for live parameter changes, in seconds.
pub const PARAM_TIME_CONSTANT: f32 = 0.01;

/// Compressor knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorParams {
    /// Threshold in dB.
    pub threshold: f32,
    /// Ratio (n:1).
    pub ratio: f32,
    /// Attack in seconds.
    pub attack: f32,
    /// Release in seconds.
    pub release: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold: -20.0,
            ratio: 4.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

/// Drive knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    /// Curve amount, 0..1.
    pub gain: f32,
    /// Tone filter position, 0..1.
    pub tone: f32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            gain: 0.7,
            tone: 0.6,
        }
    }
}

/// Distortion knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionParams {
    /// Curve amount, 0..1.
    pub gain: f32,
    /// Tone filter position, 0..1.
    pub tone: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            gain: 0.8,
            tone: 0.6,
        }
    }
}

/// Chorus knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusParams {
    /// LFO rate in Hz.
    pub rate: f32,
    /// Modulation depth, 0..1.
    pub depth: f32,
    /// Feedback amount, 0..1.
    pub feedback: f32,
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self {
            rate: 1.5,
            depth: 0.7,
            feedback: 0.4,
        }
    }
}

/// Tremolo knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TremoloParams {
    /// LFO rate in Hz.
    pub rate: f32,
    /// Amplitude swing, 0..1.
    pub depth: f32,
}

impl Default for TremoloParams {
    fn default() -> Self {
        Self {
            rate: 4.0,
            depth: 0.5,
        }
    }
}

/// Delay knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayParams {
    /// Delay time in seconds.
    pub time: f32,
    /// Feedback gain.
    pub feedback: f32,
    /// Wet level.
    pub mix: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            time: 0.3,
            feedback: 0.4,
            mix: 0.5,
        }
    }
}

/// Wah knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WahParams {
    /// Pedal position, 0..1.
    pub frequency: f32,
    /// Filter Q.
    pub resonance: f32,
}

impl Default for WahParams {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            resonance: 10.0,
        }
    }
}

/// Reverb knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbParams {
    /// Tail length, 0..1.
    pub decay: f32,
    /// Wet level.
    pub mix: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            decay: 0.5,
            mix: 0.5,
        }
    }
}

/// All knob values on the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedalParams {
    /// Compressor knobs.
    pub compressor: CompressorParams,
    /// Drive knobs.
    pub drive: DriveParams,
    /// Distortion knobs.
    pub distortion: DistortionParams,
    /// Chorus knobs.
    pub chorus: ChorusParams,
    /// Tremolo knobs.
    pub tremolo: TremoloParams,
    /// Delay knobs.
    pub delay: DelayParams,
    /// Wah knobs.
    pub wah: WahParams,
    /// Reverb knobs.
    pub reverb: ReverbParams,
    /// Master volume, 0..1.
    pub volume: f32,
}

impl Default for PedalParams {
    fn default() -> Self {
        Self {
            compressor: CompressorParams::default(),
            drive: DriveParams::default(),
            distortion: DistortionParams::default(),
            chorus: ChorusParams::default(),
            tremolo: TremoloParams::default(),
            delay: DelayParams::default(),
            wah: WahParams::default(),
            reverb: ReverbParams::default(),
            volume: 0.8,
        }
    }
}

impl PedalParams {
    /// Current value of `key`.
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::CompressorThreshold => self.compressor.threshold,
            ParamKey::CompressorRatio => self.compressor.ratio,
            ParamKey::CompressorAttack => self.compressor.attack,
            ParamKey::CompressorRelease => self.compressor.release,
            ParamKey::DriveGain => self.drive.gain,
            ParamKey::DriveTone => self.drive.tone,
            ParamKey::DistortionGain => self.distortion.gain,
            ParamKey::DistortionTone => self.distortion.tone,
            ParamKey::ChorusRate => self.chorus.rate,
            ParamKey::ChorusDepth => self.chorus.depth,
            ParamKey::ChorusFeedback => self.chorus.feedback,
            ParamKey::TremoloRate => self.tremolo.rate,
            ParamKey::TremoloDepth => self.tremolo.depth,
            ParamKey::DelayTime => self.delay.time,
            ParamKey::DelayFeedback => self.delay.feedback,
            ParamKey::DelayMix => self.delay.mix,
            ParamKey::WahFrequency => self.wah.frequency,
            ParamKey::WahResonance => self.wah.resonance,
            ParamKey::ReverbDecay => self.reverb.decay,
            ParamKey::ReverbMix => self.reverb.mix,
            ParamKey::Volume => self.volume,
        }
    }

    /// Stores `value` under `key` as given.
    pub fn set(&mut self, key: ParamKey, value: f32) {
        let slot = match key {
            ParamKey::CompressorThreshold => &mut self.compressor.threshold,
            ParamKey::CompressorRatio => &mut self.compressor.ratio,
            ParamKey::CompressorAttack => &mut self.compressor.attack,
            ParamKey::CompressorRelease => &mut self.compressor.release,
            ParamKey::DriveGain => &mut self.drive.gain,
            ParamKey::DriveTone => &mut self.drive.tone,
            ParamKey::DistortionGain => &mut self.distortion.gain,
            ParamKey::DistortionTone => &mut self.distortion.tone,
            ParamKey::ChorusRate => &mut self.chorus.rate,
            ParamKey::ChorusDepth => &mut self.chorus.depth,
            ParamKey::ChorusFeedback => &mut self.chorus.feedback,
            ParamKey::TremoloRate => &mut self.tremolo.rate,
            ParamKey::TremoloDepth => &mut self.tremolo.depth,
            ParamKey::DelayTime => &mut self.delay.time,
            ParamKey::DelayFeedback => &mut self.delay.feedback,
            ParamKey::DelayMix => &mut self.delay.mix,
            ParamKey::WahFrequency => &mut self.wah.frequency,
            ParamKey::WahResonance => &mut self.wah.resonance,
            ParamKey::ReverbDecay => &mut self.reverb.decay,
            ParamKey::ReverbMix => &mut self.reverb.mix,
            ParamKey::Volume => &mut self.volume,
        };
        *slot = value;
    }

    /// Keys whose value lies outside the descriptor range (or is not finite).
    pub fn out_of_range(&self) -> impl Iterator<Item = ParamKey> + '_ {
        ParamKey::ALL
            .into_iter()
            .filter(|&k| !k.descriptor().contains(self.get(k)))
    }

    /// Copy with every field clamped into its descriptor range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for key in ParamKey::ALL {
            out.set(key, key.descriptor().clamp(self.get(key)));
        }
        out
    }
}

/// A single knob on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ParamKey {
    CompressorThreshold,
    CompressorRatio,
    CompressorAttack,
    CompressorRelease,
    DriveGain,
    DriveTone,
    DistortionGain,
    DistortionTone,
    ChorusRate,
    ChorusDepth,
    ChorusFeedback,
    TremoloRate,
    TremoloDepth,
    DelayTime,
    DelayFeedback,
    DelayMix,
    WahFrequency,
    WahResonance,
    ReverbDecay,
    ReverbMix,
    /// Master volume; not owned by any pedal.
    Volume,
}

impl ParamKey {
    /// Every key in board order.
    pub const ALL: [ParamKey; 21] = [
        ParamKey::CompressorThreshold,
        ParamKey::CompressorRatio,
        ParamKey::CompressorAttack,
        ParamKey::CompressorRelease,
        ParamKey::DriveGain,
        ParamKey::DriveTone,
        ParamKey::DistortionGain,
        ParamKey::DistortionTone,
        ParamKey::ChorusRate,
        ParamKey::ChorusDepth,
        ParamKey::ChorusFeedback,
        ParamKey::TremoloRate,
        ParamKey::TremoloDepth,
        ParamKey::DelayTime,
        ParamKey::DelayFeedback,
        ParamKey::DelayMix,
        ParamKey::WahFrequency,
        ParamKey::WahResonance,
        ParamKey::ReverbDecay,
        ParamKey::ReverbMix,
        ParamKey::Volume,
    ];

    /// Maps an `(effect, field)` pair onto a key.
    ///
    /// Master volume is `("volume", "")`, `("volume", "volume")` or
    /// `("master", "volume")`. Matching is exact and case-sensitive.
    ///
    /// ```rust
    /// use stompbox_effects::ParamKey;
    ///
    /// assert_eq!(ParamKey::parse("chorus", "rate"), Some(ParamKey::ChorusRate));
    /// assert_eq!(ParamKey::parse("chorus", "speed"), None);
    /// ```
    pub fn parse(effect: &str, field: &str) -> Option<ParamKey> {
        if matches!(
            (effect, field),
            ("volume", "" | "volume") | ("master", "volume")
        ) {
            return Some(ParamKey::Volume);
        }
        ParamKey::ALL
            .into_iter()
            .find(|k| k.effect() == effect && k.field() == field && *k != ParamKey::Volume)
    }

    /// Effect name half of the key.
    pub fn effect(self) -> &'static str {
        match self.pedal() {
            Some(pedal) => pedal.as_str(),
            None => "volume",
        }
    }

    /// Field name half of the key.
    pub fn field(self) -> &'static str {
        match self {
            ParamKey::CompressorThreshold => "threshold",
            ParamKey::CompressorRatio => "ratio",
            ParamKey::CompressorAttack => "attack",
            ParamKey::CompressorRelease => "release",
            ParamKey::DriveGain | ParamKey::DistortionGain => "gain",
            ParamKey::DriveTone | ParamKey::DistortionTone => "tone",
            ParamKey::ChorusRate | ParamKey::TremoloRate => "rate",
            ParamKey::ChorusDepth | ParamKey::TremoloDepth => "depth",
            ParamKey::ChorusFeedback | ParamKey::DelayFeedback => "feedback",
            ParamKey::DelayTime => "time",
            ParamKey::DelayMix | ParamKey::ReverbMix => "mix",
            ParamKey::WahFrequency => "frequency",
            ParamKey::WahResonance => "resonance",
            ParamKey::ReverbDecay => "decay",
            ParamKey::Volume => "volume",
        }
    }

    /// Pedal that owns this knob; `None` for the master volume.
    pub fn pedal(self) -> Option<Pedal> {
        let pedal = match self {
            ParamKey::CompressorThreshold
            | ParamKey::CompressorRatio
            | ParamKey::CompressorAttack
            | ParamKey::CompressorRelease => Pedal::Compressor,
            ParamKey::DriveGain | ParamKey::DriveTone => Pedal::Drive,
            ParamKey::DistortionGain | ParamKey::DistortionTone => Pedal::Distortion,
            ParamKey::ChorusRate | ParamKey::ChorusDepth | ParamKey::ChorusFeedback => {
                Pedal::Chorus
            }
            ParamKey::TremoloRate | ParamKey::TremoloDepth => Pedal::Tremolo,
            ParamKey::DelayTime | ParamKey::DelayFeedback | ParamKey::DelayMix => Pedal::Delay,
            ParamKey::WahFrequency | ParamKey::WahResonance => Pedal::Wah,
            ParamKey::ReverbDecay | ParamKey::ReverbMix => Pedal::Reverb,
            ParamKey::Volume => return None,
        };
        Some(pedal)
    }

    /// Range, default and unit of this knob.
    pub fn descriptor(self) -> ParamDescriptor {
        match self {
            ParamKey::CompressorThreshold => {
                ParamDescriptor::new("Threshold", ParamUnit::Decibels, -60.0, 0.0, -20.0)
                    .with_step(1.0)
            }
            ParamKey::CompressorRatio => {
                ParamDescriptor::new("Ratio", ParamUnit::Ratio, 1.0, 20.0, 4.0).with_step(0.5)
            }
            ParamKey::CompressorAttack => {
                ParamDescriptor::new("Attack", ParamUnit::Seconds, 0.0, 1.0, 0.003)
                    .with_step(0.001)
            }
            ParamKey::CompressorRelease => {
                ParamDescriptor::new("Release", ParamUnit::Seconds, 0.0, 1.0, 0.25)
            }
            ParamKey::DriveGain => ParamDescriptor::unit_interval("Drive", 0.7),
            ParamKey::DriveTone => ParamDescriptor::unit_interval("Drive Tone", 0.6),
            ParamKey::DistortionGain => ParamDescriptor::unit_interval("Distortion", 0.8),
            ParamKey::DistortionTone => ParamDescriptor::unit_interval("Distortion Tone", 0.6),
            ParamKey::ChorusRate => {
                ParamDescriptor::new("Chorus Rate", ParamUnit::Hertz, 0.01, 8.0, 1.5)
                    .with_step(0.05)
            }
            ParamKey::ChorusDepth => ParamDescriptor::unit_interval("Chorus Depth", 0.7),
            ParamKey::ChorusFeedback => ParamDescriptor::unit_interval("Chorus Feedback", 0.4),
            ParamKey::TremoloRate => {
                ParamDescriptor::new("Tremolo Rate", ParamUnit::Hertz, 0.5, 20.0, 4.0)
                    .with_step(0.1)
            }
            ParamKey::TremoloDepth => ParamDescriptor::unit_interval("Tremolo Depth", 0.5),
            ParamKey::DelayTime => {
                ParamDescriptor::new("Delay Time", ParamUnit::Seconds, 0.05, 1.0, 0.3)
                    .with_step(0.01)
            }
            ParamKey::DelayFeedback => {
                ParamDescriptor::new("Delay Feedback", ParamUnit::None, 0.0, 0.9, 0.4)
            }
            ParamKey::DelayMix => ParamDescriptor::unit_interval("Delay Mix", 0.5),
            ParamKey::WahFrequency => ParamDescriptor::unit_interval("Wah Position", 0.5),
            ParamKey::WahResonance => {
                ParamDescriptor::new("Wah Resonance", ParamUnit::Q, 1.0, 30.0, 10.0)
                    .with_step(0.5)
            }
            ParamKey::ReverbDecay => ParamDescriptor::unit_interval("Reverb Decay", 0.5),
            ParamKey::ReverbMix => ParamDescriptor::unit_interval("Reverb Mix", 0.5),
            ParamKey::Volume => ParamDescriptor::unit_interval("Volume", 0.8),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Volume => f.write_str("volume"),
            _ => write!(f, "{}.{}", self.effect(), self.field()),
        }
    }
}

/// An `(effect, field)` pair that names no knob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownParam {
    /// Effect half as given.
    pub effect: String,
    /// Field half as given.
    pub field: String,
}

impl fmt::Display for UnknownParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown parameter: {}.{}", self.effect, self.field)
    }
}

impl std::error::Error for UnknownParam {}

impl FromStr for ParamKey {
    type Err = UnknownParam;

    /// Parses the dotted form, `"delay.time"` or `"volume"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (effect, field) = s.split_once('.').unwrap_or((s, ""));
        ParamKey::parse(effect, field).ok_or_else(|| UnknownParam {
            effect: effect.to_string(),
            field: field.to_string(),
        })
    }
}
