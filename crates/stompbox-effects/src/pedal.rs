//! Pedal identities and the engaged/bypassed state of the board.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// One switchable pedal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pedal {
    /// Dynamics compressor.
    Compressor,
    /// Light overdrive.
    Drive,
    /// Heavy distortion.
    Distortion,
    /// Chorus.
    Chorus,
    /// Tremolo.
    Tremolo,
    /// Feedback delay.
    Delay,
    /// Wah filter.
    Wah,
    /// Reverb.
    Reverb,
    /// Chromatic tuner; has no audio stage.
    Tuner,
}

/// Audio stages in signal order.
pub const CHAIN_ORDER: [Pedal; 8] = [
    Pedal::Compressor,
    Pedal::Drive,
    Pedal::Distortion,
    Pedal::Chorus,
    Pedal::Tremolo,
    Pedal::Delay,
    Pedal::Wah,
    Pedal::Reverb,
];

impl Pedal {
    /// Every pedal, chain order first, tuner last.
    pub const ALL: [Pedal; 9] = [
        Pedal::Compressor,
        Pedal::Drive,
        Pedal::Distortion,
        Pedal::Chorus,
        Pedal::Tremolo,
        Pedal::Delay,
        Pedal::Wah,
        Pedal::Reverb,
        Pedal::Tuner,
    ];

    /// Lowercase name as used in presets and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Pedal::Compressor => "compressor",
            Pedal::Drive => "drive",
            Pedal::Distortion => "distortion",
            Pedal::Chorus => "chorus",
            Pedal::Tremolo => "tremolo",
            Pedal::Delay => "delay",
            Pedal::Wah => "wah",
            Pedal::Reverb => "reverb",
            Pedal::Tuner => "tuner",
        }
    }

    /// True for pedals that own an audio stage.
    pub fn has_stage(self) -> bool {
        self != Pedal::Tuner
    }
}

impl fmt::Display for Pedal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised pedal name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePedalError(pub String);

impl fmt::Display for ParsePedalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pedal: {}", self.0)
    }
}

impl std::error::Error for ParsePedalError {}

impl FromStr for Pedal {
    type Err = ParsePedalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Pedal::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| ParsePedalError(s.to_string()))
    }
}

/// Which pedals are engaged. Everything is off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PedalState {
    /// Compressor engaged.
    pub compressor: bool,
    /// Drive engaged.
    pub drive: bool,
    /// Distortion engaged.
    pub distortion: bool,
    /// Chorus engaged.
    pub chorus: bool,
    /// Tremolo engaged.
    pub tremolo: bool,
    /// Delay engaged.
    pub delay: bool,
    /// Wah engaged.
    pub wah: bool,
    /// Reverb engaged.
    pub reverb: bool,
    /// Tuner running.
    pub tuner: bool,
}

impl PedalState {
    /// Engaged state of `pedal`.
    pub fn get(&self, pedal: Pedal) -> bool {
        match pedal {
            Pedal::Compressor => self.compressor,
            Pedal::Drive => self.drive,
            Pedal::Distortion => self.distortion,
            Pedal::Chorus => self.chorus,
            Pedal::Tremolo => self.tremolo,
            Pedal::Delay => self.delay,
            Pedal::Wah => self.wah,
            Pedal::Reverb => self.reverb,
            Pedal::Tuner => self.tuner,
        }
    }

    fn slot(&mut self, pedal: Pedal) -> &mut bool {
        match pedal {
            Pedal::Compressor => &mut self.compressor,
            Pedal::Drive => &mut self.drive,
            Pedal::Distortion => &mut self.distortion,
            Pedal::Chorus => &mut self.chorus,
            Pedal::Tremolo => &mut self.tremolo,
            Pedal::Delay => &mut self.delay,
            Pedal::Wah => &mut self.wah,
            Pedal::Reverb => &mut self.reverb,
            Pedal::Tuner => &mut self.tuner,
        }
    }

    /// Sets the engaged state of `pedal`.
    pub fn set(&mut self, pedal: Pedal, engaged: bool) {
        *self.slot(pedal) = engaged;
    }

    /// Flips `pedal` and returns its new state.
    pub fn toggle(&mut self, pedal: Pedal) -> bool {
        let slot = self.slot(pedal);
        *slot = !*slot;
        *slot
    }

    /// Engaged pedals in [`Pedal::ALL`] order.
    pub fn engaged(&self) -> impl Iterator<Item = Pedal> + '_ {
        Pedal::ALL.into_iter().filter(|&p| self.get(p))
    }

    /// Pedals whose state differs from `other`.
    pub fn diff<'a>(&'a self, other: &'a PedalState) -> impl Iterator<Item = Pedal> + 'a {
        Pedal::ALL
            .into_iter()
            .filter(|&p| self.get(p) != other.get(p))
    }
}
