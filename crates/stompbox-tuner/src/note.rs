//! Equal-temperament note mapping and the guitar string guide.

/// Pitch-class names, index 0 = C.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Concert pitch reference.
pub const A4_FREQUENCY: f64 = 440.0;

/// Readings outside this band are not mapped to notes.
pub const NOTE_RANGE_HZ: (f32, f32) = (20.0, 5000.0);

/// Minimum clarity for the string guide to show a reading.
pub const STRING_GUIDE_MIN_CLARITY: f32 = 0.15;

/// Deviation, in cents, within which a string counts as in tune.
pub const IN_TUNE_CENTS: f32 = 5.0;

/// One tuner reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunerData {
    /// Detected frequency in Hz; 0 when there is no pitch.
    pub frequency: f32,
    /// Pitch-class name, `"-"` when there is no pitch.
    pub note: &'static str,
    /// Deviation from the nearest semitone, -50..=50.
    pub cents: i32,
    /// Scientific-pitch octave (A4 = octave 4).
    pub octave: i32,
    /// Detection confidence, 0..1.
    pub clarity: f32,
}

impl TunerData {
    /// The "no pitch" reading.
    pub const SILENT: TunerData = TunerData {
        frequency: 0.0,
        note: "-",
        cents: 0,
        octave: 0,
        clarity: 0.0,
    };

    /// True for anything but the silent sentinel.
    pub fn is_pitched(&self) -> bool {
        self.frequency > 0.0 && self.note != "-"
    }

    /// True if the string guide should display this reading.
    pub fn has_pitch(&self) -> bool {
        self.is_pitched() && self.clarity > STRING_GUIDE_MIN_CLARITY
    }

    /// Nearest standard-tuning string, when the reading has pitch.
    pub fn closest_string(&self) -> Option<StringMatch> {
        if self.has_pitch() {
            Some(closest_string(self.frequency))
        } else {
            None
        }
    }
}

impl Default for TunerData {
    fn default() -> Self {
        Self::SILENT
    }
}

/// Maps a frequency onto the nearest equal-tempered note.
///
/// Returns [`TunerData::SILENT`] outside 20..5000 Hz or for non-finite input.
/// The returned clarity is 1; callers overwrite it with the detector's value.
///
/// ```rust
/// use stompbox_tuner::note_from_frequency;
///
/// let a = note_from_frequency(440.0);
/// assert_eq!((a.note, a.octave, a.cents), ("A", 4, 0));
/// ```
pub fn note_from_frequency(frequency: f32) -> TunerData {
    if !frequency.is_finite() || frequency < NOTE_RANGE_HZ.0 || frequency > NOTE_RANGE_HZ.1 {
        return TunerData::SILENT;
    }

    let semitones = 12.0 * (f64::from(frequency) / A4_FREQUENCY).log2();
    let rounded = semitones.round();
    let cents = ((semitones - rounded) * 100.0).round() as i32;
    let midi = 69 + rounded as i32;
    let note = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;

    TunerData {
        frequency,
        note,
        cents,
        octave,
        clarity: 1.0,
    }
}

/// Frequency of a MIDI note number.
pub fn midi_to_frequency(midi: i32) -> f32 {
    (A4_FREQUENCY * 2f64.powf(f64::from(midi - 69) / 12.0)) as f32
}

/// An open string of a guitar in standard tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuitarString {
    /// Scientific-pitch name, e.g. `"E2"`.
    pub name: &'static str,
    /// Target frequency in Hz.
    pub frequency: f32,
}

/// Standard tuning, low to high.
pub const STANDARD_TUNING: [GuitarString; 6] = [
    GuitarString { name: "E2", frequency: 82.41 },
    GuitarString { name: "A2", frequency: 110.0 },
    GuitarString { name: "D3", frequency: 146.83 },
    GuitarString { name: "G3", frequency: 196.0 },
    GuitarString { name: "B3", frequency: 246.94 },
    GuitarString { name: "E4", frequency: 329.63 },
];

/// Which way to turn the peg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningDirection {
    /// Within ±5 cents.
    InTune,
    /// Flat: raise the pitch.
    Tighten,
    /// Sharp: lower the pitch.
    Loosen,
}

/// Result of the string guide lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringMatch {
    /// Closest string.
    pub string: GuitarString,
    /// Signed distance in cents; negative is flat.
    pub delta_cents: f32,
}

impl StringMatch {
    /// Peg direction for this match.
    pub fn direction(&self) -> TuningDirection {
        if self.delta_cents.abs() <= IN_TUNE_CENTS {
            TuningDirection::InTune
        } else if self.delta_cents < 0.0 {
            TuningDirection::Tighten
        } else {
            TuningDirection::Loosen
        }
    }
}

/// Cents from `target` to `frequency`.
pub fn cents_between(frequency: f32, target: f32) -> f32 {
    1200.0 * (frequency / target).log2()
}

/// Nearest standard-tuning string by absolute cents distance.
pub fn closest_string(frequency: f32) -> StringMatch {
    let mut best = StringMatch {
        string: STANDARD_TUNING[0],
        delta_cents: cents_between(frequency, STANDARD_TUNING[0].frequency),
    };
    for s in &STANDARD_TUNING[1..] {
        let delta = cents_between(frequency, s.frequency);
        if delta.abs() < best.delta_cents.abs() {
            best = StringMatch {
                string: *s,
                delta_cents: delta,
            };
        }
    }
    best
}
