//! Factory presets bundled with the pedalboard.
//!
//! Always available without external files. Each preset only lists the
//! pedals it engages and the knobs it moves; everything else keeps its
//! default.

use crate::Preset;

/// Ids of the factory presets, in display order.
pub static FACTORY_PRESET_IDS: &[&str] = &[
    "clean",
    "van-halen",
    "hard-rock",
    "metal",
    "blues",
    "ambient",
    "funk-wah",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("clean", CLEAN_PRESET),
    ("van-halen", BROWN_SOUND_PRESET),
    ("hard-rock", HARD_ROCK_PRESET),
    ("metal", METAL_PRESET),
    ("blues", BLUES_PRESET),
    ("ambient", AMBIENT_PRESET),
    ("funk-wah", FUNK_WAH_PRESET),
];

const CLEAN_PRESET: &str = r#"
id = "clean"
name = "Clean"
description = "Crystal clear, no coloring"
category = "clean"

[pedals]
compressor = true
reverb = true

[params]
volume = 0.8

[params.compressor]
threshold = -20.0
ratio = 4.0
attack = 0.003
release = 0.25

[params.reverb]
decay = 0.3
mix = 0.2
"#;

const BROWN_SOUND_PRESET: &str = r#"
id = "van-halen"
name = "Brown Sound"
description = "Classic late-70s hard rock"
category = "rock"

[pedals]
compressor = true
drive = true
chorus = true
delay = true
reverb = true

[params]
volume = 0.85

[params.compressor]
threshold = -15.0
ratio = 6.0
attack = 0.002
release = 0.2

[params.drive]
gain = 0.75
tone = 0.65

[params.chorus]
rate = 0.8
depth = 0.3
feedback = 0.2

[params.delay]
time = 0.35
feedback = 0.3
mix = 0.25

[params.reverb]
decay = 0.4
mix = 0.3
"#;

const HARD_ROCK_PRESET: &str = r#"
id = "hard-rock"
name = "Hard Rock"
description = "Stadium crunch"
category = "rock"

[pedals]
compressor = true
drive = true
reverb = true

[params]
volume = 0.85

[params.compressor]
threshold = -18.0
ratio = 5.0
attack = 0.003
release = 0.25

[params.drive]
gain = 0.65
tone = 0.7

[params.reverb]
decay = 0.35
mix = 0.25
"#;

const METAL_PRESET: &str = r#"
id = "metal"
name = "Metal"
description = "Aggressive high gain"
category = "metal"

[pedals]
compressor = true
drive = true
reverb = true

[params]
volume = 0.9

[params.compressor]
threshold = -12.0
ratio = 8.0
attack = 0.001
release = 0.15

[params.drive]
gain = 0.95
tone = 0.55

[params.reverb]
decay = 0.25
mix = 0.15
"#;

const BLUES_PRESET: &str = r#"
id = "blues"
name = "Blues"
description = "Warm and expressive"
category = "blues"

[pedals]
compressor = true
drive = true
delay = true
reverb = true

[params]
volume = 0.75

[params.compressor]
threshold = -25.0
ratio = 3.0
attack = 0.005
release = 0.3

[params.drive]
gain = 0.4
tone = 0.45

[params.delay]
time = 0.25
feedback = 0.2
mix = 0.2

[params.reverb]
decay = 0.5
mix = 0.35
"#;

const AMBIENT_PRESET: &str = r#"
id = "ambient"
name = "Ambient"
description = "Spacious and atmospheric"
category = "ambient"

[pedals]
compressor = true
chorus = true
tremolo = true
delay = true
reverb = true

[params]
volume = 0.7

[params.compressor]
threshold = -30.0
ratio = 2.0
attack = 0.01
release = 0.5

[params.chorus]
rate = 0.5
depth = 0.6
feedback = 0.4

[params.tremolo]
rate = 2.0
depth = 0.3

[params.delay]
time = 0.5
feedback = 0.5
mix = 0.45

[params.reverb]
decay = 0.8
mix = 0.6
"#;

const FUNK_WAH_PRESET: &str = r#"
id = "funk-wah"
name = "Funk Wah"
description = "Groove with an expressive wah"
category = "clean"

[pedals]
compressor = true
wah = true

[params]
volume = 0.8

[params.compressor]
threshold = -20.0
ratio = 4.0
attack = 0.002
release = 0.2

[params.wah]
frequency = 0.5
resonance = 15.0
"#;

/// All factory presets in display order.
///
/// A preset that fails to parse is skipped and logged.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(id, toml_str)| match Preset::from_toml(toml_str) {
            Ok(preset) => Some(preset),
            Err(e) => {
                tracing::warn!(preset = id, error = %e, "factory preset failed to load");
                None
            }
        })
        .collect()
}

/// Factory preset by id.
pub fn get_factory_preset(id: &str) -> Option<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .find(|(preset_id, _)| *preset_id == id)
        .and_then(|(_, toml_str)| Preset::from_toml(toml_str).ok())
}

/// True if `id` names a factory preset.
pub fn is_factory_preset(id: &str) -> bool {
    FACTORY_PRESET_IDS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PresetCategory;
    use stompbox_effects::{Pedal, PedalParams};

    #[test]
    fn every_factory_preset_parses() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESET_IDS.len());
        for (preset, id) in presets.iter().zip(FACTORY_PRESET_IDS) {
            assert_eq!(preset.id, *id);
            assert!(preset.params.out_of_range().next().is_none(), "{id}");
        }
    }

    #[test]
    fn ids_and_table_agree() {
        for id in FACTORY_PRESET_IDS {
            assert!(is_factory_preset(id));
            assert!(get_factory_preset(id).is_some(), "{id}");
        }
        assert!(!is_factory_preset("djent"));
        assert!(get_factory_preset("djent").is_none());
    }

    #[test]
    fn brown_sound_values() {
        let preset = get_factory_preset("van-halen").unwrap();
        assert_eq!(preset.name, "Brown Sound");
        assert_eq!(preset.category, PresetCategory::Rock);
        let engaged: Vec<Pedal> = preset.pedal_state.engaged().collect();
        assert_eq!(
            engaged,
            vec![
                Pedal::Compressor,
                Pedal::Drive,
                Pedal::Chorus,
                Pedal::Delay,
                Pedal::Reverb
            ]
        );
        assert_eq!(preset.params.compressor.ratio, 6.0);
        assert_eq!(preset.params.delay.time, 0.35);
        assert_eq!(preset.params.volume, 0.85);
        // untouched sections keep defaults
        assert_eq!(preset.params.wah, PedalParams::default().wah);
    }

    #[test]
    fn no_factory_preset_runs_the_tuner() {
        assert!(factory_presets().iter().all(|p| !p.pedal_state.tuner));
    }
}
