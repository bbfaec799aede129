//! Argument parsing and preset lookup shared by the commands.

use anyhow::Context;
use stompbox_config::{FilePresetStore, Preset, PresetStore, get_factory_preset};
use stompbox_effects::{ParamKey, Pedal, PedalParams, PedalState};

/// Default user for presets saved from the terminal.
pub const DEFAULT_USER: &str = "local";

/// Parses `effect.field=value`, e.g. `delay.time=0.5` or `volume=0.7`.
pub fn parse_param_assignment(s: &str) -> Result<(ParamKey, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format: '{s}' (expected effect.field=value)"))?;
    let key: ParamKey = key.trim().parse().map_err(|e| format!("{e}"))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid value for {key}: '{}'", value.trim()))?;
    Ok((key, value))
}

/// Parses a pedal name such as `drive` or `tuner`.
pub fn parse_pedal(s: &str) -> Result<Pedal, String> {
    s.parse::<Pedal>().map_err(|e| e.to_string())
}

/// Looks up `id` among the factory presets, then the user's saved presets.
pub fn find_preset(store: &FilePresetStore, user: &str, id: &str) -> anyhow::Result<Preset> {
    if let Some(preset) = get_factory_preset(id) {
        return Ok(preset);
    }
    store
        .list(user)
        .with_context(|| format!("reading presets of '{user}'"))?
        .into_iter()
        .find(|p| p.id == id)
        .with_context(|| format!("preset not found: {id}"))
}

/// Board described by an optional base preset plus command-line overrides.
///
/// Engaged pedals are added to the base; assignments are clamped into range.
pub fn board_from_flags(
    base: Option<&Preset>,
    on: &[Pedal],
    set: &[(ParamKey, f32)],
) -> (PedalState, PedalParams) {
    let mut state = base.map(|p| p.pedal_state).unwrap_or_default();
    let mut params = base.map(|p| p.params).unwrap_or_default();
    for &pedal in on {
        state.set(pedal, true);
    }
    for &(key, value) in set {
        params.set(key, key.descriptor().clamp(value));
    }
    (state, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assignments() {
        assert_eq!(
            parse_param_assignment("delay.time=0.5"),
            Ok((ParamKey::DelayTime, 0.5))
        );
        assert_eq!(
            parse_param_assignment(" volume = 0.7 "),
            Ok((ParamKey::Volume, 0.7))
        );
        assert!(parse_param_assignment("delay.time").is_err());
        assert!(parse_param_assignment("fuzz.gain=1").unwrap_err().contains("fuzz.gain"));
        assert!(parse_param_assignment("delay.time=fast").is_err());
    }

    #[test]
    fn parses_pedals() {
        assert_eq!(parse_pedal("Tuner"), Ok(Pedal::Tuner));
        assert_eq!(parse_pedal("fuzz").unwrap_err(), "unknown pedal: fuzz");
    }

    #[test]
    fn flags_override_the_base_preset() {
        let base = get_factory_preset("blues").unwrap();
        let (state, params) = board_from_flags(
            Some(&base),
            &[Pedal::Delay],
            &[(ParamKey::DriveGain, 99.0)],
        );
        assert!(state.drive && state.delay);
        assert_eq!(params.drive.gain, ParamKey::DriveGain.descriptor().max);
        assert_eq!(params.reverb, base.params.reverb);
    }

    #[test]
    fn finds_factory_and_user_presets() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FilePresetStore::new(dir.path());
        let saved = store
            .save(DEFAULT_USER, "Mine", &PedalState::default(), &PedalParams::default())
            .unwrap();

        assert_eq!(find_preset(&store, DEFAULT_USER, "metal").unwrap().id, "metal");
        assert_eq!(find_preset(&store, DEFAULT_USER, &saved.id).unwrap(), saved);
        assert!(find_preset(&store, DEFAULT_USER, "nope").is_err());
    }
}
