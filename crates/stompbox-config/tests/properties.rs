//! Property tests for preset validation and storage.

use proptest::prelude::*;
use stompbox_config::paths::sanitize_component;
use stompbox_config::{MemoryPresetStore, PresetStore, validate_params};
use stompbox_effects::{ParamKey, PedalParams, PedalState};

fn any_params() -> impl Strategy<Value = PedalParams> {
    prop::collection::vec(-100.0f32..100.0, ParamKey::ALL.len()).prop_map(|values| {
        let mut params = PedalParams::default();
        for (key, value) in ParamKey::ALL.into_iter().zip(values) {
            params.set(key, value);
        }
        params
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn clamped_params_always_validate(params in any_params()) {
        prop_assert!(validate_params(&params.clamped(), "test").is_ok());
    }

    #[test]
    fn save_accepts_exactly_the_in_range_boards(params in any_params()) {
        let mut store = MemoryPresetStore::new();
        let result = store.save("u", "P", &PedalState::default(), &params);
        prop_assert_eq!(result.is_ok(), params.out_of_range().next().is_none());
    }

    #[test]
    fn sanitized_components_are_single_safe_segments(raw in ".{0,40}") {
        let clean = sanitize_component(&raw);
        prop_assert!(!clean.is_empty());
        prop_assert!(clean.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
