//! Property tests for the engine controller and scheduler.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use stompbox_config::EngineConfig;
use stompbox_effects::{ParamKey, Pedal};
use stompbox_engine::{EngineController, Scheduler};
use stompbox_io::MockBackend;

fn connected() -> EngineController {
    let mut engine = EngineController::new(Box::new(MockBackend::new()), EngineConfig::default());
    engine.connect().unwrap();
    engine
}

fn any_value() -> impl Strategy<Value = f32> {
    prop_oneof![
        -1000.0f32..1000.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(f32::NEG_INFINITY),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn bypass_always_mirrors_pedal_state(toggles in prop::collection::vec(0usize..Pedal::ALL.len(), 0..24)) {
        let mut engine = connected();
        let nodes = engine.node_count();
        for i in toggles {
            engine.toggle_pedal(Pedal::ALL[i]);
        }
        prop_assert_eq!(engine.node_count(), nodes);
        let chain = engine.chain().unwrap();
        for pedal in Pedal::ALL.into_iter().filter(|p| p.has_stage()) {
            prop_assert_eq!(chain.is_bypassed(pedal), !engine.pedal_state().get(pedal));
        }
    }

    #[test]
    fn knobs_never_leave_their_range(
        updates in prop::collection::vec((0usize..ParamKey::ALL.len(), any_value()), 1..16)
    ) {
        let mut engine = EngineController::new(Box::new(MockBackend::new()), EngineConfig::default());
        for (i, value) in updates {
            let key = ParamKey::ALL[i];
            engine.update_param(key.effect(), key.field(), value).unwrap();
        }
        prop_assert!(engine.params().out_of_range().next().is_none());
    }

    #[test]
    fn scheduler_never_runs_ahead_of_its_period(
        period_ms in 1u64..200,
        steps in prop::collection::vec(0u64..500, 1..40),
    ) {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.every((), Duration::from_millis(period_ms), t0);

        let mut elapsed = 0;
        let mut runs = 0;
        for step in steps {
            elapsed += step;
            let due = scheduler.due(t0 + Duration::from_millis(elapsed));
            prop_assert!(due.len() <= 1);
            runs += due.len() as u64;
        }
        prop_assert!(runs <= elapsed / period_ms);
    }
}
