//! Property-based tests for stompbox-core.
//!
//! Tests smoothing convergence, delay line bounds, transfer curve lookup and
//! graph stability using proptest for randomized input generation.

use proptest::prelude::*;
use stompbox_core::graph::{AudioGraph, TransferCurve};
use stompbox_core::{DelayLine, FilterKind, SmoothedParam};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// A smoothed parameter always lands exactly on its target.
    #[test]
    fn smoothed_param_settles_exactly(
        start in -10.0f32..10.0,
        target in -10.0f32..10.0,
        time_ms in 0.1f32..20.0,
    ) {
        let mut p = SmoothedParam::with_config(start, 48000.0, time_ms);
        p.set_target(target);
        for _ in 0..48000 {
            p.advance();
        }
        prop_assert_eq!(p.get(), target);
    }

    /// Delay reads never panic and never invent energy.
    #[test]
    fn delay_read_is_bounded(
        delay in -100.0f32..10_000.0,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut line = DelayLine::new(64);
        for &s in &input {
            line.write(s);
            let out = line.read(delay);
            prop_assert!(out.is_finite());
            prop_assert!(out.abs() <= 1.0);
        }
    }

    /// Lookup stays within the table's value range.
    #[test]
    fn curve_lookup_within_table_bounds(
        table in prop::collection::vec(-2.0f32..2.0, 2..64),
        x in -4.0f32..4.0,
    ) {
        let lo = table.iter().copied().fold(f32::MAX, f32::min);
        let hi = table.iter().copied().fold(f32::MIN, f32::max);
        let curve = TransferCurve::new(table);
        let y = curve.lookup(x);
        prop_assert!(y >= lo - 1e-6 && y <= hi + 1e-6);
    }

    /// Any filter in the graph stays finite for any cutoff and Q.
    #[test]
    fn graph_filter_stability(
        freq in 1.0f32..30000.0,
        q in 0.01f32..40.0,
        variant in 0usize..3,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let kind = [FilterKind::Lowpass, FilterKind::Highpass, FilterKind::Bandpass][variant];
        let mut graph = AudioGraph::new(48000.0);
        let f = graph.create_biquad(kind, freq, q);
        graph.connect(graph.source(), f.id()).unwrap();
        graph.connect(f.id(), graph.destination()).unwrap();
        let mut renderer = graph.compile().unwrap();
        let mut out = [0.0f32; 32];
        renderer.render(&input, &mut out);
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }
}
