//! Criterion benchmarks for the audio graph host (`stompbox-core::graph`).
//!
//! - **Compile** - Kahn sort and renderer allocation
//! - **Render** - `render()` throughput at varying block sizes
//!
//! Run with: `cargo bench -p stompbox-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stompbox_core::FilterKind;
use stompbox_core::graph::AudioGraph;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

/// Linear chain of `stages` gain -> lowpass pairs plus a delay feedback loop.
fn build_graph(stages: usize) -> AudioGraph {
    let mut graph = AudioGraph::new(SAMPLE_RATE);
    let mut prev = graph.source();
    for _ in 0..stages {
        let g = graph.create_gain(0.9);
        let f = graph.create_biquad(FilterKind::Lowpass, 4000.0, 0.707);
        graph.connect(prev, g.id()).unwrap();
        graph.connect(g.id(), f.id()).unwrap();
        prev = f.id();
    }
    let delay = graph.create_delay(1.0);
    delay.delay_time.set_value(0.3);
    let fb = graph.create_gain(0.4);
    graph.connect(prev, delay.id()).unwrap();
    graph.connect(delay.id(), fb.id()).unwrap();
    graph.connect(fb.id(), delay.id()).unwrap();
    graph.connect(delay.id(), graph.destination()).unwrap();
    graph.connect(prev, graph.destination()).unwrap();
    graph
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/compile");
    for stages in [4, 16, 64] {
        let graph = build_graph(stages);
        group.bench_with_input(BenchmarkId::from_parameter(stages), &graph, |b, graph| {
            b.iter(|| black_box(graph.compile().unwrap()));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/render");
    let graph = build_graph(8);
    for &block in BLOCK_SIZES {
        let mut renderer = graph.compile().unwrap();
        let input: Vec<f32> = (0..block)
            .map(|i| libm::sinf(i as f32 * 0.05))
            .collect();
        let mut output = vec![0.0; block];
        group.bench_function(BenchmarkId::from_parameter(block), |b| {
            b.iter(|| {
                renderer.render(black_box(&input), &mut output);
                black_box(&output);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_render);
criterion_main!(benches);
