use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use merbox::samples::SAMPLES;
use merbox::svg::{normalize, parse_svg};
use merbox::{EditorState, Theme, decode, encode_state};

const FLOWCHART_SVG: &str = include_str!("../../../fixtures/svg/flowchart.svg");

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    for (name, code) in SAMPLES.iter().take(4) {
        let state = EditorState::new(*code, Theme::Forest);
        let token = encode_state(&state);
        group.bench_function(format!("encode/{name}"), |b| {
            b.iter(|| encode_state(&state));
        });
        group.bench_function(format!("decode/{name}"), |b| {
            b.iter(|| decode(&token).unwrap());
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let live = parse_svg(FLOWCHART_SVG).unwrap();

    let mut group = c.benchmark_group("normalize");
    group.bench_function("parse", |b| {
        b.iter(|| parse_svg(FLOWCHART_SVG).unwrap());
    });
    group.bench_function("flowchart", |b| {
        b.iter_batched(
            || &live,
            |live| normalize(live).unwrap(),
            BatchSize::SmallInput,
        );
    });
    group.bench_function("flowchart_to_text", |b| {
        b.iter(|| merbox::export::export_svg(FLOWCHART_SVG).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_codec, bench_normalize);
criterion_main!(benches);
