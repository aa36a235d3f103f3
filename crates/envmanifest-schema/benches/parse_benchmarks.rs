use criterion::{black_box, criterion_group, criterion_main, Criterion};
use envmanifest_schema::{parse_manifest_str, render_manifest, validate};

const FIXTURE: &str = include_str!("../tests/fixtures/environment.yml");

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_fixture", |b| {
        b.iter(|| parse_manifest_str(black_box(FIXTURE)).unwrap());
    });
}

fn bench_validate(c: &mut Criterion) {
    let env = parse_manifest_str(FIXTURE).unwrap();
    c.bench_function("validate_fixture", |b| {
        b.iter(|| validate(black_box(&env)));
    });
}

fn bench_render(c: &mut Criterion) {
    let env = parse_manifest_str(FIXTURE).unwrap();
    c.bench_function("render_fixture", |b| {
        b.iter(|| render_manifest(black_box(&env)));
    });
}

criterion_group!(benches, bench_parse, bench_validate, bench_render);
criterion_main!(benches);
