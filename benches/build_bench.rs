//! Index construction time per strategy

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use vecsearch::{build_index, IndexConfig, IndexKind, VectorCollection};

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    let dim = 128;
    let size = 10_000;
    let mut vectors = VectorCollection::random(size, dim, 42);
    vectors.normalize();
    let vectors = Arc::new(vectors);

    for kind in [IndexKind::Tree, IndexKind::Hash] {
        let config = IndexConfig::new(kind, dim);
        group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
            b.iter(|| build_index(vectors.clone(), &config).unwrap());
        });
    }

    group.bench_function("normalize_10000_128d", |b| {
        let raw = VectorCollection::random(size, dim, 7);
        b.iter(|| {
            let mut v = raw.clone();
            v.normalize();
            v
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_build);
criterion_main!(benches);
