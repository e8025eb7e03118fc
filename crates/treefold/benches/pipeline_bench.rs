//! Criterion benchmarks for the full crease-pattern pipeline.
//! Results land under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use treefold::prelude::*;
use treefold::samples;

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("crease_pattern");
    for name in ["bone", "paper", "ten-star", "deep-merge"] {
        let design = match samples::by_name(name) {
            Ok(d) => d,
            Err(e) => panic!("sample {name}: {e}"),
        };
        group.bench_with_input(BenchmarkId::new("full", name), &design, |b, design| {
            b.iter(|| design.crease_pattern().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("ordering", name), &design, |b, design| {
            b.iter_batched(
                || {
                    let d = design.tree.distances();
                    let mut packing = design.packing.clone();
                    let mut g = clean_packing(&mut packing, &d).unwrap();
                    build_faces(&mut g).unwrap();
                    let depth = design.tree.dangle(&design.root_id().unwrap());
                    generate_molecules(&mut g, &d, packing.scale_factor, &depth).unwrap();
                    (g, depth)
                },
                |(mut g, depth)| order_facets(&mut g, &depth).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
