//! Benchmarks for the CPU-side frame work: the pairwise link scan and the
//! displacement pass.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use constel::{
    displaced_position, FieldConfig, LinkConfig, ParticleField, ProximityLinker, Vec2, Vec3,
};

fn positions(seed: u64, n: usize) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-75.0..75.0),
                rng.gen_range(-75.0..75.0),
                rng.gen_range(-75.0..75.0),
            )
        })
        .collect()
}

fn bench_link_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("link_scan");
    let buffer = positions(1, 2000);

    for scan_limit in [50usize, 100, 200, 400] {
        let mut linker = ProximityLinker::new(LinkConfig {
            scan_limit,
            threshold: 15.0,
            max_segments: 100,
        })
        .unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(scan_limit),
            &scan_limit,
            |b, _| b.iter(|| black_box(linker.compute(black_box(&buffer)).len())),
        );
    }

    group.finish();
}

fn bench_displacement(c: &mut Criterion) {
    let mut group = c.benchmark_group("displacement");

    group.bench_function("single_particle", |b| {
        let rest = Vec3::new(12.0, -30.0, 44.0);
        b.iter(|| black_box(displaced_position(black_box(rest), 1.25, Vec2::new(0.3, -0.1))))
    });

    group.bench_function("field_2000", |b| {
        let field = ParticleField::new(&FieldConfig {
            seed: Some(2),
            ..FieldConfig::default()
        })
        .unwrap();
        let mut out = Vec::with_capacity(field.len());

        b.iter(|| {
            field.displace_into(black_box(1.25), &mut out);
            black_box(out.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_link_scan, bench_displacement);
criterion_main!(benches);
