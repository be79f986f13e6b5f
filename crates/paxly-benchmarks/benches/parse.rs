//! Manifest and version parsing performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paxly_benchmarks::{criterion_config, manifest_yaml, version_strings};
use paxly_config::Manifest;
use paxly_core::types::{Constraint, Version};

fn bench_manifest_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_parsing");

    for dep_count in [10, 100, 500].iter() {
        let yaml = manifest_yaml(*dep_count);
        group.throughput(Throughput::Elements(*dep_count as u64));

        group.bench_with_input(BenchmarkId::new("dependencies", dep_count), &yaml, |b, yaml| {
            b.iter(|| black_box(Manifest::parse(yaml).unwrap()));
        });
    }

    group.finish();
}

fn bench_version_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_parsing");

    let versions = version_strings(1000);
    group.bench_function("versions", |b| {
        let mut index = 0;
        b.iter(|| {
            let raw = &versions[index % versions.len()];
            index += 1;
            black_box(Version::parse(raw))
        });
    });

    let constraints: Vec<String> = (0..1000).map(|i| format!("^{}.{}.{}", i % 4, i % 12, i % 7)).collect();
    group.bench_function("constraints", |b| {
        let mut index = 0;
        b.iter(|| {
            let raw = &constraints[index % constraints.len()];
            index += 1;
            black_box(Constraint::parse(raw))
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_manifest_parsing, bench_version_parsing
}
criterion_main!(benches);
