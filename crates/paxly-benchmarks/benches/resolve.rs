//! Dependency resolution performance benchmarks
//!
//! Resolves wide and deep synthetic graphs against an in-memory plugin, and
//! measures version selection over long version listings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paxly_benchmarks::{criterion_config, deep_scenario, version_strings, wide_scenario, Scenario};
use paxly_core::types::Constraint;
use paxly_resolver::{Resolver, VersionSelector};
use tokio::runtime::Runtime;

fn resolve(rt: &Runtime, scenario: &Scenario) -> usize {
    let resolver = Resolver::new(&scenario.registry);
    let resolution = rt
        .block_on(resolver.resolve_dependencies(&scenario.manifest, "development"))
        .unwrap();
    resolution.len()
}

/// Many roots sharing the same leaves
fn bench_wide_graphs(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("resolve_wide");

    for width in [10, 100, 500].iter() {
        let scenario = wide_scenario(*width, 20);
        group.throughput(Throughput::Elements(scenario.package_count as u64));

        group.bench_with_input(BenchmarkId::new("roots", width), &scenario, |b, scenario| {
            b.iter(|| {
                let resolved = resolve(&rt, scenario);
                assert_eq!(resolved, scenario.package_count);
                black_box(resolved)
            });
        });
    }

    group.finish();
}

/// One long chain, exercising recursion depth and cycle tracking
fn bench_deep_graphs(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("resolve_deep");

    for depth in [10, 100, 500].iter() {
        let scenario = deep_scenario(*depth);
        group.throughput(Throughput::Elements(*depth as u64));

        group.bench_with_input(BenchmarkId::new("depth", depth), &scenario, |b, scenario| {
            b.iter(|| black_box(resolve(&rt, scenario)));
        });
    }

    group.finish();
}

fn bench_version_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_selection");
    let constraint = Constraint::parse("^3.4").unwrap();

    for version_count in [10, 100, 1000].iter() {
        let published = version_strings(*version_count);
        group.throughput(Throughput::Elements(*version_count as u64));

        group.bench_with_input(
            BenchmarkId::new("versions", version_count),
            &published,
            |b, published| {
                b.iter(|| {
                    let selector = VersionSelector::from_published(published);
                    black_box(selector.select_latest(&constraint).map(|c| c.raw.clone()))
                });
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_wide_graphs, bench_deep_graphs, bench_version_selection
}
criterion_main!(benches);
