use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hb_catalog::{FeatureCatalog, FeatureResolver};
use hb_domain::features::keys;
use hb_domain::{FeatureDefinition, FeaturePolicy, HostVersion, LicenseGrant};
use std::hint::black_box;
use std::sync::Arc;

fn catalog_with(extra: usize) -> Arc<FeatureCatalog> {
    let catalog = FeatureCatalog::with_defaults().unwrap();
    for i in 0..extra {
        let def = FeatureDefinition::new(format!("Synthetic{i}"), HostVersion::V2022)
            .depends_on(keys::MODERN_TRANSACTIONS);
        catalog.register(def).unwrap();
    }
    Arc::new(catalog)
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("compatibility_matrix");

    for size in [0usize, 100, 1_000] {
        let resolver = FeatureResolver::new(catalog_with(size), FeaturePolicy::default().with_license(LicenseGrant::All));
        group.bench_with_input(BenchmarkId::new("full", size), &resolver, |b, r| {
            b.iter(|| black_box(r.compatibility_matrix()));
        });
    }

    group.finish();
}

fn bench_is_enabled(c: &mut Criterion) {
    let resolver = FeatureResolver::new(catalog_with(0), FeaturePolicy::default());
    c.bench_function("is_enabled", |b| {
        b.iter(|| black_box(resolver.is_enabled(black_box(keys::NESTED_TRANSACTIONS), HostVersion::V2024)));
    });
}

criterion_group!(benches, bench_matrix, bench_is_enabled);
criterion_main!(benches);
