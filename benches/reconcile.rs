//! Performance benchmarks for slug derivation and ancestor resolution.
//!
//! Run with: `cargo bench --bench reconcile`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use slug_reconciler::{DocId, InMemoryDocumentStore, PageDocument, Reconciler, SlugPath, slugify};

/// Build a linear parent chain of `depth` pages, leaf last.
fn build_chain(depth: usize) -> Arc<InMemoryDocumentStore> {
    let store = InMemoryDocumentStore::new();
    let mut slug = SlugPath::default();
    for i in 0..depth {
        slug = slug.child(format!("level-{i}"));
        let mut doc = PageDocument::new(DocId::new(format!("n{i}")), "page", format!("Level {i}"))
            .with_slug(slug.clone());
        if i > 0 {
            doc = doc.with_parent(DocId::new(format!("n{}", i - 1)));
        }
        store.upsert(doc);
    }
    Arc::new(store)
}

fn bench_slugify(c: &mut Criterion) {
    c.bench_function("slugify/ascii_title", |b| {
        b.iter(|| slugify(black_box("A Moderately Long Page Title (2024)!")))
    });
    c.bench_function("slugify/accented_title", |b| {
        b.iter(|| slugify(black_box("Présentation générale: déjà vu?")))
    });
}

fn bench_ancestor_resolution(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("resolve_ancestor_path");

    for depth in [4usize, 16, 64] {
        let store = build_chain(depth);
        let reconciler = Reconciler::with_defaults(store);
        let leaf_parent = DocId::new(format!("n{}", depth.saturating_sub(2)));

        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                rt.block_on(async {
                    reconciler
                        .resolve_ancestor_path(Some(black_box(&leaf_parent)))
                        .await
                        .unwrap()
                })
            })
        });
    }

    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("publish/leaf_of_deep_chain", |b| {
        let store = build_chain(16);
        let reconciler = Reconciler::with_defaults(store);
        let leaf = DocId::new("n15");

        b.iter(|| {
            rt.block_on(async {
                let outcome = reconciler.publish(black_box(&leaf)).await.unwrap();
                outcome.deferred.join_all().await
            })
        })
    });
}

criterion_group!(
    benches,
    bench_slugify,
    bench_ancestor_resolution,
    bench_publish
);
criterion_main!(benches);
