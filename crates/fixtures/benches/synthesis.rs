use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elif_factory::prelude::*;
use elif_fixtures::models::{AbTestFactory, CommentFactory, SearchAlertFactory};
use elif_fixtures::registry;

fn typed_factories(c: &mut Criterion) {
    let mut group = c.benchmark_group("typed");

    group.bench_function("ab_test_completed_make", |b| {
        let mut rng = SeededRandom::new(1);
        let mut store = InMemoryStore::new();
        let factory = AbTestFactory::new().completed().two_variants().with("created_by", 1);
        b.iter(|| {
            let mut ctx = FactoryContext::new(&mut rng, &mut store);
            black_box(factory.make(&mut ctx).unwrap())
        });
    });

    group.bench_function("comment_create_with_relations", |b| {
        let mut rng = SeededRandom::new(2);
        let mut store = InMemoryStore::new();
        let factory = CommentFactory::new().with_mentions(["amy", "bo"]);
        b.iter(|| {
            let mut ctx = FactoryContext::new(&mut rng, &mut store);
            black_box(factory.create(&mut ctx).unwrap())
        });
    });

    group.bench_function("search_alert_create", |b| {
        let mut rng = SeededRandom::new(3);
        let mut store = InMemoryStore::new();
        let factory = SearchAlertFactory::new().high_volume();
        b.iter(|| {
            let mut ctx = FactoryContext::new(&mut rng, &mut store);
            black_box(factory.create(&mut ctx).unwrap())
        });
    });

    group.finish();
}

fn registry_synthesis(c: &mut Criterion) {
    let registry = registry();
    let overrides = [Override::new("variantCount").param("count", 5), Override::from("active")];

    c.bench_function("registry_ab_test_overrides", |b| {
        let mut rng = SeededRandom::new(4);
        let mut store = InMemoryStore::new();
        b.iter(|| {
            let mut ctx = FactoryContext::new(&mut rng, &mut store);
            black_box(
                registry
                    .synthesize("ABTest", &overrides, Attributes::new(), &mut ctx)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, typed_factories, registry_synthesis);
criterion_main!(benches);
