//! Benchmarks for pattern search and literal search over an in-memory index

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdt_query::core::{Limit, LiteralQuery, Page, TriplePattern};
use hdt_query::index::{IndexHandle, MemoryIndex};
use hdt_query::query::{search_literals, search_triples, QueryContext};

fn build_index(subjects: usize) -> MemoryIndex {
    let mut builder = MemoryIndex::builder();
    for i in 0..subjects {
        let subject = format!("http://example.org/s{}", i);
        builder
            .add(&subject, "http://example.org/knows", &format!("http://example.org/s{}", (i + 1) % subjects))
            .add(&subject, "http://example.org/group", &format!("http://example.org/g{}", i % 50))
            .add(&subject, "http://example.org/name", &format!("\"Person {}\"@en", i))
            .add(
                &subject,
                "http://example.org/age",
                &format!("\"{}\"^^<http://www.w3.org/2001/XMLSchema#integer>", i % 90),
            );
    }
    builder.build()
}

fn pattern_search_benchmark(c: &mut Criterion) {
    let handle = IndexHandle::new(Arc::new(build_index(10_000)));
    let ctx = QueryContext::acquire(&handle).unwrap();

    let patterns = [
        ("subject", TriplePattern::new("http://example.org/s42", "", "")),
        ("predicate", TriplePattern::new("", "http://example.org/group", "")),
        ("object", TriplePattern::new("", "", "http://example.org/g7")),
        ("any", TriplePattern::any()),
    ];

    let mut group = c.benchmark_group("search_triples");
    for (name, pattern) in &patterns {
        group.bench_with_input(BenchmarkId::new(*name, "first 100"), pattern, |b, pattern| {
            b.iter(|| black_box(search_triples(&ctx, pattern, Page::new(0, Limit::At(100))).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new(*name, "offset 5000"), pattern, |b, pattern| {
            b.iter(|| black_box(search_triples(&ctx, pattern, Page::new(5000, Limit::At(100))).unwrap()));
        });
    }
    group.finish();
}

fn literal_search_benchmark(c: &mut Criterion) {
    let handle = IndexHandle::new(Arc::new(build_index(10_000)));
    let ctx = QueryContext::acquire(&handle).unwrap();

    c.bench_function("search_literals", |b| {
        let query = LiteralQuery::new("Person 12", Page::new(0, Limit::At(20)));
        b.iter(|| black_box(search_literals(&ctx, &query).unwrap()));
    });
}

criterion_group!(benches, pattern_search_benchmark, literal_search_benchmark);
criterion_main!(benches);
