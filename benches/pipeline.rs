//! Pipeline Benchmarks
//!
//! Run with: cargo bench --bench pipeline
//!
//! Benchmarks follow a fixed taxonomy:
//! - Layer (seq_*, search_*)
//! - Shape (chain depth, source size)
//!
//! These measure the cost of the restartable-cursor design: every terminal
//! re-executes the full chain, so chain construction must stay cheap and the
//! per-item overhead flat.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use serde::Serialize;

use lazyseq::{IndexOptions, SearchIndex, Seq};

// ============================================================================
// Constants and Utilities
// ============================================================================

const SIZES: [usize; 3] = [100, 1_000, 10_000];

/// Simple LCG for deterministic pseudo-random data
fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    *state
}

fn pregenerate(count: usize) -> Vec<i64> {
    let mut state = 0xDEADBEEF_CAFEBABEu64;
    (0..count).map(|_| (lcg_next(&mut state) % 1000) as i64).collect()
}

#[derive(Serialize)]
struct BenchDoc {
    id: String,
    title: String,
    body: String,
}

fn pregenerate_docs(count: usize) -> Vec<BenchDoc> {
    let words = [
        "searchable", "content", "data", "benchmark", "value", "important", "quick", "index",
    ];
    let mut state = 0x5EED_5EEDu64;
    (0..count)
        .map(|i| {
            let a = words[(lcg_next(&mut state) % words.len() as u64) as usize];
            let b = words[(lcg_next(&mut state) % words.len() as u64) as usize];
            BenchDoc {
                id: format!("doc_{i}"),
                title: format!("{a} {b}"),
                body: format!("{b} entry number {i} with {a} text"),
            }
        })
        .collect()
}

// ============================================================================
// Sequence Benchmarks
// ============================================================================

/// Chain construction alone, no terminal
fn bench_seq_construction(c: &mut Criterion) {
    let data = pregenerate(1_000);
    c.bench_function("seq_construct/five_stage_chain", |b| {
        b.iter(|| {
            let data = data.clone();
            Seq::from(data)
                .filter(|n, _| n % 2 == 0)
                .map(|n, _| n * 3)
                .skip(10)
                .take(100)
                .unique()
        })
    });
}

/// Full evaluation of a representative chain across source sizes
fn bench_seq_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("seq_eval");
    for size in SIZES {
        let seq = Seq::from(pregenerate(size))
            .filter(|n, _| n % 2 == 0)
            .map(|n, _| n * 3);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("filter_map_to_array", size), &seq, |b, seq| {
            b.iter(|| seq.to_array().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("filter_map_count", size), &seq, |b, seq| {
            b.iter(|| seq.count())
        });
    }
    group.finish();
}

/// Re-running a terminal on the same pipeline (the restart cost)
fn bench_seq_restart(c: &mut Criterion) {
    let seq = Seq::from(pregenerate(1_000)).unique();
    c.bench_function("seq_restart/unique_first", |b| b.iter(|| seq.first().unwrap()));
}

/// Keyed collectors over a medium source
fn bench_seq_collectors(c: &mut Criterion) {
    let seq = Seq::from(pregenerate(1_000));
    let mut group = c.benchmark_group("seq_collect");
    group.bench_function("to_lookup", |b| b.iter(|| seq.to_lookup(|n| n % 16).unwrap()));
    group.bench_function("to_map_resolving", |b| {
        b.iter(|| seq.to_map_resolving(|n| n % 16, |n| n, |a, b| a + b).unwrap())
    });
    group.finish();
}

// ============================================================================
// Search Benchmarks
// ============================================================================

/// Index build cost across document counts
fn bench_search_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_build");
    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || pregenerate_docs(size),
                |docs| {
                    SearchIndex::new(
                        docs,
                        IndexOptions::new()
                            .fetch_id(|d: &BenchDoc| d.id.clone())
                            .ignore_properties(["id"]),
                    )
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

/// Ranked query cost against a built index
fn bench_search_query(c: &mut Criterion) {
    let index = SearchIndex::new(
        pregenerate_docs(1_000),
        IndexOptions::new()
            .fetch_id(|d: &BenchDoc| d.id.clone())
            .ignore_properties(["id"]),
    );
    let mut group = c.benchmark_group("search_query");
    group.bench_function("hot_term", |b| b.iter(|| index.search("benchmark")));
    group.bench_function("typo_term", |b| b.iter(|| index.search("benchmrak")));
    group.bench_function("id_lookup", |b| b.iter(|| index.search("doc_500")));
    group.finish();
}

criterion_group!(
    benches,
    bench_seq_construction,
    bench_seq_evaluation,
    bench_seq_restart,
    bench_seq_collectors,
    bench_search_build,
    bench_search_query,
);
criterion_main!(benches);
