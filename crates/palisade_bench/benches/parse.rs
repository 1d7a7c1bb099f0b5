//! Parse path benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use palisade_bench::{forward_reference_rows, listing_rows, nested_group_doc};
use palisade_model::{parse_object, parse_objects, DetailLevel, WellKnownRegistry};
use serde_json::Value;

/// Benchmark flat listings at several sizes.
fn bench_parse_listing(c: &mut Criterion) {
    let wk = WellKnownRegistry::standard();
    let mut group = c.benchmark_group("parse_listing");

    for count in [16usize, 128, 1024] {
        let rows = listing_rows(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| {
                let handles =
                    parse_objects(&wk, DetailLevel::Standard, black_box(rows)).unwrap();
                black_box(handles);
            });
        });
    }

    group.finish();
}

/// Benchmark deeply nested group documents.
fn bench_parse_nested(c: &mut Criterion) {
    let wk = WellKnownRegistry::standard();
    let mut group = c.benchmark_group("parse_nested");

    for (depth, width) in [(3usize, 4usize), (5, 3), (8, 2)] {
        let doc = nested_group_doc(depth, width);
        let label = format!("depth_{depth}_width_{width}");
        group.bench_with_input(BenchmarkId::from_parameter(label), &doc, |b, doc| {
            b.iter(|| {
                let handle = parse_object(&wk, DetailLevel::Full, black_box(doc)).unwrap();
                black_box(handle);
            });
        });
    }

    group.finish();
}

/// Benchmark forward-reference resolution: every group row mentions every
/// host by uid before the host documents appear.
fn bench_resolution(c: &mut Criterion) {
    let wk = WellKnownRegistry::standard();
    let mut group = c.benchmark_group("resolve_forward_references");

    for count in [8usize, 32, 64] {
        let rows: Vec<Value> = forward_reference_rows(count);
        group.throughput(Throughput::Elements((count * count) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &rows, |b, rows| {
            b.iter(|| {
                let handles = parse_objects(&wk, DetailLevel::Full, black_box(rows)).unwrap();
                black_box(handles);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_listing,
    bench_parse_nested,
    bench_resolution
);
criterion_main!(benches);
