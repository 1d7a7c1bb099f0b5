//! Write path benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use palisade_model::{parse_object, DetailLevel, Object, ObjectType, WellKnownRegistry, WriteMode};
use serde_json::json;

/// Benchmark create payloads for groups with growing member lists.
fn bench_serialize_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_create");

    for count in [8usize, 64, 512] {
        let object = Object::create(ObjectType::Group, "bench-group");
        {
            let mut payload = object.group_mut().unwrap();
            let members = payload.members_mut().unwrap();
            for index in 0..count {
                members.add(format!("member-{index}"));
            }
        }
        group.bench_with_input(BenchmarkId::from_parameter(count), &object, |b, object| {
            b.iter(|| {
                let doc = object.borrow().serialize_for(WriteMode::Create);
                black_box(doc);
            });
        });
    }

    group.finish();
}

/// Benchmark update payloads carrying a one-member delta over a large
/// synced list.
fn bench_serialize_update_delta(c: &mut Criterion) {
    let wk = WellKnownRegistry::standard();
    let mut group = c.benchmark_group("serialize_update_delta");

    for count in [64usize, 512] {
        let members: Vec<String> = (0..count).map(|index| format!("member-{index}")).collect();
        let doc = json!({
            "uid": "bench-group",
            "type": "group",
            "name": "bench-group",
            "members": members,
        });
        let object = parse_object(&wk, DetailLevel::Full, &doc).unwrap();
        object
            .group_mut()
            .unwrap()
            .members_mut()
            .unwrap()
            .add("the-new-one");
        group.bench_with_input(BenchmarkId::from_parameter(count), &object, |b, object| {
            b.iter(|| {
                let doc = object.borrow().serialize_for(WriteMode::Update);
                black_box(doc);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize_create, bench_serialize_update_delta);
criterion_main!(benches);
