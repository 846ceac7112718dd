//! Encode and decode throughput for full and delta payloads.
//!
//! ```sh
//! cargo bench --package bitdelta-codec --bench encode_decode
//! ```

use std::hint::black_box;

use bitstream::{BitReader, BufferWriterFactory};
use codec::{decode_message, encode_delta, encode_snapshot, EntityManager, Field, Schema};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    id: u32,
    name: String,
    x: f32,
    y: f32,
    hp: u16,
    tags: Vec<u8>,
    trail: Vec<Point>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i16,
    y: i16,
}

fn sample_schema() -> Schema<Sample> {
    let point = Schema::builder()
        .field(Field::scalar("X", |p: &Point| &p.x, |p: &mut Point| &mut p.x))
        .field(Field::scalar("Y", |p: &Point| &p.y, |p: &mut Point| &mut p.y));
    Schema::builder()
        .field(Field::scalar("Id", |s: &Sample| &s.id, |s: &mut Sample| &mut s.id).key())
        .field(Field::scalar("Name", |s: &Sample| &s.name, |s: &mut Sample| &mut s.name))
        .field(Field::scalar("X", |s: &Sample| &s.x, |s: &mut Sample| &mut s.x))
        .field(Field::scalar("Y", |s: &Sample| &s.y, |s: &mut Sample| &mut s.y))
        .field(Field::scalar("Hp", |s: &Sample| &s.hp, |s: &mut Sample| &mut s.hp))
        .field(Field::list("Tags", |s: &Sample| &s.tags, |s: &mut Sample| &mut s.tags))
        .field(Field::object_list(
            "Trail",
            point,
            |s: &Sample| &s.trail,
            |s: &mut Sample| &mut s.trail,
        ))
        .build()
        .expect("bench schema")
}

fn sample(trail: usize) -> Sample {
    Sample {
        id: 7,
        name: "scout".into(),
        x: 10.5,
        y: -3.25,
        hp: 100,
        tags: vec![1, 2, 3, 4],
        trail: (0..trail)
            .map(|i| Point {
                x: i16::try_from(i).unwrap_or(i16::MAX),
                y: 0,
            })
            .collect(),
    }
}

fn moved(base: &Sample) -> Sample {
    let mut next = base.clone();
    next.x += 1.0;
    if let Some(last) = next.trail.last_mut() {
        last.y += 1;
    }
    next
}

fn bench_full(c: &mut Criterion) {
    let schema = sample_schema();
    let mut group = c.benchmark_group("full");
    for trail in [0_usize, 16, 128] {
        let entity = sample(trail);
        let bytes = schema.to_bytes(&entity).expect("encode");
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", trail), &entity, |b, entity| {
            b.iter(|| schema.to_bytes(black_box(entity)).expect("encode"));
        });
        group.bench_with_input(BenchmarkId::new("decode", trail), &bytes, |b, bytes| {
            b.iter(|| {
                let mut reader = BitReader::new(black_box(bytes)).expect("reader");
                schema.deserialize(&mut reader).expect("decode")
            });
        });
    }
    group.finish();
}

fn bench_delta(c: &mut Criterion) {
    let schema = sample_schema();
    let mut factory = BufferWriterFactory::default();
    let mut group = c.benchmark_group("delta");
    for trail in [0_usize, 16, 128] {
        let previous = sample(trail);
        let current = moved(&previous);
        let delta =
            encode_delta(&schema, 1, &current, &previous, &mut factory).expect("encode delta");
        group.throughput(Throughput::Bytes(delta.len() as u64));
        group.bench_function(BenchmarkId::new("encode", trail), |b| {
            b.iter(|| {
                encode_delta(
                    &schema,
                    1,
                    black_box(&current),
                    black_box(&previous),
                    &mut factory,
                )
                .expect("encode delta")
            });
        });
        group.bench_function(BenchmarkId::new("apply", trail), |b| {
            b.iter(|| {
                let mut target = previous.clone();
                decode_message(&schema, black_box(&delta), &mut target).expect("apply");
                target
            });
        });
    }
    group.finish();
}

fn bench_manager(c: &mut Criterion) {
    let schema = sample_schema();
    let base = sample(16);
    let next = moved(&base);
    let mut manager = EntityManager::new(schema.clone(), 2).expect("manager");
    manager.snapshot(&base, true).expect("checkpoint");
    let mut factory = BufferWriterFactory::default();

    c.bench_function("manager/difference", |b| {
        b.iter(|| manager.difference(black_box(&next), false).expect("difference"));
    });
    c.bench_function("manager/snapshot", |b| {
        b.iter(|| encode_snapshot(&schema, 2, black_box(&base), &mut factory).expect("snapshot"));
    });
}

criterion_group!(benches, bench_full, bench_delta, bench_manager);
criterion_main!(benches);
