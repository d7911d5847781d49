use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use na_bson::{BinarySubtype, Document, Iter, ValidateOptions};

fn build_flat(fields: usize) -> Document {
    let mut doc = Document::new();
    for index in 0..fields {
        match index % 4 {
            0 => doc.append_int32(&index.to_string(), index as i32).unwrap(),
            1 => doc.append_utf8(&index.to_string(), "payload").unwrap(),
            2 => doc.append_double(&index.to_string(), index as f64).unwrap(),
            _ => doc.append_bool(&index.to_string(), index % 8 == 3).unwrap(),
        }
    }
    doc
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for fields in [4usize, 64, 1024] {
        let bytes = build_flat(fields).len() as u64;
        group.throughput(Throughput::Bytes(bytes));
        group.bench_function(format!("{fields}_fields"), |b| {
            b.iter(|| black_box(build_flat(black_box(fields))).len())
        });
    }

    group.bench_function("nested_3_levels", |b| {
        b.iter(|| {
            let mut doc = Document::new();
            let mut outer = doc.begin_document("a").unwrap();
            let mut middle = outer.begin_document("b").unwrap();
            let mut inner = middle.begin_array("c").unwrap();
            for index in 0..16 {
                inner.append_int64(&index.to_string(), index).unwrap();
            }
            inner.end();
            middle.end();
            outer.end();
            black_box(doc.len())
        })
    });

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let doc = build_flat(1024);
    let bytes = doc.as_bytes();

    let mut group = c.benchmark_group("iterate");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("1024_fields", |b| {
        b.iter(|| {
            Iter::new(black_box(bytes))
                .unwrap()
                .filter(|item| item.is_ok())
                .count()
        })
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let doc = build_flat(1024);
    let bytes = doc.as_bytes();
    let strict = ValidateOptions::new()
        .utf8(true)
        .dollar_keys(true)
        .dot_keys(true);

    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("structural", |b| {
        b.iter(|| na_bson::validate_document(black_box(bytes), ValidateOptions::new()).is_ok())
    });
    group.bench_function("strict", |b| {
        b.iter(|| na_bson::validate_document(black_box(bytes), black_box(strict)).is_ok())
    });

    group.finish();
}

fn bench_binary_payloads(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary");

    for size in [64usize, 4096, 65536] {
        let payload = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}_bytes"), |b| {
            b.iter(|| {
                let mut doc = Document::new();
                doc.append_binary("data", BinarySubtype::Generic, black_box(&payload))
                    .unwrap();
                black_box(doc.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_iterate,
    bench_validate,
    bench_binary_payloads
);
criterion_main!(benches);
