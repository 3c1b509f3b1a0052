//! Criterion benchmarks for rust_row_metadata

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_row_metadata::prelude::*;

fn meta(value_type: LogicalType) -> ValueMeta {
    ValueMeta::with_config("bench", value_type, ConversionConfig::new())
}

// ============================================================================
// Getter Benchmarks
// ============================================================================

fn bench_getters(c: &mut Criterion) {
    let mut group = c.benchmark_group("getters");
    group.throughput(Throughput::Elements(1));

    let text = meta(LogicalType::String);
    let integer = meta(LogicalType::Integer);
    let number = meta(LogicalType::Number);
    let date = meta(LogicalType::Date);
    let instant = Value::Date(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap());

    group.bench_function("string_to_integer", |b| {
        let v = Value::from("123456");
        b.iter(|| black_box(text.get_integer(black_box(&v)).unwrap()));
    });

    group.bench_function("string_to_number", |b| {
        let v = Value::from("1234.5678");
        b.iter(|| black_box(text.get_number(black_box(&v)).unwrap()));
    });

    group.bench_function("integer_to_string", |b| {
        let v = Value::Integer(123456);
        b.iter(|| black_box(integer.get_string(black_box(&v)).unwrap()));
    });

    group.bench_function("number_to_string", |b| {
        let v = Value::Number(1234.5678);
        b.iter(|| black_box(number.get_string(black_box(&v)).unwrap()));
    });

    group.bench_function("date_to_string", |b| {
        b.iter(|| black_box(date.get_string(black_box(&instant)).unwrap()));
    });

    group.bench_function("string_to_date", |b| {
        let v = Value::from("2024/03/01 10:15:30.000");
        b.iter(|| black_box(text.get_date(black_box(&v)).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Storage Benchmarks
// ============================================================================

fn bench_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage");

    let mapper = TypeMapper::new(DatabaseVendor::Generic)
        .with_options(MapperOptions::new().lazy_conversion(true));
    let lazy = mapper.map_column(&ColumnMetadata::new("s", sql_types::VARCHAR));
    let raw = Value::Binary(b"lazy conversion".to_vec());

    group.bench_function("binary_string_decode", |b| {
        b.iter(|| black_box(lazy.convert_to_normal_storage_type(black_box(&raw)).unwrap()));
    });

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("dictionary_encode", size), size, |b, &size| {
            let values: Vec<Value> = (0..size).map(|i| Value::from(format!("v{}", i % 50))).collect();
            b.iter(|| {
                let mut m = meta(LogicalType::String);
                m.set_storage_type(StorageType::Indexed);
                for v in &values {
                    black_box(m.encode_storage(v).unwrap());
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Codec Benchmarks
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let mut m = meta(LogicalType::Number);
    m.set_length_and_precision(12, 4);
    m.set_conversion_mask(Some("#,##0.0000".to_string()));

    group.bench_function("write_meta", |b| {
        b.iter(|| black_box(m.to_bytes().unwrap()));
    });

    let bytes = m.to_bytes().unwrap();
    group.bench_function("read_meta", |b| {
        b.iter(|| black_box(ValueMeta::from_bytes(black_box(&bytes)).unwrap()));
    });

    for size in [10, 100, 1000].iter() {
        let values: Vec<Value> = (0..*size).map(|i| Value::Number(i as f64 * 1.5)).collect();
        group.bench_with_input(BenchmarkId::new("write_data", size), &values, |b, values| {
            b.iter(|| {
                let mut out = Vec::with_capacity(values.len() * 9);
                for v in values {
                    m.write_data(&mut out, v).unwrap();
                }
                black_box(out)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Comparison Benchmarks
// ============================================================================

fn bench_comparisons(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparisons");

    let plain = meta(LogicalType::String);
    let mut folded = meta(LogicalType::String);
    folded.set_case_insensitive(true);
    let mut collated = meta(LogicalType::String);
    collated.set_collator_disabled(false);
    collated.set_collator_strength(rust_row_metadata::conversion::collation::SECONDARY);

    let a = Value::from("Müller");
    let b_value = Value::from("mueller");

    group.bench_function("string_plain", |b| {
        b.iter(|| black_box(plain.compare(black_box(&a), black_box(&b_value)).unwrap()));
    });

    group.bench_function("string_case_insensitive", |b| {
        b.iter(|| black_box(folded.compare(black_box(&a), black_box(&b_value)).unwrap()));
    });

    group.bench_function("string_collator", |b| {
        b.iter(|| black_box(collated.compare(black_box(&a), black_box(&b_value)).unwrap()));
    });

    group.bench_function("hash_string", |b| {
        b.iter(|| black_box(collated.hash_code(black_box(&a)).unwrap()));
    });

    let integer = meta(LogicalType::Integer);
    let number = meta(LogicalType::Number);
    group.bench_function("integer_with_number", |b| {
        let (x, y) = (Value::Integer(42), Value::Number(41.5));
        b.iter(|| black_box(integer.compare_with(&x, &number, &y).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_getters,
    bench_storage,
    bench_codec,
    bench_comparisons
);

criterion_main!(benches);
