//! Benchmarks for inspection, cleaning and feature derivation.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::explicit_iter_loop,
    missing_docs
)]

use std::sync::Arc;

use arrow::{
    array::{Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use bonifica::{
    derive_all, find_duplicates, ArrowDataset, CleaningConfig, CleaningPolicy, FeatureConfig,
    QualityInspector,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn create_dataset(rows: usize) -> ArrowDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Age", DataType::Float64, true),
        Field::new("SibSp", DataType::Int64, false),
        Field::new("Parch", DataType::Int64, false),
        Field::new("Fare", DataType::Float64, false),
        Field::new("Cabin", DataType::Utf8, true),
        Field::new("Embarked", DataType::Utf8, true),
    ]));

    #[allow(clippy::cast_precision_loss)]
    let age: Vec<Option<f64>> = (0..rows)
        .map(|i| (i % 5 != 0).then(|| (i % 70) as f64 + 1.0))
        .collect();
    #[allow(clippy::cast_possible_wrap)]
    let sibsp: Vec<i64> = (0..rows).map(|i| (i % 4) as i64).collect();
    #[allow(clippy::cast_possible_wrap)]
    let parch: Vec<i64> = (0..rows).map(|i| (i % 3) as i64).collect();
    #[allow(clippy::cast_precision_loss)]
    let fare: Vec<f64> = (0..rows).map(|i| (i % 50) as f64 * 1.7 + 5.0).collect();
    let cabin: Vec<Option<String>> = (0..rows)
        .map(|i| (i % 4 == 3).then(|| format!("C{i}")))
        .collect();
    let embarked: Vec<Option<&str>> = (0..rows)
        .map(|i| match i % 11 {
            0 => None,
            1..=3 => Some("C"),
            _ => Some("S"),
        })
        .collect();

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Float64Array::from(age)),
            Arc::new(Int64Array::from(sibsp)),
            Arc::new(Int64Array::from(parch)),
            Arc::new(Float64Array::from(fare)),
            Arc::new(StringArray::from(cabin)),
            Arc::new(StringArray::from(embarked)),
        ],
    )
    .expect("Failed to create batch");

    ArrowDataset::from_batch(batch).expect("Failed to create dataset")
}

fn bench_inspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspect");
    let inspector = QualityInspector::new();

    for size in [1_000, 10_000, 50_000].iter() {
        let dataset = create_dataset(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| black_box(inspector.inspect(dataset)));
        });
    }

    group.finish();
}

fn bench_duplicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_duplicates");

    for size in [1_000, 10_000, 50_000].iter() {
        let dataset = create_dataset(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| black_box(find_duplicates(dataset)));
        });
    }

    group.finish();
}

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning_policy");
    let config = CleaningConfig::default();
    let dataset = create_dataset(10_000);
    group.throughput(Throughput::Elements(10_000));

    for policy in CleaningPolicy::all() {
        group.bench_with_input(
            BenchmarkId::from_parameter(policy.name()),
            &dataset,
            |b, dataset| {
                b.iter(|| black_box(policy.apply(dataset, &config).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_all");
    let config = FeatureConfig::default();

    for size in [1_000, 10_000].iter() {
        let dataset = create_dataset(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &dataset, |b, dataset| {
            b.iter(|| black_box(derive_all(dataset, &config).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_inspect,
    bench_duplicates,
    bench_policies,
    bench_features
);
criterion_main!(benches);
