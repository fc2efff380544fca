//! Tests for the quality module.

#![allow(clippy::float_cmp)]

use std::sync::Arc;

use arrow::{
    array::{Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};

use super::*;
use crate::{dataset::ArrowDataset, value::Value};

fn passengers() -> ArrowDataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("PassengerId", DataType::Int64, false),
        Field::new("Age", DataType::Float64, true),
        Field::new("Embarked", DataType::Utf8, true),
        Field::new("Cabin", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6])),
            Arc::new(Float64Array::from(vec![
                Some(22.0),
                None,
                Some(26.0),
                Some(35.0),
                None,
                Some(f64::NAN),
            ])),
            Arc::new(StringArray::from(vec![
                Some("S"),
                Some("C"),
                Some("S"),
                None,
                Some("Q"),
                Some("S"),
            ])),
            Arc::new(StringArray::from(vec![
                None,
                Some("C85"),
                None,
                Some("C123"),
                None,
                None,
            ])),
        ],
    )
    .unwrap();
    ArrowDataset::from_batch(batch).unwrap()
}

fn with_duplicates() -> ArrowDataset {
    ArrowDataset::from_csv_str("Sex,Age\nmale,22\nfemale,\nmale,22\nfemale,\nmale,30\nmale,22\n")
        .unwrap()
}

// ========== inspect ==========

#[test]
fn test_missing_counts_and_percentages() {
    let report = inspect(&passengers());
    assert_eq!(report.row_count, 6);
    assert_eq!(report.column_count, 4);

    let age = report.column("Age").unwrap();
    assert_eq!(age.missing_count, 3);
    assert_eq!(age.missing_percentage, 50.0);

    let cabin = report.column("Cabin").unwrap();
    assert_eq!(cabin.missing_count, 4);
    assert!((cabin.missing_percentage - 66.666).abs() < 0.01);

    assert_eq!(report.total_missing(), 8);
    assert_eq!(report.total_missing(), passengers().total_missing());
}

#[test]
fn test_columns_keep_schema_order() {
    let report = inspect(&passengers());
    let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["PassengerId", "Age", "Embarked", "Cabin"]);
}

#[test]
fn test_columns_with_missing_sorted_desc() {
    let report = inspect(&passengers());
    let names: Vec<&str> = report
        .columns_with_missing()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Cabin", "Age", "Embarked"]);
}

#[test]
fn test_inferred_types() {
    let report = inspect(&passengers());
    assert_eq!(
        report.column("PassengerId").unwrap().inferred_type,
        InferredType::Integer
    );
    assert_eq!(report.column("Age").unwrap().inferred_type, InferredType::Float);
    assert_eq!(
        report.column("Embarked").unwrap().inferred_type,
        InferredType::Categorical
    );

    let strict = QualityInspector::with_config(QualityConfig::default().with_categorical_threshold(3));
    let report = strict.inspect(&passengers());
    // Three distinct ports is not fewer than three
    assert_eq!(
        report.column("Embarked").unwrap().inferred_type,
        InferredType::FreeText
    );
}

#[test]
fn test_unique_counts_and_samples() {
    let report = inspect(&passengers());
    let embarked = report.column("Embarked").unwrap();
    assert_eq!(embarked.unique_count, 3);
    assert_eq!(
        embarked.sample_values,
        vec![Value::from("S"), Value::from("C"), Value::from("S")]
    );

    let report = QualityInspector::with_config(QualityConfig::default().with_sample_size(1))
        .inspect(&passengers());
    assert_eq!(report.column("Cabin").unwrap().sample_values, vec![Value::from("C85")]);
}

#[test]
fn test_numeric_stats() {
    let report = inspect(&passengers());
    let stats = report.column("Age").unwrap().numeric_stats.clone().unwrap();
    assert_eq!(stats.min, 22.0);
    assert_eq!(stats.max, 35.0);
    assert!((stats.mean - 27.666_666).abs() < 1e-5);
    assert_eq!(stats.median, 26.0);
    assert_eq!(stats.q1, 24.0);
    assert_eq!(stats.q3, 30.5);
    assert_eq!(stats.iqr(), 6.5);

    assert!(report.column("Embarked").unwrap().numeric_stats.is_none());
    assert!(report.column("Embarked").unwrap().outlier_count.is_none());
}

#[test]
fn test_outliers_counted_not_removed() {
    let dataset = ArrowDataset::from_csv_str("Fare\n7\n8\n8\n9\n10\n500\n").unwrap();
    let report = inspect(&dataset);
    let fare = report.column("Fare").unwrap();
    assert_eq!(fare.outlier_count, Some(1));
    assert_eq!(report.row_count, 6);

    let lenient = QualityInspector::with_config(QualityConfig::default().with_iqr_factor(1000.0));
    assert_eq!(
        lenient.inspect(&dataset).column("Fare").unwrap().outlier_count,
        Some(0)
    );
}

#[test]
fn test_all_missing_numeric_column() {
    let schema = Arc::new(Schema::new(vec![Field::new("Age", DataType::Float64, true)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(Float64Array::from(vec![None, None]))]).unwrap();
    let report = inspect(&ArrowDataset::from_batch(batch).unwrap());
    let age = report.column("Age").unwrap();
    assert_eq!(age.missing_percentage, 100.0);
    assert!(age.numeric_stats.is_none());
    assert_eq!(age.outlier_count, Some(0));
}

#[test]
fn test_zero_rows() {
    let dataset = ArrowDataset::from_csv_str("Age,Embarked\n").unwrap();
    let report = inspect(&dataset);
    assert_eq!(report.row_count, 0);
    assert!(report
        .columns
        .iter()
        .all(|c| c.missing_count == 0 && c.missing_percentage == 0.0));
    assert!(!report.has_duplicates());
}

#[test]
fn test_multi_batch_dataset() {
    let batch = passengers().to_batch().unwrap();
    let dataset = ArrowDataset::new(vec![batch.slice(0, 3), batch.slice(3, 3)]).unwrap();
    let report = inspect(&dataset);
    assert_eq!(report.column("Age").unwrap().missing_count, 3);
    assert_eq!(report.row_count, 6);
}

// ========== duplicates ==========

#[test]
fn test_find_duplicates_first_occurrence_wins() {
    let dups = find_duplicates(&with_duplicates());
    assert_eq!(dups.count, 3);
    // Rows 2 and 5 repeat row 0; row 3 repeats row 1 (missing equals missing)
    assert_eq!(dups.indices, vec![2, 3, 5]);
}

#[test]
fn test_duplicates_across_batches() {
    let batch = with_duplicates().to_batch().unwrap();
    let dataset = ArrowDataset::new(vec![batch.slice(0, 2), batch.slice(2, 4)]).unwrap();
    assert_eq!(find_duplicates(&dataset).indices, vec![2, 3, 5]);
}

#[test]
fn test_no_duplicates() {
    let dups = find_duplicates(&passengers());
    assert_eq!(dups, DuplicateRows::default());

    let report = inspect(&with_duplicates());
    assert!(report.has_duplicates());
    assert_eq!(report.duplicate_count, 3);
}

#[test]
fn test_report_serializes() {
    let json = serde_json::to_value(inspect(&passengers())).unwrap();
    assert_eq!(json["row_count"], 6);
    assert_eq!(json["columns"][2]["inferred_type"], "categorical");
    assert_eq!(json["columns"][3]["sample_values"][0], "C85");
}

// ========== frequencies ==========

#[test]
fn test_frequencies_order() {
    let values = vec![
        Value::from("S"),
        Value::from("C"),
        Value::Missing,
        Value::from("C"),
        Value::from("Q"),
        Value::from("S"),
    ];
    let freq = frequencies(&values);
    assert_eq!(
        freq,
        vec![
            (Value::from("S"), 2),
            (Value::from("C"), 2),
            (Value::from("Q"), 1)
        ]
    );
}
