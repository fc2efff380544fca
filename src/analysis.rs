//! Dataset summaries and grouped target rates.
//!
//! These are the figures a dashboard shows next to the quality report:
//! overall shape, how many records are positive for a binary target, and
//! how that rate varies across the values of another column.

use std::collections::{hash_map::Entry, HashMap};

use serde::Serialize;

use crate::{
    config::AnalysisConfig,
    dataset::ArrowDataset,
    error::{Error, Result},
    quality::{find_duplicates, frequencies},
    stats,
    transform::is_numeric_type,
    value::Value,
};

/// Headline figures of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// Row count
    pub rows: usize,
    /// Column count
    pub columns: usize,
    /// Missing cells over the whole table
    pub total_missing: usize,
    /// Rows repeating an earlier row
    pub duplicate_rows: usize,
    /// Target statistics, when a target column is configured
    pub target: Option<TargetSummary>,
    /// Means of the configured numeric columns present in the dataset
    pub means: Vec<ColumnMean>,
}

/// Positive count and rate of a binary target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    /// Target column name
    pub column: String,
    /// Records with a non-missing target
    pub count: usize,
    /// Records whose target is 1
    pub positives: usize,
    /// `positives / count * 100`, 0 when `count` is 0
    pub rate: f64,
}

/// Mean of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMean {
    /// Column name
    pub column: String,
    /// Mean of the non-missing values, `None` if all are missing
    pub mean: Option<f64>,
}

/// Target statistics for one value of the grouping column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    /// Value of the grouping column
    pub group: Value,
    /// Records in the group with a non-missing target
    pub count: usize,
    /// Records in the group whose target is 1
    pub positives: usize,
    /// `positives / count * 100`, 0 when `count` is 0
    pub rate: f64,
}

/// Frequency of one distinct value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    /// The value
    pub value: Value,
    /// Number of records holding it
    pub count: usize,
}

#[allow(clippy::cast_precision_loss)]
fn rate(positives: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        positives as f64 / count as f64 * 100.0
    }
}

#[allow(clippy::float_cmp)]
fn is_positive(value: &Value) -> bool {
    value.as_f64() == Some(1.0)
}

fn numeric_values(dataset: &ArrowDataset, column: &str) -> Result<Vec<Value>> {
    let array = dataset.column(column)?;
    if !is_numeric_type(array.data_type()) {
        return Err(Error::invalid_operation(format!(
            "target column '{column}' is not numeric ({})",
            array.data_type()
        )));
    }
    dataset.values(column)
}

/// Summarizes `dataset`.
///
/// Mean columns that are absent or not numeric are skipped.
///
/// # Errors
///
/// Returns `SchemaMismatch` if the target column is absent and
/// `InvalidOperation` if it is not numeric.
pub fn summarize(dataset: &ArrowDataset, config: &AnalysisConfig) -> Result<DatasetSummary> {
    let target = match &config.target_column {
        Some(column) => {
            let values = numeric_values(dataset, column)?;
            let present: Vec<&Value> = values.iter().filter(|v| !v.is_missing()).collect();
            let positives = present.iter().filter(|v| is_positive(v)).count();
            Some(TargetSummary {
                column: column.clone(),
                count: present.len(),
                positives,
                rate: rate(positives, present.len()),
            })
        }
        None => None,
    };

    let means = config
        .mean_columns
        .iter()
        .filter_map(|column| {
            let array = dataset.column(column).ok()?;
            if !is_numeric_type(array.data_type()) {
                return None;
            }
            let numbers: Vec<f64> = dataset
                .values(column)
                .ok()?
                .iter()
                .filter_map(Value::as_f64)
                .collect();
            Some(ColumnMean {
                column: column.clone(),
                mean: stats::mean(&numbers),
            })
        })
        .collect();

    let (rows, columns) = dataset.shape();
    Ok(DatasetSummary {
        rows,
        columns,
        total_missing: dataset.total_missing(),
        duplicate_rows: find_duplicates(dataset).count,
        target,
        means,
    })
}

/// Target rate per distinct value of `by`, in order of first appearance.
///
/// Groups are not sorted by key: a `Pclass` column starting with 3 lists
/// class 3 first. Callers wanting key order can sort the result on
/// `group`. Records with a missing `by` value are skipped.
///
/// # Errors
///
/// Returns `SchemaMismatch` if either column is absent and
/// `InvalidOperation` if `target` is not numeric.
pub fn group_stats(dataset: &ArrowDataset, by: &str, target: &str) -> Result<Vec<GroupStats>> {
    let groups = dataset.values(by)?;
    let targets = numeric_values(dataset, target)?;

    let mut order: Vec<GroupStats> = Vec::new();
    let mut position: HashMap<Value, usize> = HashMap::new();

    for (group, outcome) in groups.into_iter().zip(&targets) {
        if group.is_missing() {
            continue;
        }
        let idx = match position.entry(group.clone()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                order.push(GroupStats {
                    group,
                    count: 0,
                    positives: 0,
                    rate: 0.0,
                });
                *e.insert(order.len() - 1)
            }
        };
        if !outcome.is_missing() {
            order[idx].count += 1;
            if is_positive(outcome) {
                order[idx].positives += 1;
            }
        }
    }

    for stats in &mut order {
        stats.rate = rate(stats.positives, stats.count);
    }
    Ok(order)
}

/// Distinct non-missing values of `column`, most frequent first, ties in
/// order of first appearance.
///
/// # Errors
///
/// Returns `SchemaMismatch` if the column is absent.
pub fn value_counts(dataset: &ArrowDataset, column: &str) -> Result<Vec<ValueCount>> {
    let values = dataset.values(column)?;
    Ok(frequencies(&values)
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect())
}
