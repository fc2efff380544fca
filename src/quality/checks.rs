//! Column profiling and duplicate detection.

use std::collections::{hash_map::Entry, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::{
    config::QualityConfig,
    dataset::{ArrowDataset, Dataset},
    stats,
    transform::{is_integer_type, is_numeric_type, row_key},
    value::Value,
};

/// Inferred kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    /// Integer column.
    Integer,
    /// Floating point column.
    Float,
    /// Text column with few distinct values.
    Categorical,
    /// Text column with many distinct values.
    FreeText,
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Categorical => "categorical",
            Self::FreeText => "free_text",
        };
        f.write_str(name)
    }
}

/// Quality statistics for a single column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnQuality {
    /// Column name
    pub name: String,
    /// Missing cell count
    pub missing_count: usize,
    /// Missing percentage (0-100), 0 for an empty dataset
    pub missing_percentage: f64,
    /// Inferred column kind
    pub inferred_type: InferredType,
    /// Number of distinct non-missing values
    pub unique_count: usize,
    /// First non-missing values in row order
    pub sample_values: Vec<Value>,
    /// Basic stats for numeric columns with at least one value
    pub numeric_stats: Option<NumericStats>,
    /// Values outside the IQR fence (numeric columns only)
    pub outlier_count: Option<usize>,
}

impl ColumnQuality {
    /// Check if the column has any missing cell
    pub fn has_missing(&self) -> bool {
        self.missing_count > 0
    }

    /// Check if column is constant (single distinct value)
    pub fn is_constant(&self) -> bool {
        self.unique_count == 1
    }
}

/// Basic statistics for numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// 25th percentile (Q1)
    pub q1: f64,
    /// 50th percentile (median)
    pub median: f64,
    /// 75th percentile (Q3)
    pub q3: f64,
}

impl NumericStats {
    /// Computes the stats of non-missing values, `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = stats::mean(values)?;
        let sorted = stats::sorted(values);
        Some(Self {
            min: *sorted.first()?,
            max: *sorted.last()?,
            mean,
            std_dev: stats::std_dev(values, mean),
            q1: stats::quantile(&sorted, 0.25)?,
            median: stats::quantile(&sorted, 0.5)?,
            q3: stats::quantile(&sorted, 0.75)?,
        })
    }

    /// Calculate IQR (Interquartile Range)
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Duplicate rows of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateRows {
    /// Number of duplicate rows
    pub count: usize,
    /// Row indices of the repeats, ascending. First occurrences are not
    /// listed.
    pub indices: Vec<usize>,
}

/// Overall data quality report
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    /// Total row count
    pub row_count: usize,
    /// Total column count
    pub column_count: usize,
    /// Per-column statistics in schema order
    pub columns: Vec<ColumnQuality>,
    /// Number of duplicate rows
    pub duplicate_count: usize,
    /// Indices of duplicate rows
    pub duplicate_indices: Vec<usize>,
}

impl QualityReport {
    /// Sum of missing cells over all columns
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }

    /// Statistics of one column
    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns with at least one missing cell, most missing first
    pub fn columns_with_missing(&self) -> Vec<&ColumnQuality> {
        let mut cols: Vec<&ColumnQuality> =
            self.columns.iter().filter(|c| c.has_missing()).collect();
        cols.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
        cols
    }

    /// Check if any duplicate rows were found
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_count > 0
    }
}

/// Data quality inspector
#[derive(Debug, Clone, Default)]
pub struct QualityInspector {
    config: QualityConfig,
}

impl QualityInspector {
    /// Create an inspector with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inspector with the given settings
    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Profile every column and find duplicate rows.
    ///
    /// Never fails: a zero-row dataset reports zero missing values and no
    /// duplicates.
    pub fn inspect(&self, dataset: &ArrowDataset) -> QualityReport {
        let schema = dataset.schema();
        let row_count = dataset.len();

        let columns: Vec<ColumnQuality> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let values: Vec<Value> = dataset
                    .batches()
                    .iter()
                    .flat_map(|batch| Value::column(batch.column(idx).as_ref()))
                    .collect();
                let dtype = field.data_type();
                let kind = if is_integer_type(dtype) {
                    ColumnKind::Integer
                } else if is_numeric_type(dtype) {
                    ColumnKind::Float
                } else {
                    ColumnKind::Text
                };
                self.analyze_column(field.name(), kind, &values)
            })
            .collect();

        let duplicates = find_duplicates(dataset);

        debug!(
            rows = row_count,
            columns = columns.len(),
            duplicates = duplicates.count,
            "inspected dataset"
        );

        QualityReport {
            row_count,
            column_count: columns.len(),
            columns,
            duplicate_count: duplicates.count,
            duplicate_indices: duplicates.indices,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn analyze_column(
        &self,
        name: &str,
        kind: ColumnKind,
        values: &[Value],
    ) -> ColumnQuality {
        let total = values.len();
        let present: Vec<&Value> = values.iter().filter(|v| !v.is_missing()).collect();
        let missing_count = total - present.len();
        let missing_percentage = if total > 0 {
            missing_count as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let unique_count = present.iter().copied().collect::<HashSet<_>>().len();
        let sample_values = present
            .iter()
            .take(self.config.sample_size)
            .map(|v| (*v).clone())
            .collect();

        let inferred_type = match kind {
            ColumnKind::Integer => InferredType::Integer,
            ColumnKind::Float => InferredType::Float,
            ColumnKind::Text if unique_count < self.config.categorical_threshold => {
                InferredType::Categorical
            }
            ColumnKind::Text => InferredType::FreeText,
        };

        let (numeric_stats, outlier_count) = match kind {
            ColumnKind::Text => (None, None),
            ColumnKind::Integer | ColumnKind::Float => {
                let numbers: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
                (
                    NumericStats::from_values(&numbers),
                    Some(self.count_outliers(&numbers)),
                )
            }
        };

        ColumnQuality {
            name: name.to_string(),
            missing_count,
            missing_percentage,
            inferred_type,
            unique_count,
            sample_values,
            numeric_stats,
            outlier_count,
        }
    }

    /// Counts values outside `[lo - f*IQR, hi + f*IQR]` where `lo` and `hi`
    /// are the configured quantiles. Outliers are counted, never removed.
    pub(crate) fn count_outliers(&self, values: &[f64]) -> usize {
        let sorted = stats::sorted(values);
        let (Some(lo), Some(hi)) = (
            stats::quantile(&sorted, self.config.lower_quantile),
            stats::quantile(&sorted, self.config.upper_quantile),
        ) else {
            return 0;
        };

        let iqr = hi - lo;
        let lower = lo - self.config.iqr_factor * iqr;
        let upper = hi + self.config.iqr_factor * iqr;
        values.iter().filter(|&&v| v < lower || v > upper).count()
    }
}

/// Physical column kind, decided by the Arrow type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// Finds rows equal (missing equals missing) to an earlier row.
pub fn find_duplicates(dataset: &ArrowDataset) -> DuplicateRows {
    let all_columns: Vec<usize> = (0..dataset.schema().fields().len()).collect();
    let mut seen: HashSet<Vec<Value>> = HashSet::new();
    let mut indices = Vec::new();
    let mut offset = 0;

    for batch in dataset.batches() {
        for row in 0..batch.num_rows() {
            if !seen.insert(row_key(batch, row, &all_columns)) {
                indices.push(offset + row);
            }
        }
        offset += batch.num_rows();
    }

    DuplicateRows {
        count: indices.len(),
        indices,
    }
}

/// Profiles `dataset` with default settings.
pub fn inspect(dataset: &ArrowDataset) -> QualityReport {
    QualityInspector::new().inspect(dataset)
}

/// Distinct non-missing values of a column with their frequencies, most
/// frequent first, ties in order of first appearance.
pub(crate) fn frequencies(values: &[Value]) -> Vec<(Value, usize)> {
    let mut order: Vec<(Value, usize)> = Vec::new();
    let mut position: HashMap<Value, usize> = HashMap::new();

    for value in values.iter().filter(|v| !v.is_missing()) {
        match position.entry(value.clone()) {
            Entry::Occupied(e) => order[*e.get()].1 += 1,
            Entry::Vacant(e) => {
                e.insert(order.len());
                order.push((value.clone(), 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}
