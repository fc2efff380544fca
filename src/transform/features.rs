//! Derived feature columns.
//!
//! Each transform appends (or replaces) exactly one column and leaves every
//! other column and every row untouched.

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray},
    datatypes::DataType,
};
use tracing::debug;

use super::{column_index, is_integer_type, is_numeric_type, with_column, Chain, Transform};
use crate::{
    config::FeatureConfig,
    dataset::ArrowDataset,
    error::{Error, Result},
    stats,
    value::Value,
};

fn numeric_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let array = batch.column(column_index(&batch.schema(), name)?);
    if !is_numeric_type(array.data_type()) {
        return Err(Error::invalid_operation(format!(
            "column '{name}' is not numeric ({})",
            array.data_type()
        )));
    }
    Ok(array)
}

/// Appends `siblings + parents + 1` as a family size column.
///
/// A missing operand gives a missing size. The output is Int64 when both
/// operands are integer columns, Float64 otherwise. An integer sum that
/// does not fit in an i64 is an `InvalidOperation`.
///
/// # Example
///
/// ```
/// use bonifica::FamilySize;
///
/// let size = FamilySize::new().with_output("Family");
/// assert_eq!(size.output(), "Family");
/// ```
#[derive(Debug, Clone)]
pub struct FamilySize {
    siblings: String,
    parents: String,
    output: String,
}

impl FamilySize {
    /// Uses the `SibSp` and `Parch` columns and writes `Family_Size`.
    pub fn new() -> Self {
        Self {
            siblings: "SibSp".to_string(),
            parents: "Parch".to_string(),
            output: "Family_Size".to_string(),
        }
    }

    /// Sets the operand columns.
    #[must_use]
    pub fn with_columns(mut self, siblings: impl Into<String>, parents: impl Into<String>) -> Self {
        self.siblings = siblings.into();
        self.parents = parents.into();
        self
    }

    /// Sets the output column name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the output column name.
    pub fn output(&self) -> &str {
        &self.output
    }
}

impl Default for FamilySize {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for FamilySize {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let siblings = numeric_column(&batch, &self.siblings)?;
        let parents = numeric_column(&batch, &self.parents)?;
        let rows = 0..batch.num_rows();

        let size: ArrayRef = if is_integer_type(siblings.data_type())
            && is_integer_type(parents.data_type())
        {
            let values = rows
                .map(|i| {
                    match (
                        Value::from_array(siblings.as_ref(), i),
                        Value::from_array(parents.as_ref(), i),
                    ) {
                        (Value::Int(s), Value::Int(p)) => s
                            .checked_add(p)
                            .and_then(|v| v.checked_add(1))
                            .map(Some)
                            .ok_or_else(|| {
                                Error::invalid_operation(format!(
                                    "family size overflows at row {i}: {s} + {p} + 1"
                                ))
                            }),
                        _ => Ok(None),
                    }
                })
                .collect::<Result<Vec<Option<i64>>>>()?;
            Arc::new(Int64Array::from(values))
        } else {
            let values: Float64Array = rows
                .map(|i| {
                    let s = Value::from_array(siblings.as_ref(), i).as_f64()?;
                    let p = Value::from_array(parents.as_ref(), i).as_f64()?;
                    Some(s + p + 1.0)
                })
                .collect();
            Arc::new(values)
        };

        debug!(output = %self.output, "derived family size");
        with_column(&batch, &self.output, size)
    }
}

/// Bins a numeric column into labelled intervals.
///
/// With boundaries `b0 < b1 < ... < bn` and `n` labels, label `i` covers
/// `(b(i-1), b(i)]`, and the first label also covers `b0`. Values outside
/// `[b0, bn]` and missing values give a missing label.
///
/// # Example
///
/// ```
/// use bonifica::Cut;
///
/// let cut = Cut::new(
///     "Age",
///     vec![0.0, 12.0, 25.0, 40.0, 80.0],
///     vec!["Child", "Young", "Adult", "Senior"],
/// )
/// .unwrap();
/// assert_eq!(cut.label_for(12.0), Some("Child"));
/// assert_eq!(cut.label_for(12.5), Some("Young"));
/// assert_eq!(cut.label_for(81.0), None);
/// ```
#[derive(Debug, Clone)]
pub struct Cut {
    column: String,
    boundaries: Vec<f64>,
    labels: Vec<String>,
    output: String,
}

impl Cut {
    /// Creates a Cut over `column`. The output column defaults to
    /// `<column>_Group`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if there are no labels, if the boundary
    /// count is not the label count plus one, or if the boundaries are not
    /// strictly increasing.
    pub fn new<S: Into<String>>(
        column: impl Into<String>,
        boundaries: Vec<f64>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let column = column.into();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if labels.is_empty() {
            return Err(Error::invalid_operation("binning needs at least one label"));
        }
        if boundaries.len() != labels.len() + 1 {
            return Err(Error::invalid_operation(format!(
                "{} boundaries given for {} labels, expected {}",
                boundaries.len(),
                labels.len(),
                labels.len() + 1
            )));
        }
        if !boundaries.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::invalid_operation(
                "bin boundaries must be strictly increasing",
            ));
        }

        let output = format!("{column}_Group");
        Ok(Self {
            column,
            boundaries,
            labels,
            output,
        })
    }

    /// Sets the output column name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the output column name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The label for a single value, or `None` when out of range.
    pub fn label_for(&self, value: f64) -> Option<&str> {
        let first = *self.boundaries.first()?;
        let last = *self.boundaries.last()?;
        if value.is_nan() || value < first || value > last {
            return None;
        }
        if value == first {
            return self.labels.first().map(String::as_str);
        }
        let upper = self.boundaries.partition_point(|&b| b < value);
        self.labels.get(upper - 1).map(String::as_str)
    }
}

impl Transform for Cut {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let source = numeric_column(&batch, &self.column)?;
        let labels: StringArray = (0..batch.num_rows())
            .map(|i| {
                Value::from_array(source.as_ref(), i)
                    .as_f64()
                    .and_then(|v| self.label_for(v))
            })
            .collect();

        debug!(column = %self.column, output = %self.output, "binned column");
        with_column(&batch, &self.output, Arc::new(labels))
    }
}

/// Bins a numeric column into `k` quantile bins, one per label.
///
/// Bin edges are the column's own quantiles at `1/k, ..., (k-1)/k`, with
/// the maximum as the last edge. A value lands in the first bin whose upper
/// edge is at least the value, so ties go to the lower bin.
///
/// # Example
///
/// ```
/// use bonifica::QuantileCut;
///
/// let cut = QuantileCut::new("Fare", vec!["Low", "Medium", "High", "Very High"])
///     .unwrap()
///     .with_output("Fare_Category");
/// assert_eq!(cut.output(), "Fare_Category");
/// ```
#[derive(Debug, Clone)]
pub struct QuantileCut {
    column: String,
    labels: Vec<String>,
    output: String,
}

impl QuantileCut {
    /// Creates a QuantileCut over `column`; the output defaults to
    /// `<column>_Category`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `labels` is empty.
    pub fn new<S: Into<String>>(
        column: impl Into<String>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let column = column.into();
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::invalid_operation(
                "quantile binning needs at least one label",
            ));
        }
        let output = format!("{column}_Category");
        Ok(Self {
            column,
            labels,
            output,
        })
    }

    /// Sets the output column name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the output column name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Upper bin edges for the given non-missing values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if there are fewer distinct values than
    /// labels.
    #[allow(clippy::cast_precision_loss)]
    pub fn edges(&self, values: &[f64]) -> Result<Vec<f64>> {
        let k = self.labels.len();
        let sorted = stats::sorted(values);

        let mut distinct = sorted.clone();
        distinct.dedup();
        if distinct.len() < k {
            return Err(Error::invalid_operation(format!(
                "column '{}' has {} distinct values, {k} quantile bins need at least {k}",
                self.column,
                distinct.len()
            )));
        }

        let mut edges: Vec<f64> = (1..k)
            .filter_map(|i| stats::quantile(&sorted, i as f64 / k as f64))
            .collect();
        edges.extend(sorted.last().copied());
        Ok(edges)
    }
}

impl Transform for QuantileCut {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let source = numeric_column(&batch, &self.column)?;
        let values: Vec<Option<f64>> = (0..batch.num_rows())
            .map(|i| Value::from_array(source.as_ref(), i).as_f64())
            .collect();
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let edges = self.edges(&present)?;

        let labels: StringArray = values
            .iter()
            .map(|v| {
                v.and_then(|v| {
                    let bin = edges.partition_point(|&e| e < v);
                    self.labels.get(bin).map(String::as_str)
                })
            })
            .collect();

        debug!(column = %self.column, ?edges, "quantile-binned column");
        with_column(&batch, &self.output, Arc::new(labels))
    }
}

/// Maps integral values of a column to labels through a lookup table.
///
/// Values not in the table, fractional values and missing values give a
/// missing label. When a value appears under several labels the first
/// wins.
///
/// # Example
///
/// ```
/// use bonifica::MapCategories;
///
/// let map = MapCategories::new(
///     "Family_Size",
///     vec![("Solo", vec![1]), ("Small", vec![2, 3])],
/// );
/// assert_eq!(map.label_for(3), Some("Small"));
/// assert_eq!(map.label_for(9), None);
/// ```
#[derive(Debug, Clone)]
pub struct MapCategories {
    column: String,
    table: Vec<(String, Vec<i64>)>,
    output: String,
}

impl MapCategories {
    /// Creates a mapping over `column`; the output defaults to
    /// `<column>_Category`.
    pub fn new<S: Into<String>>(
        column: impl Into<String>,
        table: impl IntoIterator<Item = (S, Vec<i64>)>,
    ) -> Self {
        let column = column.into();
        let output = format!("{column}_Category");
        Self {
            table: table
                .into_iter()
                .map(|(label, values)| (label.into(), values))
                .collect(),
            column,
            output,
        }
    }

    /// Sets the output column name.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the output column name.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The label for one value.
    pub fn label_for(&self, value: i64) -> Option<&str> {
        self.table
            .iter()
            .find(|(_, values)| values.contains(&value))
            .map(|(label, _)| label.as_str())
    }
}

impl Transform for MapCategories {
    #[allow(clippy::cast_possible_truncation)]
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let source = numeric_column(&batch, &self.column)?;
        let labels: StringArray = (0..batch.num_rows())
            .map(|i| match Value::from_array(source.as_ref(), i) {
                Value::Int(v) => self.label_for(v),
                Value::Float(v) if v.fract() == 0.0 => self.label_for(v as i64),
                _ => None,
            })
            .collect();

        debug!(column = %self.column, output = %self.output, "mapped categories");
        with_column(&batch, &self.output, Arc::new(labels))
    }
}

/// Builds the derivation chain described by `config`: family size, family
/// category, age group, then fare category.
///
/// # Errors
///
/// Returns `InvalidOperation` if the age bins or fare labels are invalid.
pub fn feature_chain(config: &FeatureConfig) -> Result<Chain> {
    let mut chain = Chain::new().then(
        FamilySize::new()
            .with_columns(&config.siblings_column, &config.parents_column)
            .with_output(&config.family_size_column),
    );

    if !config.family_categories.is_empty() {
        chain = chain.then(
            MapCategories::new(
                &config.family_size_column,
                config
                    .family_categories
                    .iter()
                    .map(|c| (c.label.clone(), c.sizes.clone())),
            )
            .with_output(&config.family_category_column),
        );
    }

    Ok(chain
        .then(
            Cut::new(
                &config.age_column,
                config.age_bins.clone(),
                config.age_labels.iter().cloned(),
            )?
            .with_output(&config.age_group_column),
        )
        .then(
            QuantileCut::new(&config.fare_column, config.fare_labels.iter().cloned())?
                .with_output(&config.fare_category_column),
        ))
}

/// Applies every configured derivation to `dataset`.
///
/// # Errors
///
/// Returns `SchemaMismatch` if an input column is absent and
/// `InvalidOperation` if a derivation is undefined for the data.
pub fn derive_all(dataset: &ArrowDataset, config: &FeatureConfig) -> Result<ArrowDataset> {
    dataset.with_transform(&feature_chain(config)?)
}
