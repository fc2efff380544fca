//! Missing-value imputation.

use std::{collections::HashMap, sync::Arc};

use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray, UInt32Array},
    compute::{cast, concat, take},
    datatypes::DataType,
};
use tracing::debug;

use super::{column_index, is_integer_type, is_numeric_type, with_column, Transform};
use crate::{
    error::{Error, Result},
    stats,
    value::{self, Value},
};

/// Strategy for filling missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStrategy {
    /// Arithmetic mean of the non-missing values. The column becomes
    /// Float64.
    Mean,
    /// Most frequent non-missing value, ties broken by first appearance.
    /// The column keeps its type.
    Mode,
    /// A fixed value, converted to the column type.
    Constant(Value),
}

/// A transform that fills the missing cells of one column.
///
/// The statistic is taken from the batch the transform receives, before any
/// cell is filled.
///
/// # Example
///
/// ```
/// use bonifica::{FillNull, FillStrategy};
///
/// let fill = FillNull::new("Age", FillStrategy::Mean);
/// assert_eq!(fill.column(), "Age");
/// ```
#[derive(Debug, Clone)]
pub struct FillNull {
    column: String,
    strategy: FillStrategy,
}

impl FillNull {
    /// Creates a FillNull transform for one column.
    pub fn new(column: impl Into<String>, strategy: FillStrategy) -> Self {
        Self {
            column: column.into(),
            strategy,
        }
    }

    /// Returns the target column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the fill strategy.
    pub fn strategy(&self) -> &FillStrategy {
        &self.strategy
    }

    fn fill_mean(&self, array: &ArrayRef) -> Result<ArrayRef> {
        if !is_numeric_type(array.data_type()) {
            return Err(Error::invalid_operation(format!(
                "cannot take the mean of non-numeric column '{}' ({})",
                self.column,
                array.data_type()
            )));
        }

        let floats = cast(array, &DataType::Float64)?;
        let floats = floats
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| Error::invalid_operation("cast to Float64 failed"))?;

        let present: Vec<f64> = floats.iter().flatten().filter(|v| !v.is_nan()).collect();
        let mean = stats::mean(&present).ok_or_else(|| {
            Error::invalid_operation(format!(
                "mean of column '{}' is undefined: every value is missing",
                self.column
            ))
        })?;

        debug!(column = %self.column, mean, "filling missing values with mean");

        let filled: Float64Array = floats
            .iter()
            .map(|v| match v {
                Some(v) if !v.is_nan() => Some(v),
                _ => Some(mean),
            })
            .collect();
        Ok(Arc::new(filled))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill_mode(&self, array: &ArrayRef) -> Result<ArrayRef> {
        // value -> (count, first row)
        let mut counts: HashMap<Value, (usize, usize)> = HashMap::new();
        for idx in 0..array.len() {
            let cell = Value::from_array(array.as_ref(), idx);
            if cell.is_missing() {
                continue;
            }
            counts.entry(cell).or_insert((0, idx)).0 += 1;
        }

        let (mode, (count, mode_row)) = counts
            .into_iter()
            .max_by(|(_, (ca, ra)), (_, (cb, rb))| ca.cmp(cb).then(rb.cmp(ra)))
            .ok_or_else(|| {
                Error::invalid_operation(format!(
                    "mode of column '{}' is undefined: every value is missing",
                    self.column
                ))
            })?;

        debug!(column = %self.column, %mode, count, "filling missing values with mode");

        let indices: UInt32Array = (0..array.len())
            .map(|idx| {
                let source = if value::is_missing(array.as_ref(), idx) {
                    mode_row
                } else {
                    idx
                };
                source as u32
            })
            .collect();
        take(array.as_ref(), &indices, None).map_err(Error::Arrow)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill_constant(&self, array: &ArrayRef, constant: &Value) -> Result<ArrayRef> {
        let literal: ArrayRef = match constant {
            Value::Int(v) => Arc::new(Int64Array::from(vec![*v])),
            Value::Float(v) => Arc::new(Float64Array::from(vec![*v])),
            Value::Str(v) => Arc::new(StringArray::from(vec![v.as_str()])),
            Value::Missing => {
                return Err(Error::invalid_operation(
                    "cannot fill missing values with a missing constant",
                ))
            }
        };

        // A fractional constant widens an integer column
        let target = if is_integer_type(array.data_type()) && matches!(constant, Value::Float(_)) {
            DataType::Float64
        } else {
            array.data_type().clone()
        };

        let column = cast(array, &target)?;
        let literal = cast(&literal, &target)?;
        if literal.is_null(0) {
            return Err(Error::invalid_operation(format!(
                "constant {constant} does not fit column '{}' ({target})",
                self.column
            )));
        }

        debug!(column = %self.column, %constant, "filling missing values with constant");

        let literal_idx = column.len() as u32;
        let combined = concat(&[column.as_ref(), literal.as_ref()])?;
        let indices: UInt32Array = (0..column.len())
            .map(|idx| {
                if value::is_missing(column.as_ref(), idx) {
                    literal_idx
                } else {
                    idx as u32
                }
            })
            .collect();
        take(combined.as_ref(), &indices, None).map_err(Error::Arrow)
    }
}

impl Transform for FillNull {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let idx = column_index(&batch.schema(), &self.column)?;
        let array = batch.column(idx);

        let filled = match &self.strategy {
            FillStrategy::Mean => self.fill_mean(array)?,
            FillStrategy::Mode => self.fill_mode(array)?,
            FillStrategy::Constant(constant) => self.fill_constant(array, constant)?,
        };

        with_column(&batch, &self.column, filled)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use arrow::datatypes::{Field, Schema};

    use super::*;

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Age", DataType::Float64, true),
            Field::new("SibSp", DataType::Int64, true),
            Field::new("Embarked", DataType::Utf8, true),
            Field::new("Cabin", DataType::Utf8, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![
                    Some(20.0),
                    None,
                    Some(40.0),
                    Some(f64::NAN),
                    Some(30.0),
                ])),
                Arc::new(Int64Array::from(vec![Some(1), Some(0), None, Some(2), Some(0)])),
                Arc::new(StringArray::from(vec![
                    Some("C"),
                    Some("S"),
                    None,
                    Some("S"),
                    Some("C"),
                ])),
                Arc::new(StringArray::from(vec![None::<&str>; 5])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"))
    }

    fn floats(batch: &RecordBatch, name: &str) -> Vec<f64> {
        let (idx, _) = batch.schema().column_with_name(name).unwrap();
        let col = batch
            .column(idx)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap_or_else(|| panic!("Should be Float64Array"));
        col.values().to_vec()
    }

    fn strings(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
        let (idx, _) = batch.schema().column_with_name(name).unwrap();
        let col = batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap_or_else(|| panic!("Should be StringArray"));
        col.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn test_fill_mean_float() {
        let result = FillNull::new("Age", FillStrategy::Mean)
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(floats(&result, "Age"), vec![20.0, 30.0, 40.0, 30.0, 30.0]);
        assert_eq!(value::missing_count(result.column(0).as_ref()), 0);
    }

    #[test]
    fn test_fill_mean_integer_becomes_float() {
        let result = FillNull::new("SibSp", FillStrategy::Mean)
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(result.schema().field(1).data_type(), &DataType::Float64);
        assert_eq!(floats(&result, "SibSp"), vec![1.0, 0.0, 0.75, 2.0, 0.0]);
    }

    #[test]
    fn test_fill_mean_non_numeric() {
        let err = FillNull::new("Embarked", FillStrategy::Mean)
            .apply(create_test_batch())
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_fill_mean_all_missing() {
        let schema = Arc::new(Schema::new(vec![Field::new("Age", DataType::Float64, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![None, Some(f64::NAN)]))],
        )
        .unwrap();
        let err = FillNull::new("Age", FillStrategy::Mean)
            .apply(batch)
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_fill_mode_tie_goes_to_first_seen() {
        // C and S both appear twice; C comes first.
        let result = FillNull::new("Embarked", FillStrategy::Mode)
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(strings(&result, "Embarked")[2].as_deref(), Some("C"));
        assert_eq!(result.schema().field(2).data_type(), &DataType::Utf8);
    }

    #[test]
    fn test_fill_mode_keeps_integer_type() {
        let result = FillNull::new("SibSp", FillStrategy::Mode)
            .apply(create_test_batch())
            .unwrap();
        let col = result
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(col.value(2), 0);
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_fill_mode_all_missing() {
        let err = FillNull::new("Cabin", FillStrategy::Mode)
            .apply(create_test_batch())
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_fill_constant() {
        let result = FillNull::new("Cabin", FillStrategy::Constant(Value::from("Unknown")))
            .apply(create_test_batch())
            .unwrap();
        assert!(strings(&result, "Cabin")
            .iter()
            .all(|v| v.as_deref() == Some("Unknown")));

        let result = FillNull::new("SibSp", FillStrategy::Constant(Value::Int(9)))
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(result.schema().field(1).data_type(), &DataType::Int64);
    }

    #[test]
    fn test_fill_constant_float_widens_integer() {
        let result = FillNull::new("SibSp", FillStrategy::Constant(Value::Float(0.5)))
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(floats(&result, "SibSp"), vec![1.0, 0.0, 0.5, 2.0, 0.0]);
    }

    #[test]
    fn test_fill_constant_rejects_missing() {
        let err = FillNull::new("Age", FillStrategy::Constant(Value::Missing))
            .apply(create_test_batch())
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_fill_unknown_column() {
        let err = FillNull::new("Fare", FillStrategy::Mean)
            .apply(create_test_batch())
            .unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_fill_does_not_touch_input() {
        let batch = create_test_batch();
        let _ = FillNull::new("Age", FillStrategy::Mean)
            .apply(batch.clone())
            .unwrap();
        assert_eq!(value::missing_count(batch.column(0).as_ref()), 2);
    }
}
