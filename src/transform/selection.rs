//! Column removal transforms.

use std::{collections::HashSet, sync::Arc};

use arrow::{
    array::RecordBatch,
    datatypes::{Field, Schema},
};
use tracing::debug;

use super::{build_batch, Transform};
use crate::{
    error::{Error, Result},
    value,
};

/// A transform that drops (removes) named columns from a RecordBatch.
///
/// Every named column must exist. Rows are preserved, even when no column
/// remains.
///
/// # Example
///
/// ```
/// use bonifica::Drop;
///
/// let drop = Drop::new(vec!["Cabin", "Ticket"]);
/// assert_eq!(drop.columns().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Drop {
    columns: Vec<String>,
}

impl Drop {
    /// Creates a new Drop transform for the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the columns to be dropped.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Transform for Drop {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let schema = batch.schema();

        for name in &self.columns {
            if schema.column_with_name(name).is_none() {
                return Err(Error::column_not_found(name));
            }
        }

        let drop_set: HashSet<&str> = self.columns.iter().map(String::as_str).collect();

        let mut fields = Vec::new();
        let mut arrays = Vec::new();

        for (idx, field) in schema.fields().iter().enumerate() {
            if !drop_set.contains(field.name().as_str()) {
                fields.push(field.as_ref().clone());
                arrays.push(Arc::clone(batch.column(idx)));
            }
        }

        build_batch(Arc::new(Schema::new(fields)), arrays, batch.num_rows())
    }
}

/// A transform that drops every column whose missing percentage exceeds a
/// threshold.
///
/// The threshold is a percentage (0 to 100). A column at exactly the
/// threshold is kept. With zero rows every column is 0% missing and kept.
///
/// # Example
///
/// ```
/// use bonifica::DropSparse;
///
/// let sparse = DropSparse::new(50.0);
/// assert_eq!(sparse.threshold(), 50.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DropSparse {
    threshold: f64,
}

impl DropSparse {
    /// Creates a DropSparse transform with a threshold in percent.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Returns the threshold in percent.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Names of the columns this transform would drop from `batch`.
    #[allow(clippy::cast_precision_loss)]
    pub fn sparse_columns(&self, batch: &RecordBatch) -> Vec<String> {
        let rows = batch.num_rows();
        if rows == 0 {
            return Vec::new();
        }

        batch
            .schema()
            .fields()
            .iter()
            .zip(batch.columns())
            .filter(|(_, col)| {
                let pct = value::missing_count(col.as_ref()) as f64 / rows as f64 * 100.0;
                pct > self.threshold
            })
            .map(|(field, _)| field.name().clone())
            .collect()
    }
}

impl Transform for DropSparse {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let sparse = self.sparse_columns(&batch);
        if sparse.is_empty() {
            return Ok(batch);
        }

        debug!(columns = ?sparse, threshold = self.threshold, "dropping sparse columns");

        let schema = batch.schema();
        let (fields, arrays): (Vec<Field>, Vec<_>) = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .filter(|(field, _)| !sparse.contains(field.name()))
            .map(|(field, col)| (field.as_ref().clone(), Arc::clone(col)))
            .unzip();

        build_batch(Arc::new(Schema::new(fields)), arrays, batch.num_rows())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use arrow::{
        array::{Float64Array, Int64Array, StringArray},
        datatypes::DataType,
    };

    use super::*;

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("Age", DataType::Float64, true),
            Field::new("Cabin", DataType::Utf8, true),
        ]));

        // Age: 2/4 missing (50%), Cabin: 3/4 missing (75%)
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
                Arc::new(Float64Array::from(vec![Some(22.0), None, Some(f64::NAN), Some(35.0)])),
                Arc::new(StringArray::from(vec![None, Some("C85"), None, None])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"))
    }

    #[test]
    fn test_drop_columns() {
        let result = Drop::new(vec!["Cabin"]).apply(create_test_batch()).unwrap();
        assert_eq!(result.num_columns(), 2);
        assert!(result.schema().column_with_name("Cabin").is_none());
        assert_eq!(result.num_rows(), 4);
    }

    #[test]
    fn test_drop_unknown_column() {
        let err = Drop::new(vec!["Ticket"]).apply(create_test_batch()).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_drop_all_columns_keeps_rows() {
        let result = Drop::new(vec!["id", "Age", "Cabin"])
            .apply(create_test_batch())
            .unwrap();
        assert_eq!(result.num_columns(), 0);
        assert_eq!(result.num_rows(), 4);
    }

    #[test]
    fn test_sparse_threshold_is_exclusive() {
        let sparse = DropSparse::new(50.0);
        // NaN counts as missing, so Age sits at exactly 50% and survives.
        assert_eq!(sparse.sparse_columns(&create_test_batch()), vec!["Cabin"]);

        let result = sparse.apply(create_test_batch()).unwrap();
        let names: Vec<_> = result
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["id", "Age"]);
        assert_eq!(result.num_rows(), 4);
    }

    #[test]
    fn test_sparse_lower_threshold() {
        let result = DropSparse::new(25.0).apply(create_test_batch()).unwrap();
        assert_eq!(result.num_columns(), 1);
    }

    #[test]
    fn test_sparse_zero_rows_keeps_everything() {
        let batch = create_test_batch().slice(0, 0);
        let result = DropSparse::new(0.0).apply(batch).unwrap();
        assert_eq!(result.num_columns(), 3);
        assert_eq!(DropSparse::new(10.0).threshold(), 10.0);
    }
}
