//! Row-level operations: deduplication and dropping incomplete rows.

use std::collections::{hash_map::Entry, HashMap};

use arrow::{
    array::{BooleanArray, RecordBatch},
    compute::filter_record_batch,
};
use tracing::debug;

use super::{column_index, Transform};
use crate::{
    error::{Error, Result},
    value::{self, Value},
};

/// Cells of `row_idx` over `key_indices`, usable as a hash key.
///
/// Missing equals missing, so two rows that are both blank in a column
/// still match.
pub(crate) fn row_key(batch: &RecordBatch, row_idx: usize, key_indices: &[usize]) -> Vec<Value> {
    key_indices
        .iter()
        .map(|&col_idx| Value::from_array(batch.column(col_idx).as_ref(), row_idx))
        .collect()
}

/// A transform that removes duplicate rows, keeping the first occurrence.
///
/// Kept rows stay in their original order.
///
/// # Example
///
/// ```
/// use bonifica::Unique;
///
/// // Full-row equality
/// let unique = Unique::all();
///
/// // Equality on a subset of columns
/// let unique = Unique::by(vec!["Name", "Ticket"]);
/// assert_eq!(unique.columns().map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Unique {
    columns: Option<Vec<String>>,
}

impl Unique {
    /// Creates a Unique transform that considers all columns.
    pub fn all() -> Self {
        Self { columns: None }
    }

    /// Creates a Unique transform that considers specific columns.
    pub fn by<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns the columns used for the uniqueness check.
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// For each row, true if it is the first occurrence of its key.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if a key column does not exist.
    pub fn first_occurrences(&self, batch: &RecordBatch) -> Result<Vec<bool>> {
        let schema = batch.schema();
        let key_indices: Vec<usize> = match &self.columns {
            Some(cols) => cols
                .iter()
                .map(|name| column_index(&schema, name))
                .collect::<Result<Vec<_>>>()?,
            None => (0..schema.fields().len()).collect(),
        };

        let mut seen: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut keep = Vec::with_capacity(batch.num_rows());

        for row_idx in 0..batch.num_rows() {
            match seen.entry(row_key(batch, row_idx, &key_indices)) {
                Entry::Vacant(e) => {
                    e.insert(row_idx);
                    keep.push(true);
                }
                Entry::Occupied(_) => keep.push(false),
            }
        }

        Ok(keep)
    }
}

impl Transform for Unique {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let keep = self.first_occurrences(&batch)?;
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return Ok(batch);
        }

        debug!(removed, "removing duplicate rows");
        filter_record_batch(&batch, &BooleanArray::from(keep)).map_err(Error::Arrow)
    }
}

/// A transform that drops every row missing a value in any listed column.
///
/// All columns are preserved. An empty column list keeps every row.
///
/// # Example
///
/// ```
/// use bonifica::DropIncomplete;
///
/// let drop = DropIncomplete::new(["Age", "Embarked"]);
/// assert_eq!(drop.columns(), ["Age", "Embarked"]);
/// ```
#[derive(Debug, Clone)]
pub struct DropIncomplete {
    columns: Vec<String>,
}

impl DropIncomplete {
    /// Creates a DropIncomplete transform over the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the columns that must be complete.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Transform for DropIncomplete {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let schema = batch.schema();
        let indices = self
            .columns
            .iter()
            .map(|name| column_index(&schema, name))
            .collect::<Result<Vec<_>>>()?;

        let mask: Vec<bool> = (0..batch.num_rows())
            .map(|row| {
                indices
                    .iter()
                    .all(|&col| !value::is_missing(batch.column(col).as_ref(), row))
            })
            .collect();

        let removed = mask.iter().filter(|k| !**k).count();
        if removed == 0 {
            return Ok(batch);
        }

        debug!(removed, columns = ?self.columns, "dropping incomplete rows");
        filter_record_batch(&batch, &BooleanArray::from(mask)).map_err(Error::Arrow)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{Array, Float64Array, Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };

    use super::*;

    fn create_batch_with_duplicates() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Pclass", DataType::Int64, false),
            Field::new("Age", DataType::Float64, true),
            Field::new("Embarked", DataType::Utf8, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![3, 1, 3, 3, 1, 2])),
                Arc::new(Float64Array::from(vec![
                    Some(22.0),
                    None,
                    Some(22.0),
                    Some(22.0),
                    None,
                    Some(30.0),
                ])),
                Arc::new(StringArray::from(vec![
                    Some("S"),
                    Some("C"),
                    Some("S"),
                    None,
                    Some("C"),
                    Some("Q"),
                ])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"))
    }

    fn pclass(batch: &RecordBatch) -> Vec<i64> {
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap_or_else(|| panic!("Should be Int64Array"));
        (0..col.len()).map(|i| col.value(i)).collect()
    }

    #[test]
    fn test_unique_all_columns_keeps_first() {
        let batch = create_batch_with_duplicates();
        // Row 2 repeats row 0; row 4 repeats row 1 (missing Age equals missing Age).
        let keep = Unique::all().first_occurrences(&batch).unwrap();
        assert_eq!(keep, vec![true, true, false, true, false, true]);

        let result = Unique::all().apply(batch).unwrap();
        assert_eq!(result.num_rows(), 4);
        assert_eq!(pclass(&result), vec![3, 1, 3, 2]);
    }

    #[test]
    fn test_unique_by_column() {
        let result = Unique::by(vec!["Pclass"])
            .apply(create_batch_with_duplicates())
            .unwrap();
        assert_eq!(pclass(&result), vec![3, 1, 2]);
    }

    #[test]
    fn test_unique_is_idempotent() {
        let once = Unique::all().apply(create_batch_with_duplicates()).unwrap();
        let twice = Unique::all().apply(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unique_column_not_found() {
        let err = Unique::by(vec!["Ticket"])
            .apply(create_batch_with_duplicates())
            .unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_unique_empty_batch() {
        let batch = create_batch_with_duplicates().slice(0, 0);
        let result = Unique::all().apply(batch).unwrap();
        assert_eq!(result.num_rows(), 0);
    }

    #[test]
    fn test_drop_incomplete() {
        let result = DropIncomplete::new(["Age", "Embarked"])
            .apply(create_batch_with_duplicates())
            .unwrap();
        assert_eq!(result.num_columns(), 3);
        assert_eq!(pclass(&result), vec![3, 3, 2]);
    }

    #[test]
    fn test_drop_incomplete_single_column() {
        let result = DropIncomplete::new(["Embarked"])
            .apply(create_batch_with_duplicates())
            .unwrap();
        assert_eq!(result.num_rows(), 5);
    }

    #[test]
    fn test_drop_incomplete_no_columns_is_identity() {
        let batch = create_batch_with_duplicates();
        let result = DropIncomplete::new(Vec::<String>::new())
            .apply(batch.clone())
            .unwrap();
        assert_eq!(result, batch);
    }

    #[test]
    fn test_drop_incomplete_unknown_column() {
        let err = DropIncomplete::new(["Cabin"])
            .apply(create_batch_with_duplicates())
            .unwrap_err();
        assert!(err.is_schema_mismatch());
    }
}
