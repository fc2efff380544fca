//! Data transforms for bonifica.
//!
//! Transforms turn one RecordBatch into a new RecordBatch. They never
//! mutate their input: Arrow arrays are immutable and untouched columns are
//! shared by `Arc`. Datasets apply a transform to the whole table at once
//! (see [`ArrowDataset::with_transform`](crate::ArrowDataset::with_transform)),
//! so statistics like a column mean are taken over every row.

use std::sync::Arc;

use arrow::{
    array::{ArrayRef, RecordBatch, RecordBatchOptions},
    datatypes::{DataType, Field, Schema, SchemaRef},
};

use crate::error::{Error, Result};

mod features;
mod fill;
mod row_ops;
mod selection;

pub use features::{derive_all, feature_chain, Cut, FamilySize, MapCategories, QuantileCut};
pub use fill::{FillNull, FillStrategy};
pub(crate) use row_ops::row_key;
pub use row_ops::{DropIncomplete, Unique};
pub use selection::{Drop, DropSparse};

/// A transform that can be applied to RecordBatches.
///
/// # Thread Safety
///
/// All transforms must be thread-safe (Send + Sync).
pub trait Transform: Send + Sync {
    /// Applies the transform to a RecordBatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform cannot be applied to the batch.
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch>;
}

/// A chain of transforms applied in sequence.
///
/// # Example
///
/// ```
/// use bonifica::{Chain, DropSparse, FillNull, FillStrategy};
///
/// let chain = Chain::new()
///     .then(FillNull::new("Age", FillStrategy::Mean))
///     .then(DropSparse::new(50.0))
///     .then(FillNull::new("Embarked", FillStrategy::Mode));
/// assert_eq!(chain.len(), 3);
/// ```
pub struct Chain {
    transforms: Vec<Box<dyn Transform>>,
}

impl Chain {
    /// Creates a new empty transform chain.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Adds a transform to the chain.
    #[must_use]
    pub fn then<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Returns the number of transforms in the chain.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns true if the chain has no transforms.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Chain {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        let mut result = batch;
        for transform in &self.transforms {
            result = transform.apply(result)?;
        }
        Ok(result)
    }
}

impl Transform for Box<dyn Transform> {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        (**self).apply(batch)
    }
}

impl Transform for Arc<dyn Transform> {
    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        (**self).apply(batch)
    }
}

/// Looks up a column index by name.
pub(crate) fn column_index(schema: &Schema, name: &str) -> Result<usize> {
    schema
        .column_with_name(name)
        .map(|(idx, _)| idx)
        .ok_or_else(|| Error::column_not_found(name))
}

/// Builds a batch, keeping the row count even when no columns remain.
pub(crate) fn build_batch(
    schema: SchemaRef,
    columns: Vec<ArrayRef>,
    num_rows: usize,
) -> Result<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    RecordBatch::try_new_with_options(schema, columns, &options).map_err(Error::Arrow)
}

/// Returns a batch with `array` stored under `name`: replaces the column in
/// place if it exists, otherwise appends it.
pub(crate) fn with_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let field = Field::new(name, array.data_type().clone(), true);

    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    match schema.column_with_name(name) {
        Some((idx, _)) => {
            fields[idx] = field;
            columns[idx] = array;
        }
        None => {
            fields.push(field);
            columns.push(array);
        }
    }

    build_batch(Arc::new(Schema::new(fields)), columns, batch.num_rows())
}

/// Returns true for Arrow integer and float types.
pub(crate) fn is_numeric_type(dtype: &DataType) -> bool {
    is_integer_type(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Returns true for Arrow integer types.
pub(crate) fn is_integer_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use arrow::array::{Array, Float64Array, Int64Array, StringArray};

    use super::*;

    fn create_test_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("Age", DataType::Float64, true),
            Field::new("Cabin", DataType::Utf8, true),
        ]));

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
                Arc::new(Float64Array::from(vec![Some(20.0), None, Some(40.0), None])),
                Arc::new(StringArray::from(vec![None, None, None, Some("C85")])),
            ],
        )
        .ok()
        .unwrap_or_else(|| panic!("Should create batch"))
    }

    #[test]
    fn test_chain_transform() {
        let chain = Chain::new()
            .then(FillNull::new("Age", FillStrategy::Mean))
            .then(DropSparse::new(50.0));

        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());

        let result = chain.apply(create_test_batch()).unwrap();
        assert_eq!(result.num_columns(), 2);
        assert_eq!(result.num_rows(), 4);
        assert_eq!(result.column(1).null_count(), 0);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let batch = create_test_batch();
        let result = Chain::default().apply(batch.clone()).unwrap();
        assert_eq!(result, batch);
    }

    #[test]
    fn test_chain_stops_at_first_error() {
        let chain = Chain::new()
            .then(DropSparse::new(50.0))
            .then(FillNull::new("Cabin", FillStrategy::Mode));

        let err = chain.apply(create_test_batch()).unwrap_err();
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_boxed_and_arc_delegation() {
        let boxed: Box<dyn Transform> = Box::new(Unique::all());
        assert_eq!(boxed.apply(create_test_batch()).unwrap().num_rows(), 4);

        let arced: Arc<dyn Transform> = Arc::new(DropIncomplete::new(["Age"]));
        assert_eq!(arced.apply(create_test_batch()).unwrap().num_rows(), 2);
    }

    #[test]
    fn test_with_column_appends_and_replaces() {
        let batch = create_test_batch();
        let flags: ArrayRef = Arc::new(Int64Array::from(vec![0, 1, 0, 1]));

        let appended = with_column(&batch, "flag", Arc::clone(&flags)).unwrap();
        assert_eq!(appended.num_columns(), 4);
        assert_eq!(appended.schema().field(3).name(), "flag");

        let replaced = with_column(&batch, "id", flags).unwrap();
        assert_eq!(replaced.num_columns(), 3);
        assert_eq!(replaced.schema().field(0).name(), "id");
    }

    #[test]
    fn test_build_batch_without_columns_keeps_rows() {
        let batch = build_batch(Arc::new(Schema::empty()), vec![], 5).unwrap();
        assert_eq!(batch.num_rows(), 5);
        assert_eq!(batch.num_columns(), 0);
    }

    #[test]
    fn test_type_predicates() {
        assert!(is_numeric_type(&DataType::Int32));
        assert!(is_numeric_type(&DataType::Float64));
        assert!(!is_numeric_type(&DataType::Utf8));
        assert!(is_integer_type(&DataType::UInt8));
        assert!(!is_integer_type(&DataType::Float32));
    }
}
