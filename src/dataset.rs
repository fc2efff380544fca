//! Dataset types for bonifica.
//!
//! Provides the [`Dataset`] trait and the [`ArrowDataset`] implementation,
//! an immutable table stored as Arrow `RecordBatch`es. Every transformation
//! in this crate returns a new `ArrowDataset`; column buffers are shared
//! through `Arc`, so the input value stays untouched and cheap to keep
//! around for comparisons.

use std::{
    io::{Read, Seek},
    path::Path,
    sync::Arc,
};

use arrow::{
    array::{ArrayRef, RecordBatch},
    compute::concat_batches,
    datatypes::{DataType, Field, Schema, SchemaRef},
};

use crate::{
    error::{Error, Result},
    transform::Transform,
    value::{self, Value},
};

/// A tabular dataset that can be iterated batch by batch.
///
/// All implementations must be thread-safe (Send + Sync).
pub trait Dataset: Send + Sync {
    /// Returns the total number of rows in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset contains no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the schema of the dataset.
    fn schema(&self) -> SchemaRef;

    /// Returns an iterator over all RecordBatches in the dataset.
    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_>;

    /// Returns the number of batches in the dataset.
    fn num_batches(&self) -> usize;

    /// Returns a specific batch by index.
    fn get_batch(&self, index: usize) -> Option<&RecordBatch>;
}

/// An in-memory dataset backed by Arrow RecordBatches.
///
/// # Example
///
/// ```no_run
/// use bonifica::{ArrowDataset, Dataset};
///
/// let dataset = ArrowDataset::from_csv("data/titanic.csv").unwrap();
/// println!("{} rows x {} columns", dataset.len(), dataset.num_columns());
/// ```
#[derive(Debug, Clone)]
pub struct ArrowDataset {
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    row_count: usize,
}

impl ArrowDataset {
    /// Creates a new ArrowDataset from a vector of RecordBatches.
    ///
    /// Batches with zero rows are allowed; a dataset needs at least one
    /// batch only to know its schema.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The batches vector is empty
    /// - The batches have inconsistent schemas
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        if batches.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let schema = batches[0].schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema_mismatch(format!(
                    "Batch {} has different schema than batch 0",
                    i
                )));
            }
        }

        let row_count = batches.iter().map(|b| b.num_rows()).sum();

        Ok(Self {
            batches,
            schema,
            row_count,
        })
    }

    /// Creates an ArrowDataset from a single RecordBatch.
    ///
    /// # Errors
    ///
    /// Never fails for a single batch; the `Result` mirrors [`Self::new`].
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Creates a dataset with the given schema and zero rows.
    pub fn empty(schema: SchemaRef) -> Self {
        let batch = RecordBatch::new_empty(Arc::clone(&schema));
        Self {
            batches: vec![batch],
            schema,
            row_count: 0,
        }
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid CSV.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a dataset from a CSV file with options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::BufReader;

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        Self::from_csv_reader(BufReader::new(file), options)
    }

    /// Loads a dataset from a CSV string with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        Self::from_csv_bytes(data.as_bytes(), CsvOptions::default())
    }

    /// Loads a dataset from CSV bytes, e.g. a downloaded body.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not valid CSV.
    pub fn from_csv_bytes(data: &[u8], options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader(std::io::Cursor::new(data), options)
    }

    /// Loads a dataset from any seekable CSV reader.
    ///
    /// When no schema is supplied it is inferred first, then the reader is
    /// rewound and parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if inference, seeking or parsing fails.
    pub fn from_csv_reader<R: Read + Seek>(mut reader: R, options: CsvOptions) -> Result<Self> {
        use std::io::SeekFrom;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let schema = if let Some(schema) = options.schema {
            Arc::new(schema)
        } else {
            let mut format = Format::default().with_header(options.has_header);
            if let Some(delim) = options.delimiter {
                format = format.with_delimiter(delim);
            }
            let (inferred, _) = format
                .infer_schema(&mut reader, options.infer_records)
                .map_err(Error::Arrow)?;

            reader
                .seek(SeekFrom::Start(0))
                .map_err(Error::io_no_path)?;

            Arc::new(text_for_empty_columns(&inferred))
        };

        let mut builder = ReaderBuilder::new(Arc::clone(&schema))
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);

        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let csv_reader = builder.build(reader).map_err(Error::Arrow)?;

        let batches: Vec<RecordBatch> = csv_reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Arrow)?;

        if batches.is_empty() {
            // Header only: keep the columns, no rows.
            return Ok(Self::empty(schema));
        }

        Self::new(batches)
    }

    /// Saves the dataset to a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;
        self.write_csv(file)
    }

    /// Renders the dataset as CSV text with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| Error::Format(e.to_string()))
    }

    fn write_csv<W: std::io::Write>(&self, sink: W) -> Result<()> {
        use arrow_csv::WriterBuilder;

        let mut writer = WriterBuilder::new().with_header(true).build(sink);

        for batch in &self.batches {
            writer.write(batch).map_err(Error::Arrow)?;
        }

        Ok(())
    }

    /// Returns the underlying batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Consumes the dataset and returns the underlying batches.
    pub fn into_batches(self) -> Vec<RecordBatch> {
        self.batches
    }

    /// Concatenates all batches into one.
    ///
    /// # Errors
    ///
    /// Returns an error if Arrow fails to concatenate the columns.
    pub fn to_batch(&self) -> Result<RecordBatch> {
        if self.batches.len() == 1 {
            return Ok(self.batches[0].clone());
        }
        concat_batches(&self.schema, &self.batches).map_err(Error::Arrow)
    }

    /// Applies a transform to the whole table and returns a new dataset.
    ///
    /// Transforms see every row at once, so column statistics such as a
    /// mean are computed over the full dataset rather than per batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform fails.
    pub fn with_transform<T: Transform + ?Sized>(&self, transform: &T) -> Result<Self> {
        let batch = transform.apply(self.to_batch()?)?;
        Self::from_batch(batch)
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.num_columns())
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Returns true if the dataset has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.column_with_name(name).is_some()
    }

    /// Returns a column as a single contiguous array.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column does not exist.
    pub fn column(&self, name: &str) -> Result<ArrayRef> {
        let (idx, _) = self
            .schema
            .column_with_name(name)
            .ok_or_else(|| Error::column_not_found(name))?;

        if self.batches.len() == 1 {
            return Ok(Arc::clone(self.batches[0].column(idx)));
        }

        let parts: Vec<&dyn arrow::array::Array> =
            self.batches.iter().map(|b| b.column(idx).as_ref()).collect();
        arrow::compute::concat(&parts).map_err(Error::Arrow)
    }

    /// Returns the cells of a column in row order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column does not exist.
    pub fn values(&self, name: &str) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(self.row_count);
        let (idx, _) = self
            .schema
            .column_with_name(name)
            .ok_or_else(|| Error::column_not_found(name))?;
        for batch in &self.batches {
            out.extend(Value::column(batch.column(idx).as_ref()));
        }
        Ok(out)
    }

    /// Returns one row as cells in schema order, or `None` if out of bounds.
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        let (batch_idx, local_idx) = self.find_row(index)?;
        let batch = &self.batches[batch_idx];
        Some(
            batch
                .columns()
                .iter()
                .map(|col| Value::from_array(col.as_ref(), local_idx))
                .collect(),
        )
    }

    /// Number of missing cells in one column.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column does not exist.
    pub fn missing_in(&self, name: &str) -> Result<usize> {
        let (idx, _) = self
            .schema
            .column_with_name(name)
            .ok_or_else(|| Error::column_not_found(name))?;
        Ok(self
            .batches
            .iter()
            .map(|b| value::missing_count(b.column(idx).as_ref()))
            .sum())
    }

    /// Number of missing cells across the whole dataset.
    pub fn total_missing(&self) -> usize {
        self.batches
            .iter()
            .flat_map(|b| b.columns().iter())
            .map(|col| value::missing_count(col.as_ref()))
            .sum()
    }

    /// Finds the batch and local row index for a global row index.
    fn find_row(&self, global_index: usize) -> Option<(usize, usize)> {
        if global_index >= self.row_count {
            return None;
        }

        let mut remaining = global_index;
        for (batch_idx, batch) in self.batches.iter().enumerate() {
            let batch_rows = batch.num_rows();
            if remaining < batch_rows {
                return Some((batch_idx, remaining));
            }
            remaining -= batch_rows;
        }

        None
    }
}

impl Dataset for ArrowDataset {
    fn len(&self) -> usize {
        self.row_count
    }

    fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = RecordBatch> + Send + '_> {
        Box::new(self.batches.iter().cloned())
    }

    fn num_batches(&self) -> usize {
        self.batches.len()
    }

    fn get_batch(&self, index: usize) -> Option<&RecordBatch> {
        self.batches.get(index)
    }
}

/// Options for CSV parsing.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row.
    pub has_header: bool,
    /// Delimiter character (default is comma).
    pub delimiter: Option<u8>,
    /// Batch size for reading.
    pub batch_size: usize,
    /// Maximum records used for schema inference (`None` scans everything).
    pub infer_records: Option<usize>,
    /// Optional schema (inferred if not provided).
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            batch_size: 8192,
            infer_records: None,
            schema: None,
        }
    }
}

impl CsvOptions {
    /// Creates new CSV options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the file has a header row.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the delimiter character.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets the batch size for reading.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Limits schema inference to the first `records` rows.
    #[must_use]
    pub fn with_infer_records(mut self, records: usize) -> Self {
        self.infer_records = Some(records);
        self
    }

    /// Sets the schema for parsing.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Columns with no value in any inferred record come back as `Null` typed.
/// Read them as nullable text so every empty cell is a missing string.
fn text_for_empty_columns(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| match f.data_type() {
            DataType::Null => Field::new(f.name(), DataType::Utf8, true),
            _ => f.as_ref().clone(),
        })
        .collect();
    Schema::new_with_metadata(fields, schema.metadata().clone())
}
