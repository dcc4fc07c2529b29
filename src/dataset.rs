//! Arrow-backed source datasets.
//!
//! [`ArrowDataset`] is the raw, typed form of a baseline or current dataset
//! as it comes off disk. It is converted into a [`crate::table::Table`]
//! before any comparison happens.

use std::{path::Path, sync::Arc};

use arrow::{array::RecordBatch, datatypes::SchemaRef};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    file::properties::WriterProperties,
};

use crate::error::{Error, Result};

/// Number of records sampled when inferring a CSV or JSON schema.
const SCHEMA_INFERENCE_RECORDS: usize = 1000;

/// An in-memory dataset backed by Arrow RecordBatches.
///
/// # Example
///
/// ```no_run
/// use derivar::ArrowDataset;
///
/// let dataset = ArrowDataset::from_csv("data/baseline.csv").unwrap();
/// println!("{} rows", dataset.len());
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
    /// # Errors
    ///
    /// Returns a schema error if:
    /// - The batches hold no rows
    /// - The batches have inconsistent schemas
    pub fn new(batches: Vec<RecordBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(Error::schema("dataset has no rows"));
        };
        let schema = first.schema();

        for (i, batch) in batches.iter().enumerate().skip(1) {
            if batch.schema() != schema {
                return Err(Error::schema(format!(
                    "batch {} has a different schema than batch 0",
                    i
                )));
            }
        }

        let row_count: usize = batches.iter().map(|b| b.num_rows()).sum();
        if row_count == 0 {
            return Err(Error::schema("dataset has no rows"));
        }

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
    /// Propagates [`ArrowDataset::new`] errors.
    pub fn from_batch(batch: RecordBatch) -> Result<Self> {
        Self::new(vec![batch])
    }

    /// Loads a dataset from a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid Parquet,
    /// or holds no rows.
    pub fn from_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let reader = builder.build()?;

        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Saves the dataset to a Parquet file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn to_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| Error::io(e, path))?;

        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, Arc::clone(&self.schema), Some(props))?;

        for batch in &self.batches {
            writer.write(batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Loads a dataset from a CSV file with a header row.
    ///
    /// Empty fields are read as nulls.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid CSV, or
    /// holds no rows.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Loads a dataset from a CSV file with options.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the file holds no rows.
    pub fn from_csv_with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        use std::io::{BufReader, Seek, SeekFrom};

        use arrow_csv::{reader::Format, ReaderBuilder};

        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let mut buf_reader = BufReader::new(file);

        let mut format = Format::default().with_header(options.has_header);
        if let Some(delim) = options.delimiter {
            format = format.with_delimiter(delim);
        }
        let (inferred, _) = format.infer_schema(&mut buf_reader, Some(SCHEMA_INFERENCE_RECORDS))?;

        buf_reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::io(e, path))?;

        let mut builder = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(options.batch_size)
            .with_header(options.has_header);

        if let Some(delim) = options.delimiter {
            builder = builder.with_delimiter(delim);
        }

        let reader = builder.build(buf_reader)?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Loads a dataset from a CSV string with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid CSV or holds no rows.
    pub fn from_csv_str(data: &str) -> Result<Self> {
        use std::io::Cursor;

        use arrow_csv::{reader::Format, ReaderBuilder};

        let mut cursor_for_infer = Cursor::new(data.as_bytes());
        let format = Format::default().with_header(true);
        let (inferred, _) =
            format.infer_schema(&mut cursor_for_infer, Some(SCHEMA_INFERENCE_RECORDS))?;

        let builder = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(CsvOptions::default().batch_size)
            .with_header(true);

        let reader = builder.build(Cursor::new(data.as_bytes()))?;
        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Loads a dataset from a JSON Lines (JSONL) file.
    ///
    /// Each line in the file should be a JSON object representing a row.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, parsed, or holds no
    /// rows.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        use std::io::BufReader;

        use arrow_json::ReaderBuilder;

        let path = path.as_ref();

        let infer_file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let (inferred, _) = arrow_json::reader::infer_json_schema(
            BufReader::new(infer_file),
            Some(SCHEMA_INFERENCE_RECORDS),
        )?;

        let file = std::fs::File::open(path).map_err(|e| Error::io(e, path))?;
        let reader = ReaderBuilder::new(Arc::new(inferred))
            .with_batch_size(CsvOptions::default().batch_size)
            .build(BufReader::new(file))?;

        let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<Vec<_>, _>>()?;

        Self::new(batches)
    }

    /// Returns the total number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Returns true if the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the schema of the dataset.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Returns the underlying batches.
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Returns the number of batches.
    pub fn num_batches(&self) -> usize {
        self.batches.len()
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
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: None,
            batch_size: 8192,
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
}
