//! Result table persistence.
//!
//! A [`Sink`] receives named tables and stores them, replacing any earlier
//! table with the same name.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::model::{ColumnData, Table};

pub const TRAIN_TABLE: &str = "train_data";
pub const IDEAL_TABLE: &str = "ideal_functions";
pub const TEST_TABLE: &str = "test_data";
pub const MAPPED_TABLE: &str = "mapped_test_data";

/// Failures while writing a result table.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write table '{table}': {source}")]
    Io {
        table: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write table '{table}' as CSV: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to build Arrow batch for table '{table}': {source}")]
    Arrow {
        table: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("failed to write table '{table}' as Parquet: {source}")]
    Parquet {
        table: String,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("table '{table}' has columns of different lengths")]
    Ragged { table: String },
}

/// Destination for result tables.
pub trait Sink {
    fn write_table(&mut self, name: &str, table: &Table) -> Result<(), PersistenceError>;
}

/// On-disk format of a directory sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
    /// Do not persist anything.
    None,
}

/// Build the sink for `format` writing into `dir`, or `None` when persistence is off.
pub fn sink_for(format: OutputFormat, dir: &Path) -> Option<Box<dyn Sink>> {
    match format {
        OutputFormat::Csv => Some(Box::new(CsvSink::new(dir))),
        OutputFormat::Parquet => Some(Box::new(ParquetSink::new(dir))),
        OutputFormat::None => None,
    }
}

fn prepare(dir: &Path, name: &str, table: &Table, ext: &str) -> Result<PathBuf, PersistenceError> {
    if !table.is_rectangular() {
        return Err(PersistenceError::Ragged {
            table: name.to_string(),
        });
    }
    std::fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        table: name.to_string(),
        source,
    })?;
    Ok(dir.join(format!("{name}.{ext}")))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Writes each table to `<dir>/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvSink { dir: dir.into() }
    }
}

impl Sink for CsvSink {
    fn write_table(&mut self, name: &str, table: &Table) -> Result<(), PersistenceError> {
        let path = prepare(&self.dir, name, table, "csv")?;
        let csv_err = |source| PersistenceError::Csv {
            table: name.to_string(),
            source,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(csv_err)?;
        writer
            .write_record(table.columns.iter().map(|c| c.name.as_str()))
            .map_err(csv_err)?;
        for row in 0..table.num_rows() {
            let record: Vec<String> = table
                .columns
                .iter()
                .map(|c| c.data.cell(row).unwrap_or_default())
                .collect();
            writer.write_record(&record).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| PersistenceError::Io {
            table: name.to_string(),
            source,
        })?;

        log::info!("Wrote {} rows to {}", table.num_rows(), path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Writes each table to `<dir>/<name>.parquet`.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    dir: PathBuf,
}

impl ParquetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ParquetSink { dir: dir.into() }
    }
}

/// Convert a [`Table`] into a single Arrow record batch.
pub fn to_record_batch(table: &Table) -> Result<RecordBatch, arrow::error::ArrowError> {
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        match &column.data {
            ColumnData::Float(values) => {
                fields.push(Field::new(&column.name, DataType::Float64, false));
                arrays.push(Arc::new(Float64Array::from(values.clone())));
            }
            ColumnData::Text(values) => {
                fields.push(Field::new(&column.name, DataType::Utf8, false));
                arrays.push(Arc::new(StringArray::from(
                    values.iter().map(String::as_str).collect::<Vec<_>>(),
                )));
            }
        }
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
}

impl Sink for ParquetSink {
    fn write_table(&mut self, name: &str, table: &Table) -> Result<(), PersistenceError> {
        let path = prepare(&self.dir, name, table, "parquet")?;
        let parquet_err = |source| PersistenceError::Parquet {
            table: name.to_string(),
            source,
        };

        let batch = to_record_batch(table).map_err(|source| PersistenceError::Arrow {
            table: name.to_string(),
            source,
        })?;
        let file = File::create(&path).map_err(|source| PersistenceError::Io {
            table: name.to_string(),
            source,
        })?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).map_err(parquet_err)?;
        writer.write(&batch).map_err(parquet_err)?;
        writer.close().map_err(parquet_err)?;

        log::info!("Wrote {} rows to {}", table.num_rows(), path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Keeps tables in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: BTreeMap<String, Table>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl Sink for MemorySink {
    fn write_table(&mut self, name: &str, table: &Table) -> Result<(), PersistenceError> {
        if !table.is_rectangular() {
            return Err(PersistenceError::Ragged {
                table: name.to_string(),
            });
        }
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }
}
