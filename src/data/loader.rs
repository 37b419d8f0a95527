use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Catalog, Frame, ObservedPoint, TrainingSet};

/// Column holding the independent variable in every input table.
pub const X_COLUMN: &str = "x";
/// Column holding observed values in the test table.
pub const TEST_Y_COLUMN: &str = "y";

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// The three input tables of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub training: Frame,
    pub ideal: Frame,
    pub test: Frame,
}

impl Dataset {
    pub fn training_set(&self) -> Result<TrainingSet> {
        self.training.to_series_set().context("training data")
    }

    pub fn catalog(&self) -> Result<Catalog> {
        self.ideal.to_series_set().context("ideal functions")
    }

    /// Test observations in row order.
    pub fn points(&self) -> Result<Vec<ObservedPoint>> {
        self.test
            .to_points(TEST_Y_COLUMN)
            .context("test data")?
            .with_context(|| format!("test table missing '{TEST_Y_COLUMN}' column"))
    }
}

/// Anything able to hand over the training, ideal and test tables.
pub trait DataSource {
    /// Human-readable origin, for logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Dataset>;
}

/// Reads the three tables from individual files.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSource {
    pub train: PathBuf,
    pub ideal: PathBuf,
    pub test: PathBuf,
}

impl FileSource {
    pub fn new(train: impl Into<PathBuf>, ideal: impl Into<PathBuf>, test: impl Into<PathBuf>) -> Self {
        FileSource {
            train: train.into(),
            ideal: ideal.into(),
            test: test.into(),
        }
    }

    /// `train.csv`, `ideal.csv` and `test.csv` inside `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(dir.join("train.csv"), dir.join("ideal.csv"), dir.join("test.csv"))
    }
}

impl DataSource for FileSource {
    fn describe(&self) -> String {
        format!(
            "train={}, ideal={}, test={}",
            self.train.display(),
            self.ideal.display(),
            self.test.display()
        )
    }

    fn load(&self) -> Result<Dataset> {
        let training = load_frame(&self.train)
            .with_context(|| format!("loading training data from {}", self.train.display()))?;
        ensure!(
            training.has_unique_x(),
            "training data {} has duplicate x values",
            self.train.display()
        );

        let ideal = load_frame(&self.ideal)
            .with_context(|| format!("loading ideal functions from {}", self.ideal.display()))?;
        ensure!(
            ideal.has_unique_x(),
            "ideal functions {} have duplicate x values",
            self.ideal.display()
        );

        let test = load_frame(&self.test)
            .with_context(|| format!("loading test data from {}", self.test.display()))?;
        ensure!(
            test.column(TEST_Y_COLUMN).is_some(),
            "test data {} has no '{TEST_Y_COLUMN}' column",
            self.test.display()
        );

        log::info!(
            "Loaded {} training series, {} ideal functions ({} samples each), {} test points",
            training.columns.len(),
            ideal.columns.len(),
            ideal.len(),
            test.len()
        );

        Ok(Dataset {
            training,
            ideal,
            test,
        })
    }
}

// ---------------------------------------------------------------------------
// Frame loading, dispatched by extension
// ---------------------------------------------------------------------------

/// Load a wide table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row `x,y1,y2,...`, one sample per row
/// * `.json`    – `[{ "x": 1.0, "y1": 2.0, ... }, ...]`
/// * `.parquet` – one numeric column per series, plus `x`
pub fn load_frame(path: &Path) -> Result<Frame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Split named columns into the frame's `x` and value columns.
fn into_frame(mut columns: Vec<(String, Vec<f64>)>) -> Result<Frame> {
    for (i, (name, _)) in columns.iter().enumerate() {
        if columns[..i].iter().any(|(other, _)| other == name) {
            bail!("duplicate column '{name}'");
        }
    }
    let x_idx = columns
        .iter()
        .position(|(name, _)| name == X_COLUMN)
        .with_context(|| format!("missing '{X_COLUMN}' column"))?;
    let (_, x) = columns.remove(x_idx);
    Ok(Frame { x, columns })
}

fn finite(value: f64, row: usize, col: &str) -> Result<f64> {
    ensure!(value.is_finite(), "Row {row}, column '{col}': {value} is not finite");
    Ok(value)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Frame> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<(String, Vec<f64>)> =
        headers.iter().map(|h| (h.clone(), Vec::new())).collect();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        ensure!(
            record.len() == headers.len(),
            "CSV row {row_no}: expected {} fields, found {}",
            headers.len(),
            record.len()
        );
        for (cell, (name, values)) in record.iter().zip(columns.iter_mut()) {
            let value = cell
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Row {row_no}, column '{name}': '{cell}' is not a number"))?;
            values.push(finite(value, row_no, name)?);
        }
    }

    into_frame(columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records orientation, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "x": -20.0, "y1": 39.78, "y2": -40.78 },
///   ...
/// ]
/// ```
///
/// Column order follows the keys of the first record.
fn load_json(path: &Path) -> Result<Frame> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<(String, Vec<f64>)> = match records.first() {
        Some(first) => first
            .as_object()
            .context("Row 0 is not a JSON object")?
            .keys()
            .map(|k| (k.clone(), Vec::with_capacity(records.len())))
            .collect(),
        None => vec![(X_COLUMN.to_string(), Vec::new())],
    };

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        ensure!(
            obj.len() == columns.len(),
            "Row {i}: expected {} fields, found {}",
            columns.len(),
            obj.len()
        );
        for (name, values) in columns.iter_mut() {
            let value = obj
                .get(name.as_str())
                .and_then(JsonValue::as_f64)
                .with_context(|| format!("Row {i}: missing or non-numeric '{name}'"))?;
            values.push(finite(value, i, name)?);
        }
    }

    into_frame(columns)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat numeric column per series.
///
/// Float64, Float32, Int64 and Int32 columns are accepted; nulls are rejected.
fn load_parquet(path: &Path) -> Result<Frame> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let mut columns: Vec<(String, Vec<f64>)> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut row_offset = 0;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, (name, values)) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            extend_f64(array, values, row_offset, name)?;
        }
        row_offset += batch.num_rows();
    }

    into_frame(columns)
}

/// Append a numeric Arrow column to `out` as `f64`.
fn extend_f64(col: &Arc<dyn Array>, out: &mut Vec<f64>, row_offset: usize, name: &str) -> Result<()> {
    if col.null_count() > 0 {
        bail!("column '{name}' contains nulls");
    }

    let values: Vec<f64> = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .values()
            .to_vec(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .values()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        other => bail!("column '{name}' has type {other:?}, expected a numeric column"),
    };

    for (i, v) in values.into_iter().enumerate() {
        out.push(finite(v, row_offset + i, name)?);
    }
    Ok(())
}
