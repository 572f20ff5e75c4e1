use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellRecord, RawRow};
use crate::error::SortError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and validate a cell batch from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header `num,v0,res_st,res_lt` (extra columns ignored)
/// * `.json`    – `[{ "num": 1, "v0": 3.61, "res_st": 0.021, "res_lt": 0.034 }, ...]`
/// * `.parquet` – columns `num`, `v0`, `res_st`, `res_lt`
///
/// Nothing is returned unless every row passes [`validate`].
pub fn load_file(path: &Path) -> Result<Vec<CellRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let cells = validate(&rows)?;
    info!("loaded {} cells from {}", cells.len(), path.display());
    Ok(cells)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Turn raw rows into cell records, rejecting the whole batch on any
/// non-positive id, non-finite reading or repeated id.
///
/// Rows are reported 1-based, counting data rows only.
pub fn validate(rows: &[RawRow]) -> std::result::Result<Vec<CellRecord>, SortError> {
    let mut seen: BTreeMap<i64, usize> = BTreeMap::new();

    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        if row.num <= 0 {
            return Err(SortError::InvalidId {
                row: row_no,
                id: row.num,
            });
        }
        for (field, value) in [("v0", row.v0), ("res_st", row.res_st), ("res_lt", row.res_lt)] {
            if !value.is_finite() {
                return Err(SortError::NonFiniteReading {
                    row: row_no,
                    id: row.num,
                    field,
                });
            }
        }
        *seen.entry(row.num).or_default() += 1;
    }

    let duplicates: Vec<i64> = seen
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(id, _)| id)
        .collect();
    if !duplicates.is_empty() {
        return Err(SortError::DuplicateIds { ids: duplicates });
    }

    Ok(rows.iter().copied().map(CellRecord::from).collect())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for col in ["num", "v0", "res_st", "res_lt"] {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    reader
        .deserialize()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {}", row_no + 1)))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing JSON (expected an array of cell objects)")
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema: `num` Int32/Int64 and `v0`, `res_st`, `res_lt`
/// Float32/Float64. Nulls are rejected.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let num = column(&batch, "num")?;
        let v0 = column(&batch, "v0")?;
        let res_st = column(&batch, "res_st")?;
        let res_lt = column(&batch, "res_lt")?;

        for row in 0..batch.num_rows() {
            let row_no = rows.len() + 1;
            rows.push(RawRow {
                num: extract_i64(num, row).with_context(|| format!("Row {row_no}: 'num'"))?,
                v0: extract_f64(v0, row).with_context(|| format!("Row {row_no}: 'v0'"))?,
                res_st: extract_f64(res_st, row)
                    .with_context(|| format!("Row {row_no}: 'res_st'"))?,
                res_lt: extract_f64(res_lt, row)
                    .with_context(|| format!("Row {row_no}: 'res_lt'"))?,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_i64(col: &ArrayRef, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn extract_f64(col: &ArrayRef, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.value(row) as f64)
        }
        other => bail!("expected a float column, got {other:?}"),
    }
}
