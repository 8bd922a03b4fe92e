//! Spreadsheet export ingest (CSV and Parquet) into `RawTable`.
//!
//! Every column is read as text and typed cell by cell, so a column that
//! mixes numbers with `#N/A` tokens survives ingest intact and the cleaner
//! gets to decide what the placeholders mean.

use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::table::{Cell, RawTable};

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Parquet I/O error: {0}")]
    ParquetError(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
}

/// Read a CSV export with a header row.
pub fn read_csv(path: &Path) -> Result<RawTable, DataError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))?
        .finish()
        .map_err(|e| DataError::IngestFailed(format!("{}: {e}", path.display())))?;
    dataframe_to_table(&df)
}

/// Read a Parquet export.
pub fn read_parquet(path: &Path) -> Result<RawTable, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;
    dataframe_to_table(&df)
}

/// Dispatch on file extension.
pub fn read_table(path: &Path) -> Result<RawTable, DataError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_csv(path),
        Some("parquet") => read_parquet(path),
        other => Err(DataError::UnsupportedFormat(format!(
            "{} (extension {:?})",
            path.display(),
            other
        ))),
    }
}

/// Convert any DataFrame into a `RawTable` by stringifying each column.
pub fn dataframe_to_table(df: &DataFrame) -> Result<RawTable, DataError> {
    let height = df.height();
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows: Vec<Vec<Cell>> = (0..height)
        .map(|_| Vec::with_capacity(names.len()))
        .collect();

    for column in df.get_columns() {
        let as_text = column
            .cast(&DataType::String)
            .map_err(|e| DataError::IngestFailed(format!("cast '{}': {e}", column.name())))?;
        let values = as_text
            .str()
            .map_err(|e| DataError::IngestFailed(format!("read '{}': {e}", column.name())))?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            row.push(Cell::from_text(value));
        }
    }

    let mut table = RawTable::new(names);
    for row in rows {
        table.push_row(row)?;
    }
    Ok(table)
}
