//! Polars conversion of signal output, for Parquet export.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::Path;

use super::ingest::DataError;
use crate::signal::SignalSeries;

pub const FWD_SHARPE_COLUMN: &str = "FWD_SHARPE";

/// `DATE`, `<ticker>` (price), `FWD_SHARPE`: the chart columns.
pub fn signal_frame(series: &SignalSeries) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| DataError::ParquetError("invalid epoch".into()))?;
    let dates: Vec<i32> = series
        .points
        .iter()
        .map(|p| (p.date - epoch).num_days() as i32)
        .collect();
    let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
    let sharpe: Vec<Option<f64>> = series.points.iter().map(|p| p.forward_sharpe).collect();

    DataFrame::new(vec![
        Column::new("DATE".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new(series.index.ticker().into(), prices),
        Column::new(FWD_SHARPE_COLUMN.into(), sharpe),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

/// Write the chart columns to a Parquet file.
pub fn write_parquet(series: &SignalSeries, path: &Path) -> Result<(), DataError> {
    let mut df = signal_frame(series)?;
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{read_parquet, Cell};
    use crate::signal::{IndexKind, SignalPoint};

    fn series() -> SignalSeries {
        SignalSeries {
            index: IndexKind::Spx,
            points: vec![
                SignalPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    price: 4700.0,
                    forward_sharpe: Some(0.42),
                },
                SignalPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    price: 4710.0,
                    forward_sharpe: None,
                },
            ],
        }
    }

    #[test]
    fn frame_has_chart_columns() {
        let df = signal_frame(&series()).unwrap();
        assert_eq!(df.height(), 2);
        assert!(df.column("DATE").is_ok());
        assert!(df.column("SPX").is_ok());
        assert_eq!(df.column(FWD_SHARPE_COLUMN).unwrap().null_count(), 1);
    }

    #[test]
    fn parquet_roundtrip_through_raw_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spx.parquet");
        write_parquet(&series(), &path).unwrap();

        let table = read_parquet(&path).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(
            table.cell(0, "DATE"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()))
        );
        assert_eq!(table.cell(1, "FWD_SHARPE"), Some(&Cell::Empty));
    }
}
