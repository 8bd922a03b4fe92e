//! Export: CSV, JSON and Parquet artifacts for a snapshot.
//!
//! `snapshot.json` carries a `schema_version`; versions newer than this build
//! understands are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use barometer_core::data::write_parquet;
use barometer_core::SignalSeries;

use crate::report::generate_report;
use crate::snapshot::{Snapshot, SCHEMA_VERSION};

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot to JSON")
}

pub fn import_json(json: &str) -> Result<Snapshot> {
    let snapshot: Snapshot =
        serde_json::from_str(json).context("failed to deserialize snapshot from JSON")?;
    if snapshot.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            snapshot.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(snapshot)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: date, price, forward_sharpe (blank where undefined).
pub fn export_signal_csv(series: &SignalSeries) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "price", "forward_sharpe"])?;
    for p in &series.points {
        wtr.write_record([
            p.date.to_string(),
            format!("{:.4}", p.price),
            p.forward_sharpe
                .map(|v| format!("{v:.6}"))
                .unwrap_or_default(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write a snapshot as a directory `snapshot_{timestamp}/` under `output_dir`:
/// - `snapshot.json`
/// - `report.md`
/// - `{model}/{INDEX}_signal.csv` and `{model}/{INDEX}_signal.parquet`
///
/// Returns the created directory.
pub fn save_artifacts(snapshot: &Snapshot, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "snapshot_{}",
        snapshot.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("snapshot.json"), export_json(snapshot)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(snapshot))?;

    for (key, output) in &snapshot.models {
        let model_dir = run_dir.join(key);
        std::fs::create_dir_all(&model_dir)
            .with_context(|| format!("failed to create {}", model_dir.display()))?;
        for (index, series) in &output.results.series {
            let stem = format!("{}_signal", index.ticker());
            std::fs::write(
                model_dir.join(format!("{stem}.csv")),
                export_signal_csv(series)?,
            )?;
            let parquet = model_dir.join(format!("{stem}.parquet"));
            write_parquet(series, &parquet)
                .with_context(|| format!("failed to write {}", parquet.display()))?;
        }
    }

    Ok(run_dir)
}

/// Load the snapshot from an artifact directory's `snapshot.json`.
pub fn load_snapshot(dir: &Path) -> Result<Snapshot> {
    let path = dir.join("snapshot.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barometer_core::{IndexKind, SignalPoint};
    use chrono::NaiveDate;

    #[test]
    fn csv_leaves_undefined_blank() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let series = SignalSeries {
            index: IndexKind::Spx,
            points: vec![
                SignalPoint {
                    date: d,
                    price: 5100.5,
                    forward_sharpe: Some(0.25),
                },
                SignalPoint {
                    date: d.succ_opt().unwrap(),
                    price: 5120.0,
                    forward_sharpe: None,
                },
            ],
        };
        let csv = export_signal_csv(&series).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,price,forward_sharpe");
        assert_eq!(lines[1], "2024-03-01,5100.5000,0.250000");
        assert_eq!(lines[2], "2024-03-02,5120.0000,");
    }

    #[test]
    fn newer_schema_rejected() {
        let mut snapshot = Snapshot::new(chrono::Utc::now());
        snapshot.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&snapshot).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }
}
