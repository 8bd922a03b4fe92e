//! Series cleaner: raw workbook table → ascending, gap-free observations.
//!
//! Steps, in order:
//! 1. Project the date column and the seven mapped numeric columns.
//! 2. Forward-fill empty cells in arrival order.
//! 3. Reverse the rows when the table arrives newest-first.
//! 4. Repair the pending-refresh date on the second-to-last row.
//! 5. Coerce dates and numbers; placeholders and other text become missing.
//! 6. Drop rows that are still incomplete, then stable-sort by date.
//!
//! The input table is never modified.

use tracing::debug;

use super::series::{CleanSeries, Observation};
use super::SignalError;
use crate::data::{previous_business_day, Cell, FieldMap, RawTable};

/// Clean one index's raw table.
pub fn clean(raw: &RawTable, fields: &FieldMap) -> Result<CleanSeries, SignalError> {
    let mut indices = Vec::with_capacity(8);
    indices.push(
        raw.column_index(&fields.date)
            .ok_or_else(|| SignalError::MissingColumn(fields.date.clone()))?,
    );
    for name in fields.numeric_columns() {
        indices.push(
            raw.column_index(name)
                .ok_or_else(|| SignalError::MissingColumn(name.to_string()))?,
        );
    }

    let mut rows: Vec<Vec<Cell>> = raw
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    forward_fill(&mut rows);

    if is_newest_first(&rows) {
        rows.reverse();
    }

    repair_pending_date(&mut rows);

    let total = rows.len();
    let mut observations: Vec<Observation> = rows.iter().filter_map(|r| coerce_row(r)).collect();
    observations.sort_by_key(|obs| obs.date);

    debug!(
        rows = total,
        kept = observations.len(),
        dropped = total - observations.len(),
        "cleaned raw table"
    );

    Ok(CleanSeries::from_sorted(observations))
}

/// Replace each empty cell with the last non-empty value above it.
fn forward_fill(rows: &mut [Vec<Cell>]) {
    let width = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut last: Vec<Option<Cell>> = vec![None; width];
    for row in rows.iter_mut() {
        for (cell, seen) in row.iter_mut().zip(last.iter_mut()) {
            if cell.is_empty() {
                if let Some(prev) = seen {
                    *cell = prev.clone();
                }
            } else {
                *seen = Some(cell.clone());
            }
        }
    }
}

fn is_newest_first(rows: &[Vec<Cell>]) -> bool {
    let first = rows.iter().find_map(|r| r[0].as_date());
    let last = rows.iter().rev().find_map(|r| r[0].as_date());
    matches!((first, last), (Some(f), Some(l)) if f > l)
}

/// Pending-refresh artifact: when only the second-to-last row's date is a
/// placeholder, it becomes the business day before the last row's date.
fn repair_pending_date(rows: &mut [Vec<Cell>]) {
    let n = rows.len();
    if n < 2 || !rows[n - 2][0].is_placeholder() {
        return;
    }
    if let Some(last) = rows[n - 1][0].as_date() {
        let repaired = previous_business_day(last);
        debug!(%repaired, "repaired pending-refresh date");
        rows[n - 2][0] = Cell::Date(repaired);
    }
}

fn coerce_row(row: &[Cell]) -> Option<Observation> {
    let date = row[0].as_date()?;
    let mut values = [0.0; 7];
    for (slot, cell) in values.iter_mut().zip(&row[1..]) {
        *slot = cell.as_number()?;
    }
    Some(Observation::from_values(date, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(date: Cell, price: f64) -> Vec<Cell> {
        vec![
            date,
            Cell::Number(price),
            Cell::Number(50.0),
            Cell::Number(10.0),
            Cell::Number(4.0),
            Cell::Number(4.2),
            Cell::Number(2.0),
            Cell::Number(15.0),
        ]
    }

    fn table(rows: Vec<Vec<Cell>>) -> RawTable {
        let fields = FieldMap::default();
        let mut columns = vec![fields.date.clone()];
        columns.extend(fields.numeric_columns().iter().map(|c| c.to_string()));
        let mut t = RawTable::new(columns);
        for r in rows {
            t.push_row(r).unwrap();
        }
        t
    }

    #[test]
    fn newest_first_is_reversed() {
        let raw = table(vec![
            row(Cell::Date(date(2024, 1, 4)), 103.0),
            row(Cell::Date(date(2024, 1, 3)), 102.0),
            row(Cell::Date(date(2024, 1, 2)), 101.0),
        ]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        let prices: Vec<f64> = clean.observations().iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn missing_date_column_is_an_error() {
        let raw = RawTable::from_columns(vec![("PX_LAST", vec![Cell::Number(1.0)])]).unwrap();
        let err = clean(&raw, &FieldMap::default()).unwrap_err();
        assert!(matches!(err, SignalError::MissingColumn(ref c) if c == "DATE"));
    }

    #[test]
    fn missing_numeric_column_is_an_error() {
        let raw = RawTable::from_columns(vec![
            ("DATE", vec![Cell::Date(date(2024, 1, 2))]),
            ("PX_LAST", vec![Cell::Number(1.0)]),
        ])
        .unwrap();
        let err = clean(&raw, &FieldMap::default()).unwrap_err();
        assert!(matches!(err, SignalError::MissingColumn(ref c) if c == "DVD_PAYOUT_RATIO"));
    }

    #[test]
    fn placeholder_values_drop_the_row() {
        let mut pending = row(Cell::Date(date(2024, 1, 3)), 102.0);
        pending[3] = Cell::text("#N/A N/A");
        let raw = table(vec![row(Cell::Date(date(2024, 1, 2)), 101.0), pending]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.observations()[0].date, date(2024, 1, 2));
    }

    #[test]
    fn infinite_values_drop_the_row() {
        let mut text_inf = row(Cell::Date(date(2024, 1, 3)), 102.0);
        text_inf[7] = Cell::text("inf");
        let mut number_inf = row(Cell::Date(date(2024, 1, 4)), 103.0);
        number_inf[4] = Cell::Number(f64::NEG_INFINITY);
        let raw = table(vec![
            row(Cell::Date(date(2024, 1, 2)), 101.0),
            text_inf,
            number_inf,
            row(Cell::Date(date(2024, 1, 5)), 104.0),
        ]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        let dates: Vec<NaiveDate> = clean.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 5)]);
        assert!(clean.observations().iter().all(|o| o.values().iter().all(|v| v.is_finite())));
    }

    #[test]
    fn excel_serial_dates_are_converted() {
        // 45293 = 2024-01-02, 45294 = 2024-01-03 (1899-12-30 epoch).
        let raw = table(vec![
            row(Cell::Number(45294.0), 102.0),
            row(Cell::from_text(Some("45293")), 101.0),
        ]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        let dates: Vec<NaiveDate> = clean.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(clean.observations()[0].price, 101.0);
    }

    #[test]
    fn empty_cells_are_forward_filled_in_arrival_order() {
        let mut gap = row(Cell::Date(date(2024, 1, 3)), 102.0);
        gap[2] = Cell::Empty;
        let mut first = row(Cell::Date(date(2024, 1, 2)), 101.0);
        first[2] = Cell::Number(42.0);
        let raw = table(vec![first, gap]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        assert_eq!(clean.len(), 2);
        assert_eq!(clean.observations()[1].payout_ratio, 42.0);
    }

    #[test]
    fn pending_date_on_second_to_last_row_is_repaired() {
        // 2024-06-03 is a Monday; the repaired date is Friday 2024-05-31.
        let raw = table(vec![
            row(Cell::Date(date(2024, 5, 30)), 100.0),
            row(Cell::text("#N/A Requesting Data..."), 101.0),
            row(Cell::Date(date(2024, 6, 3)), 102.0),
        ]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        let dates: Vec<NaiveDate> = clean.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![date(2024, 5, 30), date(2024, 5, 31), date(2024, 6, 3)]);
        assert_eq!(clean.observations()[1].price, 101.0);
    }

    #[test]
    fn pending_date_elsewhere_is_dropped() {
        let raw = table(vec![
            row(Cell::text("#N/A Requesting Data..."), 100.0),
            row(Cell::Date(date(2024, 6, 3)), 101.0),
            row(Cell::Date(date(2024, 6, 4)), 102.0),
        ]);
        let clean = clean(&raw, &FieldMap::default()).unwrap();
        assert_eq!(clean.len(), 2);
    }

    #[test]
    fn input_table_is_not_mutated() {
        let raw = table(vec![
            row(Cell::Date(date(2024, 1, 3)), 102.0),
            row(Cell::text("#N/A Requesting Data..."), 101.0),
            row(Cell::Date(date(2024, 1, 5)), 103.0),
        ]);
        let before = raw.clone();
        let _ = clean(&raw, &FieldMap::default()).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let fields = FieldMap::default();
        let raw = table(vec![
            row(Cell::Date(date(2024, 1, 4)), 103.0),
            row(Cell::text("#N/A Requesting Data..."), 102.0),
            row(Cell::Date(date(2024, 1, 2)), 101.0),
        ]);
        let once = clean(&raw, &fields).unwrap();
        let twice = clean(&once.to_raw_table(&fields), &fields).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let mut raw = table(vec![row(Cell::Date(date(2024, 1, 2)), 101.0)]);
        let mut columns = raw.columns().to_vec();
        columns.push("COMMENT".into());
        let mut widened = RawTable::new(columns);
        for r in raw.rows() {
            let mut r = r.clone();
            r.push(Cell::text("n/a"));
            widened.push_row(r).unwrap();
        }
        raw = widened;
        assert_eq!(clean(&raw, &FieldMap::default()).unwrap().len(), 1);
    }
}
