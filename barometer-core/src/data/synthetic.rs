//! Synthetic raw tables for demos and tests.
//!
//! Output mimics the workbook export: newest row first, business days only,
//! and (optionally) the pending-refresh artifact where the second-newest row
//! carries `#N/A Requesting Data...` instead of a date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::fields::FieldMap;
use super::table::{Cell, RawTable};

pub const PENDING_REFRESH_TOKEN: &str = "#N/A Requesting Data...";

/// Parameters for a synthetic index history.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub rows: usize,
    pub end: NaiveDate,
    pub start_price: f64,
    pub payout_ratio: f64,
    pub roe: f64,
    pub dividend_yield: f64,
    pub reference_rate: f64,
    pub volatility: f64,
    pub seed: u64,
    pub pending_refresh: bool,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            rows: 300,
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            start_price: 4000.0,
            payout_ratio: 40.0,
            roe: 18.0,
            dividend_yield: 0.015,
            reference_rate: 4.5,
            volatility: 16.0,
            seed: 42,
            pending_refresh: true,
        }
    }
}

/// Previous weekday (Mon-Fri) strictly before `date`.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut d = date - Duration::days(1);
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d -= Duration::days(1);
    }
    d
}

/// Generate a newest-first table using the given column names.
pub fn synthetic_table(spec: &SyntheticSpec, fields: &FieldMap) -> RawTable {
    let mut rng = StdRng::seed_from_u64(spec.seed);

    // Walk backwards from `end` to collect business days, then build oldest→newest.
    let mut dates = Vec::with_capacity(spec.rows);
    let mut d = spec.end;
    while matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
        d -= Duration::days(1);
    }
    for _ in 0..spec.rows {
        dates.push(d);
        d = previous_business_day(d);
    }
    dates.reverse();

    let mut price = spec.start_price;
    let mut rows = Vec::with_capacity(spec.rows);
    for date in &dates {
        price *= 1.0 + rng.gen_range(-0.012..0.0125);
        let dividend_current = price * spec.dividend_yield * rng.gen_range(0.98..1.02);
        let dividend_next = dividend_current * rng.gen_range(1.03..1.08);
        rows.push(vec![
            Cell::Date(*date),
            Cell::Number(price),
            Cell::Number(spec.payout_ratio + rng.gen_range(-2.0..2.0)),
            Cell::Number(spec.roe + rng.gen_range(-0.5..0.5)),
            Cell::Number(dividend_current),
            Cell::Number(dividend_next),
            Cell::Number(spec.reference_rate + rng.gen_range(-0.1..0.1)),
            Cell::Number(spec.volatility + rng.gen_range(-1.5..1.5)),
        ]);
    }
    rows.reverse();

    if spec.pending_refresh && rows.len() >= 2 {
        rows[1][0] = Cell::text(PENDING_REFRESH_TOKEN);
    }

    let mut columns = vec![fields.date.clone()];
    columns.extend(fields.numeric_columns().iter().map(|c| c.to_string()));
    let mut table = RawTable::new(columns);
    for row in rows {
        // Widths always match: one date + seven numeric cells.
        let _ = table.push_row(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_business_day_skips_weekend() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let friday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(previous_business_day(monday), friday);
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(
            previous_business_day(wednesday),
            NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()
        );
    }

    #[test]
    fn synthetic_table_is_newest_first_with_pending_row() {
        let spec = SyntheticSpec {
            rows: 50,
            ..Default::default()
        };
        let table = synthetic_table(&spec, &FieldMap::default());

        assert_eq!(table.height(), 50);
        assert_eq!(table.columns().len(), 8);
        assert!(table.cell(1, "DATE").unwrap().is_placeholder());
        let newest = table.cell(0, "DATE").unwrap().as_date().unwrap();
        let third = table.cell(2, "DATE").unwrap().as_date().unwrap();
        assert!(newest > third);
    }

    #[test]
    fn synthetic_table_is_deterministic() {
        let spec = SyntheticSpec::default();
        let a = synthetic_table(&spec, &FieldMap::default());
        let b = synthetic_table(&spec, &FieldMap::default());
        assert_eq!(a, b);
    }
}
