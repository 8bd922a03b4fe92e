//! Typed observation rows shared by the cleaner and the smoother.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::{Cell, FieldMap, RawTable};

/// One dated row of the seven numeric inputs. NaN marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub price: f64,
    pub payout_ratio: f64,
    pub roe: f64,
    pub dividend_current: f64,
    pub dividend_next: f64,
    pub reference_rate: f64,
    pub volatility: f64,
}

impl Observation {
    /// Build from values in `FieldMap::numeric_columns` order.
    pub fn from_values(date: NaiveDate, v: [f64; 7]) -> Self {
        Self {
            date,
            price: v[0],
            payout_ratio: v[1],
            roe: v[2],
            dividend_current: v[3],
            dividend_next: v[4],
            reference_rate: v[5],
            volatility: v[6],
        }
    }

    pub fn values(&self) -> [f64; 7] {
        [
            self.price,
            self.payout_ratio,
            self.roe,
            self.dividend_current,
            self.dividend_next,
            self.reference_rate,
            self.volatility,
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.values().iter().all(|v| !v.is_nan())
    }
}

/// Ascending, gap-free observations produced by `signal::clean`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleanSeries {
    observations: Vec<Observation>,
}

impl CleanSeries {
    /// Only `clean` constructs these; callers get the invariant for free.
    pub(crate) fn from_sorted(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Render back into a raw table under the given column names.
    pub fn to_raw_table(&self, fields: &FieldMap) -> RawTable {
        let mut columns = vec![fields.date.clone()];
        columns.extend(fields.numeric_columns().iter().map(|c| c.to_string()));
        let mut table = RawTable::new(columns);
        for obs in &self.observations {
            let mut row = Vec::with_capacity(8);
            row.push(Cell::Date(obs.date));
            row.extend(obs.values().into_iter().map(Cell::Number));
            // Width is fixed at eight, matching the header.
            let _ = table.push_row(row);
        }
        table
    }
}
