//! Column names of the raw observation table.

use serde::{Deserialize, Serialize};

/// Maps each semantic field of the signal pipeline to a spreadsheet column.
///
/// Defaults are the Bloomberg field mnemonics used by the barometer workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub date: String,
    pub price: String,
    pub payout_ratio: String,
    pub roe: String,
    pub dividend_current: String,
    pub dividend_next: String,
    pub reference_rate: String,
    pub volatility: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            date: "DATE".into(),
            price: "PX_LAST".into(),
            payout_ratio: "DVD_PAYOUT_RATIO".into(),
            roe: "BEST_ROE".into(),
            dividend_current: "IDX_EST_DVD_CURR_YR".into(),
            dividend_next: "IDX_EST_DVD_NXT_YR".into(),
            reference_rate: "USGG12M".into(),
            volatility: "VOLATILITY_360D".into(),
        }
    }
}

impl FieldMap {
    /// The seven numeric columns, in `Observation` field order.
    pub fn numeric_columns(&self) -> [&str; 7] {
        [
            &self.price,
            &self.payout_ratio,
            &self.roe,
            &self.dividend_current,
            &self.dividend_next,
            &self.reference_rate,
            &self.volatility,
        ]
    }

    /// Same map with a different reference-rate column.
    pub fn with_reference_rate(&self, column: impl Into<String>) -> Self {
        Self {
            reference_rate: column.into(),
            ..self.clone()
        }
    }
}
