//! Raw observation table: the spreadsheet as it arrives.
//!
//! A `RawTable` keeps named columns and rows of loosely typed cells in
//! arrival order. Nothing here interprets the financial meaning of a column;
//! that happens in `signal::clean` through a `FieldMap`.

use chrono::{Duration, NaiveDate};
use std::fmt;

use super::ingest::DataError;

/// Substring that marks an upstream "not available / still refreshing" token,
/// e.g. `#N/A Requesting Data...` or `#N/A N/A`.
pub const PLACEHOLDER_SIGNATURE: &str = "N/A";

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl Cell {
    /// Type a piece of cell text: number, then date, then free text.
    pub fn from_text(text: Option<&str>) -> Self {
        let Some(raw) = text else {
            return Cell::Empty;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return Cell::Number(value);
        }
        if let Some(date) = parse_date(trimmed) {
            return Cell::Date(date);
        }
        Cell::Text(trimmed.to_string())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// True for textual tokens carrying the `N/A` signature.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Cell::Text(t) if t.contains(PLACEHOLDER_SIGNATURE))
    }

    /// Numeric coercion. Anything that is not a finite number is missing.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(t) => t.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Date(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Date coercion. Numbers are read as Excel serial dates.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(t) => parse_date(t),
            Cell::Number(v) => excel_serial_to_date(*v),
            Cell::Empty => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(t) => f.write_str(t),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse the date formats a spreadsheet export commonly produces.
///
/// Timestamps (`2024-01-02 00:00:00`, `2024-01-02T00:00:00.000`) are truncated
/// to their date part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    if text.len() > 10 && text.is_char_boundary(10) {
        let (head, tail) = text.split_at(10);
        if tail.starts_with(' ') || tail.starts_with('T') {
            return NaiveDate::parse_from_str(head, "%Y-%m-%d").ok();
        }
    }
    None
}

/// Excel stores dates as days since 1899-12-30.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// A table of raw cells with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table column by column. All columns must have the same length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<Cell>)>) -> Result<Self, DataError> {
        let height = columns.first().map(|(_, cells)| cells.len()).unwrap_or(0);
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            let name = name.into();
            if cells.len() != height {
                return Err(DataError::ShapeMismatch(format!(
                    "column '{name}' has {} cells, expected {height}",
                    cells.len()
                )));
            }
            names.push(name);
            data.push(cells);
        }

        let mut rows: Vec<Vec<Cell>> = (0..height)
            .map(|_| Vec::with_capacity(names.len()))
            .collect();
        for cells in data {
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        Ok(Self {
            columns: names,
            rows,
        })
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::ShapeMismatch(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}
