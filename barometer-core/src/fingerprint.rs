//! Dataset fingerprinting with BLAKE3 over a raw table's cells.
//!
//! Lets a snapshot record exactly which workbook contents produced it, and
//! lets callers skip recomputation when a refresh returns identical data.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Cell, RawTable};

const UNIT_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash column names and every cell, tagged by cell type so that
/// `Number(1)` and `Text("1")` differ.
pub fn dataset_hash(table: &RawTable) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for column in table.columns() {
        hasher.update(column.as_bytes());
        hasher.update(&[UNIT_SEP]);
    }
    hasher.update(&[RECORD_SEP]);
    for row in table.rows() {
        for cell in row {
            let tag = match cell {
                Cell::Empty => b'e',
                Cell::Number(_) => b'n',
                Cell::Date(_) => b'd',
                Cell::Text(_) => b't',
            };
            hasher.update(&[tag]);
            hasher.update(cell.to_string().as_bytes());
            hasher.update(&[UNIT_SEP]);
        }
        hasher.update(&[RECORD_SEP]);
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cell: Cell) -> RawTable {
        RawTable::from_columns(vec![("PX_LAST", vec![cell])]).unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        let a = dataset_hash(&table(Cell::Number(1.0)));
        let b = dataset_hash(&table(Cell::Number(1.0)));
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn hash_distinguishes_cell_types() {
        let number = dataset_hash(&table(Cell::Number(1.0)));
        let text = dataset_hash(&table(Cell::text("1")));
        assert_ne!(number, text);
    }

    #[test]
    fn hash_changes_with_values() {
        assert_ne!(
            dataset_hash(&table(Cell::Number(1.0))),
            dataset_hash(&table(Cell::Number(2.0)))
        );
    }
}
