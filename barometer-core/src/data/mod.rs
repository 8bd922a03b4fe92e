//! Raw data model, ingest, and synthetic generation

pub mod fields;
pub mod frame;
pub mod ingest;
pub mod synthetic;
pub mod table;

pub use fields::FieldMap;
pub use frame::{signal_frame, write_parquet};
pub use ingest::{read_csv, read_parquet, read_table, DataError};
pub use synthetic::{previous_business_day, synthetic_table, SyntheticSpec};
pub use table::{Cell, RawTable};
