//! stmtx-core: bank-statement table normalization (header mapping, value
//! parsing, table selection, row materialization, page continuation).

pub mod config;
pub mod continuation;
pub mod header;
pub mod materialize;
pub mod normalize;
pub mod select;
pub mod types;
pub mod values;

pub use config::ParseConfig;
pub use continuation::{ContinuationState, PageLayout};
pub use header::{map_header, ColumnMap, HeaderConflict, HeaderMatch};
pub use materialize::{materialize_row, materialize_rows};
pub use normalize::{clean_text, normalize_cell};
pub use select::{select_table, Selection, TableScore};
pub use types::{
    CellValue, Confidence, DegradedReason, Field, RawRow, RawTable, RecordKey, SourceType,
    TransactionRecord,
};
pub use values::{parse_amount, parse_date, DateOrder, DatePolicy};
