use serde::{Deserialize, Serialize};

use crate::values::{DateOrder, DatePolicy};

/// Tunables for table selection, value parsing and batch merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Tables with fewer rows (header included) are never candidates.
    pub min_rows: usize,
    /// Tables narrower than this are never candidates. Two-column layouts
    /// pass at the default.
    pub min_cols: usize,
    pub date_order: DateOrder,
    pub century_pivot: u32,
    /// Year applied to "DD/MM" cells that carry no year.
    pub fallback_year: Option<i32>,
    /// Use the Date/Description/Debit/Credit positional guess for header-less
    /// tables when no usable prior header exists.
    pub positional_fallback: bool,
    pub deduplicate: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_cols: 2,
            date_order: DateOrder::DayFirst,
            century_pivot: 69,
            fallback_year: None,
            positional_fallback: true,
            deduplicate: true,
        }
    }
}

impl ParseConfig {
    pub fn date_policy(&self) -> DatePolicy {
        DatePolicy {
            order: self.date_order,
            century_pivot: self.century_pivot,
            fallback_year: self.fallback_year,
        }
    }
}
