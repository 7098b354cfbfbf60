//! Pick the transaction table among all tables found on a page.
//!
//! Ranking is lexicographic over `TableScore`: tables holding at least one
//! data-looking row come first, then the first-row signal decides, then the
//! number of data-looking rows, and only then raw size. A fee schedule with
//! header words but no transaction rows never beats a header-less table of
//! real transactions.

use tracing::debug;

use crate::config::ParseConfig;
use crate::header::map_header;
use crate::normalize::normalize_row;
use crate::types::{RawRow, RawTable};
use crate::values::{parse_amount, parse_date, DatePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowSignal {
    /// Neither a header nor a transaction row.
    Text,
    /// Parses as a date plus an amount.
    DataRow,
    /// At least two canonical header aliases.
    HeaderRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableScore {
    /// At least one row parses as a date plus an amount.
    pub has_data: bool,
    pub signal: RowSignal,
    pub data_rows: usize,
    pub rows: usize,
    pub cols: usize,
}

impl TableScore {
    pub fn is_plausible(&self) -> bool {
        self.signal > RowSignal::Text
    }
}

/// True if one cell is a date and a different cell is an amount.
pub fn row_looks_like_data(row: &RawRow, policy: &DatePolicy) -> bool {
    let date_col = row
        .iter()
        .position(|c| parse_date(c.as_deref(), policy).is_parsed());
    let Some(date_col) = date_col else {
        return false;
    };
    row.iter()
        .enumerate()
        .any(|(i, c)| i != date_col && parse_amount(c.as_deref()).is_parsed())
}

/// True if the row names at least two canonical columns.
pub fn row_looks_like_header(row: &RawRow) -> bool {
    map_header(&normalize_row(row)).map.len() >= 2
}

/// Mostly non-numeric cells. Weaker than `row_looks_like_header`; used to
/// describe tables, not to rank them.
pub fn row_is_text_like(row: &RawRow) -> bool {
    if row.is_empty() {
        return false;
    }
    let numeric = row
        .iter()
        .flatten()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit() || ".,- ".contains(ch)))
        .count();
    numeric <= row.len() / 2
}

/// Score one table, or `None` when it is too small to consider.
pub fn score_table(table: &RawTable, config: &ParseConfig) -> Option<TableScore> {
    let rows = table.row_count();
    let cols = table.width();
    if rows < config.min_rows || cols < config.min_cols {
        return None;
    }
    let policy = config.date_policy();
    let first = table.first_row()?;
    let signal = if row_looks_like_header(first) {
        RowSignal::HeaderRow
    } else if row_looks_like_data(first, &policy) {
        RowSignal::DataRow
    } else {
        RowSignal::Text
    };
    let data_rows = table
        .rows()
        .iter()
        .filter(|r| row_looks_like_data(r, &policy))
        .count();
    Some(TableScore {
        has_data: data_rows > 0,
        signal,
        data_rows,
        rows,
        cols,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub score: TableScore,
}

/// Best plausible table on the page; ties go to the earlier table.
pub fn select_table(tables: &[RawTable], config: &ParseConfig) -> Option<Selection> {
    let mut best: Option<Selection> = None;
    for (index, table) in tables.iter().enumerate() {
        let Some(score) = score_table(table, config) else {
            debug!(index, rows = table.row_count(), cols = table.width(), "select: table too small");
            continue;
        };
        if !score.is_plausible() {
            debug!(index, ?score, "select: table does not look like transactions");
            continue;
        }
        match best {
            Some(b) if b.score >= score => {}
            _ => best = Some(Selection { index, score }),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::from_cells(rows)
    }

    #[test]
    fn test_small_data_table_beats_large_text_table() {
        let terms = table(
            (0..30)
                .map(|_| vec!["Điều khoản", "Phí dịch vụ áp dụng", "Ghi chú", "Xem thêm"])
                .collect(),
        );
        let txns = table(vec![
            vec!["01/12/2025", "Payment A", "100,000"],
            vec!["02/12/2025", "Payment B", "200,000"],
        ]);
        let sel = select_table(&[terms, txns], &ParseConfig::default()).unwrap();
        assert_eq!(sel.index, 1);
        assert_eq!(sel.score.signal, RowSignal::DataRow);
    }

    #[test]
    fn test_header_table_outranks_data_table() {
        let data = table(vec![
            vec!["01/12/2025", "x", "1"],
            vec!["02/12/2025", "y", "2"],
            vec!["03/12/2025", "z", "3"],
        ]);
        let headed = table(vec![vec!["Date", "Description", "Debit"], vec!["01/12/2025", "a", "5"]]);
        let sel = select_table(&[data, headed], &ParseConfig::default()).unwrap();
        assert_eq!(sel.index, 1);
    }

    #[test]
    fn test_fee_schedule_with_header_words_loses_to_real_rows() {
        // "Phí" table names two columns but carries no transaction rows.
        let fees = table(
            std::iter::once(vec!["Nội dung", "Số tiền"])
                .chain((0..20).map(|_| vec!["Phí SMS", "11.000"]))
                .collect(),
        );
        let txns = table(vec![
            vec!["Ngày", "Diễn giải", "Ghi nợ"],
            vec!["01/12/2025", "Payment A", "100,000"],
        ]);
        let sel = select_table(&[fees, txns], &ParseConfig::default()).unwrap();
        assert_eq!(sel.index, 1);
    }

    #[test]
    fn test_header_only_fee_table_loses_to_headerless_rows() {
        let fees = table(vec![
            vec!["Nội dung", "Số tiền"],
            vec!["Phí SMS", "11.000"],
            vec!["Phí thường niên", "100.000"],
            vec!["Phí rút tiền", "3.300"],
        ]);
        let txns = table(vec![
            vec!["02/12/2025", "Payment 2", "200,000"],
            vec!["03/12/2025", "Payment 3", "300,000"],
        ]);
        let cfg = ParseConfig::default();
        let fee_score = score_table(&fees, &cfg).unwrap();
        assert_eq!(fee_score.signal, RowSignal::HeaderRow);
        assert!(!fee_score.has_data);

        let sel = select_table(&[fees.clone(), txns.clone()], &cfg).unwrap();
        assert_eq!(sel.index, 1);
        assert_eq!(sel.score.data_rows, 2);
        let sel = select_table(&[txns, fees], &cfg).unwrap();
        assert_eq!(sel.index, 0);
    }

    #[test]
    fn test_header_only_table_still_chosen_when_alone() {
        let fees = table(vec![vec!["Nội dung", "Số tiền"], vec!["Phí SMS", "11.000"]]);
        let sel = select_table(&[fees], &ParseConfig::default()).unwrap();
        assert_eq!(sel.score.signal, RowSignal::HeaderRow);
    }

    #[test]
    fn test_two_column_table_allowed_by_default() {
        let t = table(vec![vec!["Date", "Debit"], vec!["01/12/2025", "100,000"]]);
        assert!(select_table(std::slice::from_ref(&t), &ParseConfig::default()).is_some());

        let strict = ParseConfig { min_cols: 3, ..ParseConfig::default() };
        assert!(select_table(&[t], &strict).is_none());
    }

    #[test]
    fn test_nothing_plausible() {
        let t = table(vec![vec!["Col1", "Col2"], vec!["Data1", "Data2"]]);
        assert!(select_table(&[t], &ParseConfig::default()).is_none());
        assert!(select_table(&[], &ParseConfig::default()).is_none());
        let one_row = table(vec![vec!["Date", "Description", "Debit"]]);
        assert!(select_table(&[one_row], &ParseConfig::default()).is_none());
    }

    #[test]
    fn test_row_predicates() {
        let policy = DatePolicy::default();
        let data: RawRow = vec![Some("01/12/2025".into()), Some("Payment".into()), Some("100,000".into())];
        assert!(row_looks_like_data(&data, &policy));
        let date_only: RawRow = vec![Some("01/12/2025".into()), Some("Payment".into())];
        assert!(!row_looks_like_data(&date_only, &policy));

        let header: RawRow = vec![Some("Date".into()), Some("Description".into()), Some("Amount".into())];
        assert!(row_looks_like_header(&header));
        assert!(row_is_text_like(&header));
        let numbers: RawRow = vec![Some("1".into()), Some("2".into()), Some("3".into()), Some("4".into())];
        assert!(!row_is_text_like(&numbers));
        assert!(!row_is_text_like(&Vec::new()));
    }
}
