//! Turn raw data rows into `TransactionRecord`s through a `ColumnMap`.

use crate::header::ColumnMap;
use crate::normalize::clean_text;
use crate::types::{CellValue, Confidence, DegradedReason, Field, RawRow, SourceType, TransactionRecord};
use crate::values::{parse_amount, parse_date, DatePolicy};

fn cell<'a>(row: &'a RawRow, map: &ColumnMap, field: Field) -> Option<&'a str> {
    let idx = map.get(field)?;
    row.get(idx)?.as_deref()
}

fn is_blank(row: &RawRow) -> bool {
    row.iter().flatten().all(|c| c.trim().is_empty())
}

/// Build one record from one row. A row shorter than a mapped index leaves
/// that field `Absent`; nothing here fails.
pub fn materialize_row(
    row: &RawRow,
    map: &ColumnMap,
    source_type: SourceType,
    confidence: &Confidence,
    policy: &DatePolicy,
) -> TransactionRecord {
    let mut confidence = confidence.clone();
    if map.has_generic_amount() {
        confidence = confidence.degrade(DegradedReason::AmbiguousAmountColumn);
    }

    let amount = |field| {
        if map.contains(field) {
            parse_amount(cell(row, map, field))
        } else {
            CellValue::Absent
        }
    };

    TransactionRecord {
        date: parse_date(cell(row, map, Field::Date), policy),
        description: clean_text(cell(row, map, Field::Description)),
        remitter: clean_text(cell(row, map, Field::Remitter)),
        debit: amount(Field::Debit),
        credit: amount(Field::Credit),
        source_type,
        confidence,
    }
}

/// Materialize every non-blank row. `rows` must already exclude the header.
pub fn materialize_rows(
    rows: &[RawRow],
    map: &ColumnMap,
    source_type: SourceType,
    confidence: &Confidence,
    policy: &DatePolicy,
) -> Vec<TransactionRecord> {
    rows.iter()
        .filter(|r| !is_blank(r))
        .map(|r| materialize_row(r, map, source_type, confidence, policy))
        .collect()
}
