//! `stmtx inspect`: how the pipeline sees one statement, page by page.

use anyhow::{bail, Result};
use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use stmtx_core::normalize::normalize_row;
use stmtx_core::select::{row_is_text_like, score_table};
use stmtx_core::{
    map_header, ColumnMap, ContinuationState, ParseConfig, RawTable, SourceType, TransactionRecord,
};
use stmtx_ingest::{read_page, AutoReader, DocumentReader, LoadError, TableExtractor};

pub fn describe_map(map: &ColumnMap) -> String {
    if map.is_empty() {
        return "-".to_string();
    }
    let mut parts: Vec<String> = map.iter().map(|(f, i)| format!("{}@{}", f.name(), i)).collect();
    if map.has_generic_amount() {
        parts.push("(generic amount)".to_string());
    }
    parts.join(" ")
}

fn describe_table(index: usize, table: &RawTable, chosen: Option<usize>, config: &ParseConfig) -> String {
    let header = table
        .first_row()
        .map(|row| map_header(&normalize_row(row)).map)
        .unwrap_or_default();
    let score = score_table(table, config)
        .map(|s| format!("{:?}/{} data", s.signal, s.data_rows))
        .unwrap_or_else(|| "too small".to_string());
    let marker = if chosen == Some(index) { "*" } else { " " };
    let text_like = table.first_row().is_some_and(row_is_text_like);
    format!(
        "  {marker} table {index}: {}x{} [{score}] header: {}{}",
        table.row_count(),
        table.width(),
        describe_map(&header),
        if text_like && header.is_empty() { " (text)" } else { "" }
    )
}

/// Transactions per calendar month, plus the count with no usable date.
pub fn monthly_counts(records: &[TransactionRecord]) -> (BTreeMap<(i32, u32), usize>, usize) {
    let mut months = BTreeMap::new();
    let mut undated = 0;
    for r in records {
        match r.date() {
            Some(d) => *months.entry((d.year(), d.month())).or_insert(0) += 1,
            None => undated += 1,
        }
    }
    (months, undated)
}

pub fn run_inspect(bytes: &[u8], name: &str, source_type: SourceType, config: &ParseConfig) -> Result<()> {
    let reader = AutoReader;
    if bytes.is_empty() {
        bail!("{name}: {}", LoadError::Empty);
    }
    if !reader.sniff(bytes) {
        bail!("{name}: not a PDF or JSON table dump");
    }
    let pages = match reader.open(bytes) {
        Ok(p) => p,
        Err(e) => bail!("{name}: {e}"),
    };

    println!("# {name} ({}, {} page(s))\n", source_type.key(), pages.len());

    let mut state = ContinuationState::new();
    let mut records = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        let tables = reader.extract(page);
        let (next, page_records, report) = read_page(state, i + 1, &tables, source_type, config);
        state = next;

        println!(
            "page {}: {} table(s), layout {}, {} record(s){}{}",
            report.page,
            report.tables,
            report.layout.unwrap_or("none"),
            report.records,
            if report.degraded { " [degraded]" } else { "" },
            if state.has_complete_map() { "" } else { " [no header carried]" }
        );
        for (index, table) in tables.iter().enumerate() {
            println!("{}", describe_table(index, table, report.selected, config));
        }
        for c in &report.conflicts {
            println!(
                "    conflict: {} kept column {}, ignored column {}",
                c.field.name(),
                c.kept,
                c.rejected
            );
        }
        records.extend(page_records);
    }

    let degraded = records.iter().filter(|r| r.is_degraded()).count();
    let debit: Decimal = records.iter().map(|r| r.debit.amount_or_zero()).sum();
    let credit: Decimal = records.iter().map(|r| r.credit.amount_or_zero()).sum();
    println!(
        "\n{} record(s), {} degraded, debit total {debit}, credit total {credit}",
        records.len(),
        degraded
    );

    let (months, undated) = monthly_counts(&records);
    if !months.is_empty() || undated > 0 {
        println!("\n## Transactions per month\n");
        for ((year, month), count) in &months {
            println!("{year}-{month:02}  {count}");
        }
        if undated > 0 {
            println!("undated   {undated}");
        }
    }
    Ok(())
}
