//! Writing merged records out as CSV or JSON.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Write;
use stmtx_core::{CellValue, Confidence, TransactionRecord};
use stmtx_ingest::{BatchResult, DocumentSummary, LoadFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Flat CSV view of one record. Unparseable cells leave their column empty
/// and show the raw text under `unparsed`.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    remitter: &'a str,
    debit: String,
    credit: String,
    source_type: &'static str,
    confidence: String,
    unparsed: String,
}

fn cell_text<T: Display>(cell: &CellValue<T>) -> String {
    cell.value().map(ToString::to_string).unwrap_or_default()
}

fn confidence_text(confidence: &Confidence) -> String {
    match confidence {
        Confidence::Verified => "verified".to_string(),
        Confidence::Degraded(reasons) => {
            let labels: Vec<&str> = reasons.iter().map(|r| r.label()).collect();
            format!("degraded:{}", labels.join("+"))
        }
    }
}

fn raw_text<T>(cell: &CellValue<T>) -> Option<&str> {
    match cell {
        CellValue::Unparseable(raw) => Some(raw),
        _ => None,
    }
}

fn unparsed_text(r: &TransactionRecord) -> String {
    [
        ("date", raw_text(&r.date)),
        ("debit", raw_text(&r.debit)),
        ("credit", raw_text(&r.credit)),
    ]
    .into_iter()
    .filter_map(|(name, raw)| raw.map(|raw| format!("{name}={raw}")))
    .collect::<Vec<_>>()
    .join("; ")
}

pub fn write_csv<W: Write>(records: &[TransactionRecord], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for r in records {
        wtr.serialize(CsvRow {
            date: cell_text(&r.date),
            description: &r.description,
            remitter: &r.remitter,
            debit: cell_text(&r.debit),
            credit: cell_text(&r.credit),
            source_type: r.source_type.key(),
            confidence: confidence_text(&r.confidence),
            unparsed: unparsed_text(r),
        })
        .context("write csv row")?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    summary: String,
    documents: &'a [DocumentSummary],
    failures: &'a [LoadFailure],
    duplicates_removed: usize,
    records: &'a [TransactionRecord],
}

pub fn write_json<W: Write>(result: &BatchResult, out: W) -> Result<()> {
    let doc = JsonExport {
        summary: result.summary_line(),
        documents: &result.documents,
        failures: &result.failures,
        duplicates_removed: result.duplicates_removed,
        records: &result.records,
    };
    serde_json::to_writer_pretty(out, &doc).context("write json")?;
    Ok(())
}

pub fn write_result<W: Write>(result: &BatchResult, format: ExportFormat, out: W) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(&result.records, out),
        ExportFormat::Json => write_json(result, out),
    }
}
