//! Batch loading: every uploaded statement through the document assembler,
//! merged in upload order, failures collected per document.

use std::collections::HashSet;

use serde::Serialize;
use stmtx_core::{ParseConfig, SourceType, TransactionRecord};
use tracing::{info, warn};

use crate::auto::AutoReader;
use crate::document::{assemble_document, DocumentReport};
use crate::error::FailureKind;
use crate::source::{DocumentReader, TableExtractor};

/// One uploaded statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Identifier shown in failure reports (usually the file name).
    pub name: String,
    pub bytes: Vec<u8>,
    pub source_type: SourceType,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, source_type: SourceType) -> Self {
        Self { name: name.into(), bytes, source_type }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Position in the upload order.
    pub index: usize,
    pub document: String,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(DocumentReport),
    Failed(LoadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub index: usize,
    pub document: String,
    pub source_type: SourceType,
    pub records: usize,
    pub degraded: usize,
    pub pages: usize,
    pub pages_without_table: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResult {
    /// Upload order, then page order, then row order.
    pub records: Vec<TransactionRecord>,
    pub failures: Vec<LoadFailure>,
    pub documents: Vec<DocumentSummary>,
    pub duplicates_removed: usize,
}

impl BatchResult {
    pub fn loaded_count(&self) -> usize {
        self.documents.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn degraded_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_degraded()).count()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} document(s) loaded, {} failed, {} duplicate row(s) removed, {} degraded row(s)",
            self.loaded_count(),
            self.failed_count(),
            self.duplicates_removed,
            self.degraded_count()
        )
    }
}

/// Exact duplicates (same date, description, remitter, debit, credit and
/// source type) after the first are dropped. The input is left untouched.
pub fn dedup_records(records: &[TransactionRecord]) -> (Vec<TransactionRecord>, usize) {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        if seen.insert(r.key()) {
            out.push(r.clone());
        }
    }
    let removed = records.len() - out.len();
    (out, removed)
}

pub struct BatchLoader<R, E> {
    reader: R,
    extractor: E,
    config: ParseConfig,
}

impl BatchLoader<AutoReader, AutoReader> {
    /// PDF and JSON table dumps, picked by content.
    pub fn auto(config: ParseConfig) -> Self {
        Self::new(AutoReader, AutoReader, config)
    }
}

impl<R, E> BatchLoader<R, E>
where
    R: DocumentReader,
    E: TableExtractor<R::Page>,
{
    pub fn new(reader: R, extractor: E, config: ParseConfig) -> Self {
        Self { reader, extractor, config }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Load one document. A document that reads fine but yields no rows is
    /// reported as `EmptyResult`, never as a silent success.
    pub fn load_document(&self, index: usize, doc: &SourceDocument) -> LoadOutcome {
        let fail = |kind: FailureKind, reason: String| {
            warn!(index, document = %doc.name, kind = kind.label(), %reason, "batch: document failed");
            LoadOutcome::Failed(LoadFailure {
                index,
                document: doc.name.clone(),
                kind,
                reason,
            })
        };

        match assemble_document(&doc.bytes, doc.source_type, &self.reader, &self.extractor, &self.config) {
            Err(e) => fail(e.kind(), e.to_string()),
            Ok(report) if report.records.is_empty() => fail(
                FailureKind::EmptyResult,
                format!(
                    "no transaction rows found ({} page(s), {} without a transaction table)",
                    report.pages.len(),
                    report.pages_without_table()
                ),
            ),
            Ok(report) => LoadOutcome::Loaded(report),
        }
    }

    /// Load every document in order. One document's failure never stops the
    /// rest of the batch.
    pub fn load_batch<I>(&self, documents: I) -> BatchResult
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut merged = Vec::new();
        let mut result = BatchResult::default();

        for (index, doc) in documents.into_iter().enumerate() {
            match self.load_document(index, &doc) {
                LoadOutcome::Loaded(report) => {
                    result.documents.push(DocumentSummary {
                        index,
                        document: doc.name.clone(),
                        source_type: doc.source_type,
                        records: report.records.len(),
                        degraded: report.degraded_records(),
                        pages: report.pages.len(),
                        pages_without_table: report.pages_without_table(),
                    });
                    merged.extend(report.records);
                }
                LoadOutcome::Failed(failure) => result.failures.push(failure),
            }
        }

        if self.config.deduplicate {
            let (records, removed) = dedup_records(&merged);
            result.records = records;
            result.duplicates_removed = removed;
        } else {
            result.records = merged;
        }

        info!(
            loaded = result.loaded_count(),
            failed = result.failed_count(),
            records = result.records.len(),
            duplicates = result.duplicates_removed,
            "batch: done"
        );
        result
    }
}

/// Load statements with the content-sniffing backend and default settings.
pub fn load_batch<I>(documents: I) -> BatchResult
where
    I: IntoIterator<Item = SourceDocument>,
{
    BatchLoader::auto(ParseConfig::default()).load_batch(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stmtx_core::{CellValue, Confidence};

    fn rec(desc: &str, source_type: SourceType) -> TransactionRecord {
        TransactionRecord {
            date: CellValue::Absent,
            description: desc.to_string(),
            remitter: String::new(),
            debit: CellValue::Absent,
            credit: CellValue::Absent,
            source_type,
            confidence: Confidence::Verified,
        }
    }

    #[test]
    fn test_dedup_keeps_first_and_counts() {
        let input = vec![
            rec("a", SourceType::Checking),
            rec("b", SourceType::Checking),
            rec("a", SourceType::Checking),
            rec("a", SourceType::CreditCard),
        ];
        let (out, removed) = dedup_records(&input);
        assert_eq!(removed, 1);
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].source_type, SourceType::CreditCard);
        assert_eq!(input.len(), 4);
    }

    #[test]
    fn test_dedup_ignores_confidence() {
        let mut degraded = rec("a", SourceType::Checking);
        degraded.confidence = Confidence::Verified.degrade(stmtx_core::DegradedReason::LayoutUnknown);
        let (out, removed) = dedup_records(&[rec("a", SourceType::Checking), degraded]);
        assert_eq!(out.len(), 1);
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_empty_batch() {
        let result = load_batch(Vec::new());
        assert!(result.records.is_empty());
        assert!(result.failures.is_empty());
        assert_eq!(result.summary_line(), "0 document(s) loaded, 0 failed, 0 duplicate row(s) removed, 0 degraded row(s)");
    }
}
