//! Page/document assembly: selector, continuation and materializer applied
//! page by page, in document order.

use serde::Serialize;
use stmtx_core::{
    materialize_rows, select_table, ContinuationState, HeaderConflict, PageLayout, ParseConfig,
    RawTable, SourceType, TransactionRecord,
};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::source::{DocumentReader, TableExtractor};

/// What happened on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub page: usize,
    pub tables: usize,
    /// Index of the chosen table among `tables`.
    pub selected: Option<usize>,
    pub layout: Option<&'static str>,
    pub records: usize,
    pub degraded: bool,
    pub conflicts: Vec<HeaderConflict>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub records: Vec<TransactionRecord>,
    pub pages: Vec<PageReport>,
}

impl DocumentReport {
    pub fn degraded_records(&self) -> usize {
        self.records.iter().filter(|r| r.is_degraded()).count()
    }

    pub fn pages_without_table(&self) -> usize {
        self.pages.iter().filter(|p| p.selected.is_none()).count()
    }
}

/// Read one page's tables, threading the continuation state through.
pub fn read_page(
    state: ContinuationState,
    page: usize,
    tables: &[RawTable],
    source_type: SourceType,
    config: &ParseConfig,
) -> (ContinuationState, Vec<TransactionRecord>, PageReport) {
    let mut report = PageReport {
        page,
        tables: tables.len(),
        selected: None,
        layout: None,
        records: 0,
        degraded: false,
        conflicts: Vec::new(),
    };

    let Some(selection) = select_table(tables, config) else {
        debug!(page, tables = tables.len(), "page: no transaction table");
        return (state, Vec::new(), report);
    };
    let table = &tables[selection.index];
    report.selected = Some(selection.index);

    let (state, layout) = state.advance(table, config);
    report.layout = Some(layout.label());
    report.degraded = layout.confidence().is_degraded();
    if let PageLayout::Headed { conflicts, .. } | PageLayout::PartialHeader { conflicts, .. } = &layout {
        report.conflicts = conflicts.clone();
    }

    let Some(map) = layout.map() else {
        if report.degraded {
            warn!(page, layout = layout.label(), "page: rows skipped, no column map");
        }
        return (state, Vec::new(), report);
    };

    let skip = usize::from(layout.skips_first_row());
    let rows = table.rows().get(skip..).unwrap_or_default();
    let records = materialize_rows(
        rows,
        map,
        source_type,
        &layout.confidence(),
        &config.date_policy(),
    );
    report.records = records.len();
    if report.degraded {
        warn!(page, layout = layout.label(), rows = records.len(), "page: degraded-confidence rows");
    }
    debug!(page, table = selection.index, score = ?selection.score, records = records.len(), "page: read");

    (state, records, report)
}

/// Parse one document into records. Only an unreadable document is an
/// error; pages without a table just contribute nothing.
pub fn assemble_document<R, E>(
    bytes: &[u8],
    source_type: SourceType,
    reader: &R,
    extractor: &E,
    config: &ParseConfig,
) -> Result<DocumentReport, LoadError>
where
    R: DocumentReader,
    E: TableExtractor<R::Page>,
{
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }
    if !reader.sniff(bytes) {
        return Err(LoadError::WrongInputType(
            "content is not a supported statement format".to_string(),
        ));
    }

    let pages = reader.open(bytes)?;
    let mut state = ContinuationState::new();
    let mut records = Vec::new();
    let mut reports = Vec::with_capacity(pages.len());

    for (i, page) in pages.iter().enumerate() {
        let tables = extractor.extract(page);
        let (next, page_records, report) = read_page(state, i + 1, &tables, source_type, config);
        state = next;
        records.extend(page_records);
        reports.push(report);
    }

    info!(
        pages = reports.len(),
        records = records.len(),
        source_type = source_type.key(),
        "document: assembled"
    );
    Ok(DocumentReport { records, pages: reports })
}
