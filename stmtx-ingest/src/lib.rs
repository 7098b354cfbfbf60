//! stmtx-ingest: statement documents to merged transaction records
//! (document readers, page table extraction, batch loading).

pub mod auto;
pub mod batch;
pub mod document;
pub mod dump;
pub mod error;
pub mod pdf;
pub mod source;

pub use auto::{AnyPage, AutoReader};
pub use batch::{
    dedup_records, load_batch, BatchLoader, BatchResult, DocumentSummary, LoadFailure,
    LoadOutcome, SourceDocument,
};
pub use document::{assemble_document, read_page, DocumentReport, PageReport};
pub use dump::{DumpPage, TableDumpReader};
pub use error::{FailureKind, LoadError};
pub use pdf::{LayoutTableExtractor, PdfTextReader, TextPage};
pub use source::{DocumentReader, TableExtractor};
