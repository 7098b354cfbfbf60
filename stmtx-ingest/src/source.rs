//! Seams to the external page capabilities: opening a document into pages
//! and finding candidate tables on a page.

use stmtx_core::RawTable;

use crate::error::LoadError;

pub trait DocumentReader {
    type Page;

    /// Cheap content check run before `open`. A `false` here is reported as
    /// a wrong input type rather than a corrupt document.
    fn sniff(&self, bytes: &[u8]) -> bool;

    fn open(&self, bytes: &[u8]) -> Result<Vec<Self::Page>, LoadError>;
}

pub trait TableExtractor<P> {
    /// Zero or more tables found on `page`. Never fails; a page without
    /// tables gives an empty vec.
    fn extract(&self, page: &P) -> Vec<RawTable>;
}
