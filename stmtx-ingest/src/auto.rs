//! Content-sniffing backend: PDF bytes go through the text layout
//! extractor, JSON bytes through the table-dump reader.

use stmtx_core::RawTable;

use crate::dump::{DumpPage, TableDumpReader};
use crate::error::LoadError;
use crate::pdf::{LayoutTableExtractor, PdfTextReader, TextPage};
use crate::source::{DocumentReader, TableExtractor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyPage {
    Text(TextPage),
    Dump(DumpPage),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReader;

impl DocumentReader for AutoReader {
    type Page = AnyPage;

    fn sniff(&self, bytes: &[u8]) -> bool {
        PdfTextReader.sniff(bytes) || TableDumpReader.sniff(bytes)
    }

    fn open(&self, bytes: &[u8]) -> Result<Vec<AnyPage>, LoadError> {
        if PdfTextReader.sniff(bytes) {
            Ok(PdfTextReader.open(bytes)?.into_iter().map(AnyPage::Text).collect())
        } else if TableDumpReader.sniff(bytes) {
            Ok(TableDumpReader.open(bytes)?.into_iter().map(AnyPage::Dump).collect())
        } else if bytes.is_empty() {
            Err(LoadError::Empty)
        } else {
            Err(LoadError::WrongInputType(
                "expected a PDF or a JSON table dump".to_string(),
            ))
        }
    }
}

impl TableExtractor<AnyPage> for AutoReader {
    fn extract(&self, page: &AnyPage) -> Vec<RawTable> {
        match page {
            AnyPage::Text(p) => LayoutTableExtractor.extract(p),
            AnyPage::Dump(p) => TableDumpReader.extract(p),
        }
    }
}
