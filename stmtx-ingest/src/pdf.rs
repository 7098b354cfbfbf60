//! PDF backend: page text via `pdf-extract`, tables recovered from the
//! column layout of that text.
//!
//! Expected page text (columns separated by runs of spaces):
//!   Ngày giao dịch     Đối tác        Diễn giải              Nợ TKTT      Có TKTT
//!   01/12/2025         Partner A      Payment 1              100,000

use std::panic;
use std::sync::OnceLock;

use regex::Regex;
use stmtx_core::{RawRow, RawTable};
use tracing::debug;

use crate::error::LoadError;
use crate::source::{DocumentReader, TableExtractor};

const PDF_MAGIC: &[u8] = b"%PDF-";
/// The header may be preceded by junk; readers look this far.
const MAGIC_WINDOW: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPage {
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextReader;

pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_WINDOW)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Split extracted text into pages on form feed.
pub fn split_pages(text: &str) -> Vec<TextPage> {
    text.split('\u{000C}')
        .enumerate()
        .map(|(i, t)| TextPage { number: i + 1, text: t.to_string() })
        .collect()
}

impl DocumentReader for PdfTextReader {
    type Page = TextPage;

    fn sniff(&self, bytes: &[u8]) -> bool {
        has_pdf_magic(bytes)
    }

    fn open(&self, bytes: &[u8]) -> Result<Vec<TextPage>, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        // pdf-extract panics on some malformed files
        let text = match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(LoadError::Unreadable(e.to_string())),
            Err(_) => return Err(LoadError::Unreadable("PDF text extraction aborted".to_string())),
        };
        let pages = split_pages(&text);
        debug!(pages = pages.len(), chars = text.len(), "pdf: text extracted");
        Ok(pages)
    }
}

fn column_gap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t|\s{2,}").expect("column gap regex"))
}

/// Cells of one text line, split on tabs or runs of two or more spaces.
pub fn split_columns(line: &str) -> RawRow {
    column_gap_re()
        .split(line.trim())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| Some(c.to_string()))
        .collect()
}

/// Groups consecutive multi-column lines into tables. A line with fewer
/// than two cells ends the current table.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutTableExtractor;

impl TableExtractor<TextPage> for LayoutTableExtractor {
    fn extract(&self, page: &TextPage) -> Vec<RawTable> {
        let mut tables = Vec::new();
        let mut current: Vec<RawRow> = Vec::new();

        for line in page.text.lines() {
            let cells = split_columns(line);
            if cells.len() >= 2 {
                current.push(cells);
            } else if !current.is_empty() {
                tables.push(RawTable::new(std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            tables.push(RawTable::new(current));
        }

        debug!(page = page.number, tables = tables.len(), "pdf: layout tables");
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_detection() {
        assert!(has_pdf_magic(b"%PDF-1.7\n..."));
        assert!(has_pdf_magic(b"\r\n  %PDF-1.4"));
        assert!(!has_pdf_magic(b"hello"));
        assert!(!has_pdf_magic(b""));
    }

    #[test]
    fn test_empty_and_garbage_pdf() {
        assert_eq!(PdfTextReader.open(b""), Err(LoadError::Empty));
        assert!(matches!(
            PdfTextReader.open(b"%PDF-1.4 this is not really a pdf"),
            Err(LoadError::Unreadable(_))
        ));
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("page one\u{000C}page two");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[1].text, "page two");
    }

    #[test]
    fn test_split_columns() {
        let row = split_columns("  01/12/2025    Partner A   Payment 1\t100,000  ");
        let cells: Vec<_> = row.iter().map(|c| c.as_deref().unwrap()).collect();
        assert_eq!(cells, vec!["01/12/2025", "Partner A", "Payment 1", "100,000"]);
    }

    #[test]
    fn test_layout_tables_split_on_prose() {
        let page = TextPage {
            number: 1,
            text: "\
SAO KÊ TÀI KHOẢN
Ngày        Diễn giải        Ghi nợ
01/12/2025  Payment A        100,000
02/12/2025  Payment B        200,000

Trang 1/2
Phí         Mức
SMS         11.000
"
            .to_string(),
        };
        let tables = LayoutTableExtractor.extract(&page);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].row_count(), 3);
        assert_eq!(tables[0].width(), 3);
        assert_eq!(tables[1].row_count(), 2);
    }
}
