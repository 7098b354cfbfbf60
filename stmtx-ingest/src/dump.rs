//! JSON table dumps: tables already extracted by an outside tool.
//!
//! Accepted shapes:
//!   [[table, ...], ...]                  pages -> tables
//!   {"pages": [[table, ...], ...]}
//! where a table is an array of rows and a row an array of `string | null`.

use serde::Deserialize;
use stmtx_core::RawTable;
use tracing::debug;

use crate::error::LoadError;
use crate::source::{DocumentReader, TableExtractor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPage {
    pub number: usize,
    pub tables: Vec<RawTable>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableDump {
    Pages(Vec<Vec<RawTable>>),
    Document { pages: Vec<Vec<RawTable>> },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableDumpReader;

pub fn looks_like_json(bytes: &[u8]) -> bool {
    matches!(
        bytes.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'[') | Some(b'{')
    )
}

impl DocumentReader for TableDumpReader {
    type Page = DumpPage;

    fn sniff(&self, bytes: &[u8]) -> bool {
        looks_like_json(bytes)
    }

    fn open(&self, bytes: &[u8]) -> Result<Vec<DumpPage>, LoadError> {
        if bytes.is_empty() {
            return Err(LoadError::Empty);
        }
        let dump: TableDump = serde_json::from_slice(bytes)
            .map_err(|e| LoadError::Unreadable(format!("table dump: {e}")))?;
        let pages = match dump {
            TableDump::Pages(p) | TableDump::Document { pages: p } => p,
        };
        debug!(pages = pages.len(), "dump: pages read");
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, tables)| DumpPage { number: i + 1, tables })
            .collect())
    }
}

impl TableExtractor<DumpPage> for TableDumpReader {
    fn extract(&self, page: &DumpPage) -> Vec<RawTable> {
        page.tables.clone()
    }
}
