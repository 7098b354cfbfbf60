//! Column-map carry-over between pages of one document.
//!
//! The state is a plain value threaded through the page loop: each call to
//! `ContinuationState::advance` consumes the previous state and returns the
//! next one together with the layout decision for the current page.

use tracing::{debug, warn};

use crate::config::ParseConfig;
use crate::header::{map_header, ColumnMap, HeaderConflict};
use crate::normalize::normalize_row;
use crate::select::row_looks_like_data;
use crate::types::{Confidence, DegradedReason, RawTable};

/// How a page's selected table is to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLayout {
    /// First row is a complete header.
    Headed { map: ColumnMap, conflicts: Vec<HeaderConflict> },
    /// First row is a header naming some fields but not enough of them.
    PartialHeader { map: ColumnMap, conflicts: Vec<HeaderConflict> },
    /// No header; the last complete map still fits this table.
    Continuation { map: ColumnMap },
    /// No header and no trustworthy prior map. `map` is the best guess
    /// (prior map or positional layout), or `None` when there is nothing.
    LayoutUnknown { map: Option<ColumnMap> },
    /// Neither header nor data in the first row.
    Unrecognized,
}

impl PageLayout {
    pub fn map(&self) -> Option<&ColumnMap> {
        match self {
            PageLayout::Headed { map, .. }
            | PageLayout::PartialHeader { map, .. }
            | PageLayout::Continuation { map } => Some(map),
            PageLayout::LayoutUnknown { map } => map.as_ref(),
            PageLayout::Unrecognized => None,
        }
    }

    /// Whether the table's first row is a header to skip.
    pub fn skips_first_row(&self) -> bool {
        matches!(self, PageLayout::Headed { .. } | PageLayout::PartialHeader { .. })
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            PageLayout::PartialHeader { .. } => {
                Confidence::Verified.degrade(DegradedReason::IncompleteHeader)
            }
            PageLayout::LayoutUnknown { .. } => {
                Confidence::Verified.degrade(DegradedReason::LayoutUnknown)
            }
            _ => Confidence::Verified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageLayout::Headed { .. } => "headed",
            PageLayout::PartialHeader { .. } => "partial-header",
            PageLayout::Continuation { .. } => "continuation",
            PageLayout::LayoutUnknown { .. } => "layout-unknown",
            PageLayout::Unrecognized => "unrecognized",
        }
    }
}

/// Last header map seen in this document. Completeness is a property of the
/// map itself (`ColumnMap::is_complete`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContinuationState {
    last_map: Option<ColumnMap>,
}

impl ContinuationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_map(&self) -> Option<&ColumnMap> {
        self.last_map.as_ref()
    }

    pub fn has_complete_map(&self) -> bool {
        self.last_map.as_ref().is_some_and(ColumnMap::is_complete)
    }

    /// Decide the layout of `table` and return the state for the next page.
    pub fn advance(self, table: &RawTable, config: &ParseConfig) -> (Self, PageLayout) {
        let Some(first) = table.first_row() else {
            return (self, PageLayout::Unrecognized);
        };

        let header = map_header(&normalize_row(first));
        if header.map.is_complete() {
            debug!(fields = header.map.len(), "continuation: header row adopted");
            let next = Self { last_map: Some(header.map.clone()) };
            return (next, PageLayout::Headed { map: header.map, conflicts: header.conflicts });
        }

        if row_looks_like_data(first, &config.date_policy()) {
            let width = table.width();
            return match self.last_map.clone() {
                Some(prior) if prior.is_complete() && prior.fits(width) => {
                    debug!(width, "continuation: reusing previous header map");
                    (self, PageLayout::Continuation { map: prior })
                }
                Some(prior) => {
                    warn!(
                        width,
                        complete = prior.is_complete(),
                        required = prior.required_width(),
                        "continuation: previous header map does not fit, layout unknown"
                    );
                    (self, PageLayout::LayoutUnknown { map: Some(prior) })
                }
                None => {
                    warn!(width, "continuation: header-less table with no previous header");
                    let map = config
                        .positional_fallback
                        .then(|| ColumnMap::positional(width))
                        .filter(|m| !m.is_empty());
                    (self, PageLayout::LayoutUnknown { map })
                }
            };
        }

        if !header.map.is_empty() {
            // an incomplete map never displaces a complete one
            let next = if self.has_complete_map() {
                warn!(fields = header.map.len(), "continuation: incomplete header row, keeping previous map");
                self
            } else {
                warn!(fields = header.map.len(), "continuation: incomplete header row");
                Self { last_map: Some(header.map.clone()) }
            };
            return (next, PageLayout::PartialHeader { map: header.map, conflicts: header.conflicts });
        }

        (self, PageLayout::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::from_cells(rows)
    }

    fn page1() -> RawTable {
        table(vec![
            vec!["Ngày giao dịch", "Đối tác", "Diễn giải", "Nợ TKTT", "Có TKTT"],
            vec!["01/12/2025", "Partner A", "Payment 1", "100,000", ""],
        ])
    }

    fn page2() -> RawTable {
        table(vec![
            vec!["02/12/2025", "Partner B", "Payment 2", "200,000", ""],
            vec!["03/12/2025", "Partner C", "Payment 3", "300,000", ""],
        ])
    }

    #[test]
    fn test_header_then_continuation_reuses_map() {
        let cfg = ParseConfig::default();
        let (state, l1) = ContinuationState::new().advance(&page1(), &cfg);
        assert!(matches!(l1, PageLayout::Headed { .. }));
        assert!(l1.skips_first_row());
        assert!(state.has_complete_map());

        let (_, l2) = state.advance(&page2(), &cfg);
        let PageLayout::Continuation { map } = &l2 else {
            panic!("expected continuation, got {l2:?}");
        };
        assert_eq!(map.get(Field::Debit), Some(3));
        assert!(!l2.skips_first_row());
        assert_eq!(l2.confidence(), Confidence::Verified);
    }

    #[test]
    fn test_incomplete_prior_map_is_layout_unknown() {
        let cfg = ParseConfig::default();
        let p1 = table(vec![vec!["Date", "Debit"], vec!["01/12/2025", "100,000"]]);
        let (state, l1) = ContinuationState::new().advance(&p1, &cfg);
        assert!(matches!(l1, PageLayout::PartialHeader { .. }));
        assert!(!state.has_complete_map());
        assert!(l1.confidence().is_degraded());

        let p2 = table(vec![vec!["02/12/2025", "200,000"]]);
        let (_, l2) = state.advance(&p2, &cfg);
        assert!(matches!(l2, PageLayout::LayoutUnknown { map: Some(_) }));
        assert_eq!(l2.confidence().reasons(), &[DegradedReason::LayoutUnknown]);
    }

    #[test]
    fn test_partial_header_page_keeps_complete_map() {
        let cfg = ParseConfig::default();
        let (state, _) = ContinuationState::new().advance(&page1(), &cfg);

        let fees = table(vec![vec!["Nội dung", "Số tiền"], vec!["Phí SMS", "11.000"]]);
        let (state, l2) = state.advance(&fees, &cfg);
        assert!(matches!(l2, PageLayout::PartialHeader { .. }));
        assert!(state.has_complete_map());
        assert_eq!(state.last_map().and_then(|m| m.get(Field::Date)), Some(0));

        let p3 = table(vec![vec!["04/12/2025", "Partner D", "Payment 4", "400,000", ""]]);
        let (_, l3) = state.advance(&p3, &cfg);
        let PageLayout::Continuation { map } = &l3 else {
            panic!("expected continuation, got {l3:?}");
        };
        assert_eq!(map.get(Field::Description), Some(2));
        assert_eq!(l3.confidence(), Confidence::Verified);
    }

    #[test]
    fn test_partial_header_replaces_incomplete_map() {
        let cfg = ParseConfig::default();
        let p1 = table(vec![vec!["Date", "Debit"], vec!["01/12/2025", "100,000"]]);
        let (state, _) = ContinuationState::new().advance(&p1, &cfg);
        let p2 = table(vec![vec!["Description", "Credit"], vec!["Salary", "9,000,000"]]);
        let (state, _) = state.advance(&p2, &cfg);
        assert_eq!(state.last_map().and_then(|m| m.get(Field::Credit)), Some(1));
        assert!(!state.has_complete_map());
    }

    #[test]
    fn test_narrower_table_does_not_reuse_complete_map() {
        let cfg = ParseConfig::default();
        let (state, _) = ContinuationState::new().advance(&page1(), &cfg);
        let narrow = table(vec![vec!["02/12/2025", "200,000", "x"]]);
        let (state, l2) = state.advance(&narrow, &cfg);
        assert!(matches!(l2, PageLayout::LayoutUnknown { .. }));
        // the complete map survives for later pages
        assert!(state.has_complete_map());
    }

    #[test]
    fn test_first_page_without_header_uses_positional_guess() {
        let cfg = ParseConfig::default();
        let (_, layout) = ContinuationState::new().advance(&page2(), &cfg);
        let PageLayout::LayoutUnknown { map: Some(map) } = layout else {
            panic!("expected positional guess");
        };
        assert_eq!(map, ColumnMap::positional(5));

        let strict = ParseConfig { positional_fallback: false, ..ParseConfig::default() };
        let (_, layout) = ContinuationState::new().advance(&page2(), &strict);
        assert_eq!(layout, PageLayout::LayoutUnknown { map: None });
    }

    #[test]
    fn test_later_header_replaces_map() {
        let cfg = ParseConfig::default();
        let (state, _) = ContinuationState::new().advance(&page1(), &cfg);
        let other = table(vec![
            vec!["Date", "Description", "Credit"],
            vec!["05/12/2025", "Salary", "9,000,000"],
        ]);
        let (state, layout) = state.advance(&other, &cfg);
        assert!(matches!(layout, PageLayout::Headed { .. }));
        assert_eq!(state.last_map().and_then(|m| m.get(Field::Credit)), Some(2));
    }

    #[test]
    fn test_text_table_unrecognized() {
        let cfg = ParseConfig::default();
        let t = table(vec![vec!["Col1", "Col2"], vec!["a", "b"]]);
        let (state, layout) = ContinuationState::new().advance(&t, &cfg);
        assert_eq!(layout, PageLayout::Unrecognized);
        assert!(state.last_map().is_none());
    }
}
