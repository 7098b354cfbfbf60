//! Header row recognition: bilingual (English / Vietnamese) column aliases
//! mapped onto canonical fields.
//!
//! Matching rules:
//! 1) an alias hits when it appears in the cell on word boundaries
//! 2) the longest hit wins, so "ngân hàng đối tác" (remitter bank) beats
//!    "đối tác" (remitter) and "số tiền ghi nợ" beats "số tiền"
//! 3) the generic "amount" aliases are only tried when nothing specific hit,
//!    and always flag the map as ambiguous
//! 4) when two columns claim the same field the first one is kept and the
//!    clash is returned as a `HeaderConflict`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::normalize::contains_phrase;
use crate::types::Field;

/// What an alias resolves to. `Ignore` marks known non-canonical columns
/// whose names overlap a canonical alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Field(Field),
    Ignore,
}

const DATE_ALIASES: &[&str] = &[
    "date",
    "ngày",
    "ngay",
    "ngày giao dịch",
    "ngay giao dich",
    "transaction date",
];

const DESCRIPTION_ALIASES: &[&str] = &[
    "description",
    "nội dung",
    "noi dung",
    "diễn giải",
    "dien giai",
    "details",
    "chi tiết",
    "chi tiet",
    "content",
];

const REMITTER_ALIASES: &[&str] = &[
    "remitter",
    "đối tác",
    "doi tac",
    "partner",
    "người chuyển",
    "nguoi chuyen",
];

/// Remitter-bank headers ("NH Đối tác"). They contain the remitter aliases
/// but name a different column.
const REMITTER_BANK_ALIASES: &[&str] = &[
    "remitter bank",
    "partner bank",
    "nh đối tác",
    "nh doi tac",
    "ngân hàng đối tác",
    "ngan hang doi tac",
];

const DEBIT_ALIASES: &[&str] = &[
    "debit",
    "ghi nợ",
    "ghi no",
    "số tiền ghi nợ",
    "so tien ghi no",
    "outflow",
    "withdrawal",
    "phát sinh nợ",
    "phat sinh no",
    "nợ tktt",
    "no tktt",
];

const CREDIT_ALIASES: &[&str] = &[
    "credit",
    "ghi có",
    "ghi co",
    "số tiền ghi có",
    "so tien ghi co",
    "inflow",
    "deposit",
    "phát sinh có",
    "phat sinh co",
    "có tktt",
    "co tktt",
];

/// A single signed amount column; mapped to Debit but never trusted.
const GENERIC_AMOUNT_ALIASES: &[&str] = &["amount", "số tiền", "so tien"];

fn alias_table() -> [(Target, &'static [&'static str]); 6] {
    [
        (Target::Field(Field::Date), DATE_ALIASES),
        (Target::Field(Field::Description), DESCRIPTION_ALIASES),
        (Target::Ignore, REMITTER_BANK_ALIASES),
        (Target::Field(Field::Remitter), REMITTER_ALIASES),
        (Target::Field(Field::Debit), DEBIT_ALIASES),
        (Target::Field(Field::Credit), CREDIT_ALIASES),
    ]
}

/// How a single header cell was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMatch {
    pub field: Field,
    /// Matched only through a generic amount alias.
    pub generic: bool,
}

/// Classify one normalized header cell.
pub fn classify_cell(cell: &str) -> Option<CellMatch> {
    if cell.is_empty() {
        return None;
    }

    let mut best: Option<(usize, Target)> = None;
    let mut saw_debit = false;
    let mut saw_credit = false;

    for (target, aliases) in alias_table() {
        for alias in aliases {
            if !contains_phrase(cell, alias) {
                continue;
            }
            match target {
                Target::Field(Field::Debit) => saw_debit = true,
                Target::Field(Field::Credit) => saw_credit = true,
                _ => {}
            }
            let len = alias.chars().count();
            match best {
                Some((best_len, _)) if best_len >= len => {}
                _ => best = Some((len, target)),
            }
        }
    }

    match best {
        Some((_, Target::Ignore)) => None,
        // "Debit/Credit", "Nợ/Có": one signed column
        Some((_, Target::Field(f))) if f.is_amount() && saw_debit && saw_credit => Some(CellMatch {
            field: Field::Debit,
            generic: true,
        }),
        Some((_, Target::Field(field))) => Some(CellMatch { field, generic: false }),
        None => GENERIC_AMOUNT_ALIASES
            .iter()
            .any(|a| contains_phrase(cell, a))
            .then_some(CellMatch {
                field: Field::Debit,
                generic: true,
            }),
    }
}

/// Canonical field -> zero-based column index for one table shape.
/// Each column carries at most one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnMap {
    columns: BTreeMap<Field, usize>,
    generic_amount: bool,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used for hand-written layouts. Ignores a field or column that
    /// is already taken.
    pub fn with(mut self, field: Field, index: usize) -> Self {
        self.insert(field, index);
        self
    }

    /// Mark the Debit column as coming from a generic "amount" header.
    pub fn with_generic_amount(mut self) -> Self {
        self.generic_amount = true;
        self
    }

    fn insert(&mut self, field: Field, index: usize) -> bool {
        if self.columns.contains_key(&field) || self.columns.values().any(|&i| i == index) {
            return false;
        }
        self.columns.insert(field, index);
        true
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.columns.iter().map(|(f, i)| (*f, *i))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn has_generic_amount(&self) -> bool {
        self.generic_amount
    }

    /// Date, Description and at least one amount column.
    pub fn is_complete(&self) -> bool {
        self.contains(Field::Date)
            && self.contains(Field::Description)
            && (self.contains(Field::Debit) || self.contains(Field::Credit))
    }

    /// Minimum row width for every mapped column to exist.
    pub fn required_width(&self) -> usize {
        self.columns.values().max().map_or(0, |i| i + 1)
    }

    pub fn fits(&self, width: usize) -> bool {
        width >= self.required_width()
    }

    /// Common statement layout guess: Date, Description, Debit, Credit from
    /// the left, cut to `width` columns.
    pub fn positional(width: usize) -> Self {
        [Field::Date, Field::Description, Field::Debit, Field::Credit]
            .into_iter()
            .enumerate()
            .take(width)
            .fold(Self::new(), |map, (i, field)| map.with(field, i))
    }
}

/// Two columns claimed the same field; `kept` won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConflict {
    pub field: Field,
    pub kept: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderMatch {
    pub map: ColumnMap,
    pub conflicts: Vec<HeaderConflict>,
}

/// Map a row of normalized header cells. Never fails: a row with no
/// recognisable cell gives an empty map.
pub fn map_header(cells: &[String]) -> HeaderMatch {
    // field -> (column, generic)
    let mut claims: BTreeMap<Field, (usize, bool)> = BTreeMap::new();
    let mut conflicts = Vec::new();

    for (i, cell) in cells.iter().enumerate() {
        let Some(m) = classify_cell(cell) else {
            continue;
        };
        match claims.get(&m.field).copied() {
            None => {
                claims.insert(m.field, (i, m.generic));
            }
            // a specific header beats an earlier generic "amount"
            Some((prev, true)) if !m.generic => {
                conflicts.push(HeaderConflict { field: m.field, kept: i, rejected: prev });
                claims.insert(m.field, (i, false));
            }
            Some((prev, _)) => {
                conflicts.push(HeaderConflict { field: m.field, kept: prev, rejected: i });
            }
        }
    }

    for c in &conflicts {
        warn!(
            field = c.field.name(),
            kept = c.kept,
            rejected = c.rejected,
            "header: several columns match one field, keeping one"
        );
    }

    let mut map = ColumnMap::new();
    for (field, (index, generic)) in claims {
        map.insert(field, index);
        if generic {
            map.generic_amount = true;
        }
    }
    conflicts.sort_by_key(|c| (c.field, c.rejected));

    HeaderMatch { map, conflicts }
}
