use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the five attributes every statement layout is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Date,
    Description,
    Remitter,
    Debit,
    Credit,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Description => "Description",
            Field::Remitter => "Remitter",
            Field::Debit => "Debit",
            Field::Credit => "Credit",
        }
    }

    pub fn is_amount(&self) -> bool {
        matches!(self, Field::Debit | Field::Credit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "checking")]
    Checking,
    #[serde(rename = "credit_card")]
    CreditCard,
}

impl SourceType {
    pub fn key(&self) -> &'static str {
        match self {
            SourceType::Checking => "checking",
            SourceType::CreditCard => "credit_card",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().replace('-', "_").as_str() {
            "checking" => Some(SourceType::Checking),
            "credit_card" | "credit" | "card" => Some(SourceType::CreditCard),
            _ => None,
        }
    }
}

/// One row of a raw table: cells may be missing text entirely.
pub type RawRow = Vec<Option<String>>;

/// A rectangular-ish grid of optional text cells, as produced by a page
/// table extractor. Rows may be ragged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Build a table from string cells; empty strings become absent cells.
    pub fn from_cells<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        if cell.is_empty() { None } else { Some(cell.to_string()) }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row; ragged rows are measured by their longest member.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    pub fn first_row(&self) -> Option<&RawRow> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of parsing one cell. `Absent` and `Unparseable` are kept apart
/// from any legitimate value so a missing amount never reads as zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CellValue<T> {
    Parsed(T),
    Absent,
    Unparseable(String),
}

impl<T> CellValue<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            CellValue::Parsed(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, CellValue::Parsed(_))
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, CellValue::Unparseable(_))
    }
}

impl<T: Copy> CellValue<T> {
    pub fn parsed(&self) -> Option<T> {
        self.value().copied()
    }
}

impl CellValue<Decimal> {
    /// Signed amount, or zero when the cell was absent or unparseable.
    pub fn amount_or_zero(&self) -> Decimal {
        self.parsed().unwrap_or(Decimal::ZERO)
    }
}

/// Why a record was produced under an unverified column mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    /// Only a generic "amount" header was found; its direction is a guess.
    AmbiguousAmountColumn,
    /// Header row present but missing Date, Description or both amount fields.
    IncompleteHeader,
    /// Header-less page with no complete prior map that fits it.
    LayoutUnknown,
}

impl DegradedReason {
    pub fn label(&self) -> &'static str {
        match self {
            DegradedReason::AmbiguousAmountColumn => "ambiguous_amount_column",
            DegradedReason::IncompleteHeader => "incomplete_header",
            DegradedReason::LayoutUnknown => "layout_unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "level", content = "reasons", rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Verified,
    Degraded(Vec<DegradedReason>),
}

impl Confidence {
    pub fn degrade(self, reason: DegradedReason) -> Self {
        match self {
            Confidence::Verified => Confidence::Degraded(vec![reason]),
            Confidence::Degraded(mut reasons) => {
                if !reasons.contains(&reason) {
                    reasons.push(reason);
                    reasons.sort();
                }
                Confidence::Degraded(reasons)
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Confidence::Degraded(_))
    }

    pub fn reasons(&self) -> &[DegradedReason] {
        match self {
            Confidence::Verified => &[],
            Confidence::Degraded(reasons) => reasons,
        }
    }
}

/// Normalized transaction row, bank-agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: CellValue<NaiveDate>,
    pub description: String,
    pub remitter: String,
    /// Outflow. Negative values (refunds, reversals) are kept as parsed.
    pub debit: CellValue<Decimal>,
    /// Inflow.
    pub credit: CellValue<Decimal>,
    pub source_type: SourceType,
    pub confidence: Confidence,
}

/// Identity used for exact-duplicate detection. Confidence is not part of it.
pub type RecordKey = (
    CellValue<NaiveDate>,
    String,
    String,
    CellValue<Decimal>,
    CellValue<Decimal>,
    SourceType,
);

impl TransactionRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        self.date.parsed()
    }

    pub fn key(&self) -> RecordKey {
        (
            self.date.clone(),
            self.description.clone(),
            self.remitter.clone(),
            self.debit.clone(),
            self.credit.clone(),
            self.source_type,
        )
    }

    pub fn is_degraded(&self) -> bool {
        self.confidence.is_degraded()
    }
}
