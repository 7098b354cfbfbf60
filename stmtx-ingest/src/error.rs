use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a document could not be turned into pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("document has no content")]
    Empty,

    #[error("wrong input type: {0}")]
    WrongInputType(String),

    #[error("unreadable document: {0}")]
    Unreadable(String),
}

/// Failure classes a caller can tell apart when rendering a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    WrongInputType,
    Unreadable,
    /// Read fine, but not a single transaction row came out.
    EmptyResult,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::WrongInputType => "wrong input type",
            FailureKind::Unreadable => "unreadable/corrupt",
            FailureKind::EmptyResult => "empty result",
        }
    }
}

impl LoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoadError::WrongInputType(_) => FailureKind::WrongInputType,
            LoadError::Empty | LoadError::Unreadable(_) => FailureKind::Unreadable,
        }
    }
}
