//! Error types for document operations.

use crate::id::ElementId;
use thiserror::Error;

/// Registry lookup failure: a kind name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KindError {
    #[error("unknown element kind `{0}`")]
    Unknown(String),
}

/// A structural edit that could not be applied. The tree is unchanged
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("element `{0}` not found")]
    NotFound(ElementId),

    #[error("element `{0}` is not a layout container")]
    NotAContainer(ElementId),

    #[error("layout container `{0}` cannot be placed inside a column")]
    NestedContainer(ElementId),

    #[error("element id `{0}` already exists in the document")]
    DuplicateId(ElementId),

    #[error("element `{0}` cannot be moved into itself")]
    IntoItself(ElementId),

    #[error("page {0} does not exist")]
    PageOutOfRange(usize),
}

/// Page-management failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {index} is out of range ({count} pages)")]
    OutOfRange { index: usize, count: usize },

    #[error("cannot switch to single-page mode with {0} pages")]
    MultiplePages(usize),

    #[error("a document must keep at least one page")]
    LastPage,

    #[error("document is not in multi-page mode")]
    NotMultiPage,
}

/// Failures of the JSON bridge. Both `Malformed` and `UnknownKind` mean the
/// stored text does not describe a valid form document.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed document at {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("unknown element kind `{kind}` at {path}")]
    UnknownKind { path: String, kind: String },
}

impl BridgeError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        BridgeError::Malformed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Structured data (undo snapshots, host-side serde) that decodes into a
/// shape the document model cannot hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("layout container `{0}` has no column sequences")]
    MissingColumns(ElementId),

    #[error("element `{0}` is not a layout container but carries columns")]
    UnexpectedColumns(ElementId),

    #[error("layout container `{0}` cannot be placed inside a column")]
    NestedContainer(ElementId),

    #[error("invalid document ({rule}): {message}")]
    Invalid { rule: &'static str, message: String },
}
