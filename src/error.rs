use std::fmt;
use std::io;

use thiserror::Error;

/// Kinds of entities that can be referenced by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Column,
    HeaderRow,
    BodyRow,
    FooterRow,
    HeaderCell,
    BodyCell,
    FooterCell,
    Tag,
    FilterRule,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Column => "column",
            Self::HeaderRow => "header row",
            Self::BodyRow => "body row",
            Self::FooterRow => "footer row",
            Self::HeaderCell => "header cell",
            Self::BodyCell => "body cell",
            Self::FooterCell => "footer cell",
            Self::Tag => "tag",
            Self::FilterRule => "filter rule",
        };
        f.write_str(name)
    }
}

/// Errors raised while executing a command against the document.
///
/// These indicate a broken model invariant (the caller referenced something
/// that is not there). The command is aborted; the store stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("cannot move {kind} {id} to position {position} (len {len})")]
    InvalidMove {
        kind: EntityKind,
        id: String,
        position: usize,
        len: usize,
    },

    #[error("cannot delete the last {kind}")]
    LastRemaining { kind: EntityKind },

    #[error("{kind} {id} does not belong to {owner}")]
    Mismatch {
        kind: EntityKind,
        id: String,
        owner: String,
    },
}

impl TableError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn mismatch(kind: EntityKind, id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::Mismatch {
            kind,
            id: id.into(),
            owner: owner.into(),
        }
    }
}

/// Errors raised while loading or storing a table file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("table file parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("table file has no plugin version")]
    MissingVersion,

    #[error("invalid plugin version '{0}'")]
    InvalidVersion(String),

    #[error("table file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: String, supported: String },

    #[error("migration to {version} failed: {message}")]
    Migration { version: String, message: String },

    #[error("table file is inconsistent: {0}")]
    Inconsistent(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FileError {
    /// True when the text could not be understood as a table document.
    /// Hosts show a recovery path for these instead of failing hard.
    pub fn is_parse(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Rejected user input at the edit boundary. Never reaches a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    Number(String),

    #[error("'{input}' does not match date format {format}")]
    Date { input: String, format: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot export table: {0}")]
    Table(#[from] TableError),

    #[error("export output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(value: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        Self::Io(value.into_error())
    }
}
