//! Repository layer contracts, errors and SQLite implementation.
//!
//! # Responsibility
//! - Own SQL text, transaction boundaries and multi-table write order.
//! - Classify SQLite failures into connection/bind/extract/storage kinds.
//!
//! # Invariants
//! - Every public repository operation runs inside exactly one transaction
//!   on its own connection, and commits or rolls back before returning.
//! - "Zero rows affected" is reported as `false`, never as an error; the
//!   service layer decides what it means.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod mapping;
pub mod project_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure, tagged with the repository operation that raised it.
#[derive(Debug)]
pub enum RepoError {
    /// Store unreachable or connection bootstrap failed.
    Connection(DbError),
    /// A value could not be bound into a statement slot.
    Bind {
        operation: &'static str,
        message: String,
    },
    /// A result row did not match the expected entity shape.
    Extract {
        operation: &'static str,
        source: rusqlite::Error,
    },
    /// Statement execution failed; the transaction was rolled back.
    Storage {
        operation: &'static str,
        source: rusqlite::Error,
    },
    /// Connection schema lacks a table the repository depends on.
    MissingRequiredTable(&'static str),
}

impl RepoError {
    /// Maps a raw SQLite error raised during `operation` to its error kind.
    pub fn from_sqlite(operation: &'static str, err: rusqlite::Error) -> Self {
        use rusqlite::Error as E;
        match err {
            E::ToSqlConversionFailure(_)
            | E::InvalidParameterCount(..)
            | E::InvalidParameterName(_) => Self::Bind {
                operation,
                message: err.to_string(),
            },
            E::FromSqlConversionFailure(..)
            | E::IntegralValueOutOfRange(..)
            | E::InvalidColumnIndex(_)
            | E::InvalidColumnName(_)
            | E::InvalidColumnType(..)
            | E::Utf8Error(_) => Self::Extract {
                operation,
                source: err,
            },
            other => Self::Storage {
                operation,
                source: other,
            },
        }
    }

    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection_failed",
            Self::Bind { .. } => "bind_failed",
            Self::Extract { .. } => "extract_failed",
            Self::Storage { .. } => "storage_failed",
            Self::MissingRequiredTable(_) => "schema_not_ready",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "cannot connect to project store: {err}"),
            Self::Bind { operation, message } => {
                write!(f, "{operation}: cannot bind parameter: {message}")
            }
            Self::Extract { operation, source } => {
                write!(f, "{operation}: unexpected row shape: {source}")
            }
            Self::Storage { operation, source } => write!(f, "{operation} failed: {source}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "project repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Extract { source, .. } => Some(source),
            Self::Storage { source, .. } => Some(source),
            Self::Bind { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Connection(value)
    }
}
