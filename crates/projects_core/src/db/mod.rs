//! SQLite storage bootstrap and connection acquisition.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the projects core.
//! - Apply schema migrations before a connection is handed out.
//! - Define the per-operation connection source used by repositories.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write project data before migrations succeed.
//! - Connections are never cached: every call yields a fresh one that is
//!   closed when dropped.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Source of ready-to-use connections, one per logical operation.
///
/// Implementations must return connections that are fully bootstrapped
/// (`foreign_keys=ON`, migrations applied).
pub trait ConnectionProvider {
    fn get_connection(&self) -> DbResult<Connection>;
}

/// Opens the SQLite database file at a fixed path on every call.
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    path: PathBuf,
}

impl SqliteConnectionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn get_connection(&self) -> DbResult<Connection> {
        open_db(&self.path)
    }
}
