//! Core persistence and use-case logic for project planning.
//! This crate owns the schema, every SQL statement and all transaction
//! boundaries; callers only see the service API.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{ConnectionProvider, DbError, DbResult, SqliteConnectionProvider};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::decimal::{Decimal2, DecimalParseError};
pub use model::project::{
    Category, CategoryId, Material, MaterialId, Project, ProjectId, Step, StepId,
};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::project_service::{ProjectService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
