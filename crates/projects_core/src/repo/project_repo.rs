//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects and attach steps, materials and categories.
//! - Rebuild full project aggregates from four scoped reads.
//!
//! # Invariants
//! - One connection and one transaction per public call; the connection is
//!   closed when the call returns.
//! - Any statement failure rolls the transaction back before the error is
//!   returned, so compound writes are all-or-nothing.
//! - Category names are unique: linking reuses an existing row and only
//!   inserts on miss. A category created by a failed link never persists.
//! - Deleting a project cascades to its steps, materials and links through
//!   foreign keys; categories themselves are kept.

use crate::db::ConnectionProvider;
use crate::model::project::{Category, CategoryId, Material, Project, ProjectId, Step};
use crate::repo::mapping::{
    category_from_row, material_from_row, project_from_row, project_scalar_params,
    step_from_row, CATEGORY_COLUMNS, MATERIAL_COLUMNS, PROJECT_COLUMNS, STEP_COLUMNS,
};
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::time::Instant;

const REQUIRED_TABLES: [&str; 5] = ["project", "step", "material", "category", "project_category"];

/// Repository interface for project aggregates.
pub trait ProjectRepository {
    /// Inserts the scalar fields of an unsaved project and returns it with the
    /// store-assigned identity. Child collections are not written.
    fn insert_project(&self, project: Project) -> RepoResult<Project>;
    /// Lists all projects by name ignoring case, without child collections.
    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>>;
    /// Loads one full aggregate; `None` when the identity has no row.
    fn fetch_project_by_id(&self, project_id: ProjectId) -> RepoResult<Option<Project>>;
    /// Replaces the five scalar fields; `false` when no row matched.
    fn update_project(&self, project: &Project) -> RepoResult<bool>;
    /// Removes one project; `false` when no row matched.
    fn delete_project(&self, project_id: ProjectId) -> RepoResult<bool>;
    /// Lists all categories by identity.
    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>>;
    /// Links a category (found or created by name) to a project atomically.
    /// `false` when the project does not exist.
    fn add_category_to_project(
        &self,
        project_id: ProjectId,
        category_name: &str,
    ) -> RepoResult<bool>;
    /// `false` when the project does not exist.
    fn add_material_to_project(
        &self,
        project_id: ProjectId,
        material: &Material,
    ) -> RepoResult<bool>;
    /// `false` when the project does not exist.
    fn add_step_to_project(&self, project_id: ProjectId, step: &Step) -> RepoResult<bool>;
}

/// What to do with the transaction once the body has run without error.
enum TxOutcome<T> {
    Commit(T),
    Rollback(T),
}

/// SQLite-backed project repository.
///
/// Holds no connection; one is acquired from the provider per call.
pub struct SqliteProjectRepository<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteProjectRepository<P> {
    /// Creates a repository after checking the provider yields a migrated
    /// schema.
    pub fn try_new(provider: P) -> RepoResult<Self> {
        let conn = provider.get_connection()?;
        ensure_project_schema_ready(&conn)?;
        Ok(Self { provider })
    }

    fn read<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
    ) -> RepoResult<T> {
        self.run_in_transaction(operation, TransactionBehavior::Deferred, |tx| {
            body(tx).map(TxOutcome::Commit)
        })
    }

    fn write<T>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<TxOutcome<T>>,
    ) -> RepoResult<T> {
        self.run_in_transaction(operation, TransactionBehavior::Immediate, body)
    }

    /// Acquires a connection, runs `body` in one transaction and always ends
    /// the transaction before returning. The connection drops on every path.
    fn run_in_transaction<T>(
        &self,
        operation: &'static str,
        behavior: TransactionBehavior,
        body: impl FnOnce(&Transaction<'_>) -> rusqlite::Result<TxOutcome<T>>,
    ) -> RepoResult<T> {
        let started_at = Instant::now();
        let fail = |err: RepoError| {
            error!(
                "event={} module=repo status=error duration_ms={} error_code={} error={}",
                operation,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            );
            err
        };

        let mut conn = self
            .provider
            .get_connection()
            .map_err(|err| fail(RepoError::Connection(err)))?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(|err| fail(RepoError::from_sqlite(operation, err)))?;

        match body(&tx) {
            Ok(TxOutcome::Commit(value)) => {
                tx.commit()
                    .map_err(|err| fail(RepoError::from_sqlite(operation, err)))?;
                info!(
                    "event={} module=repo status=ok duration_ms={}",
                    operation,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Ok(TxOutcome::Rollback(value)) => {
                tx.rollback()
                    .map_err(|err| fail(RepoError::from_sqlite(operation, err)))?;
                info!(
                    "event={} module=repo status=rolled_back duration_ms={}",
                    operation,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event={} module=repo status=error error_code=rollback_failed error={}",
                        operation, rollback_err
                    );
                }
                Err(fail(RepoError::from_sqlite(operation, err)))
            }
        }
    }
}

impl<P: ConnectionProvider> ProjectRepository for SqliteProjectRepository<P> {
    fn insert_project(&self, mut project: Project) -> RepoResult<Project> {
        const OPERATION: &str = "project_insert";
        if let Some(existing) = project.project_id {
            return Err(RepoError::Bind {
                operation: OPERATION,
                message: format!("project already has identity {existing}"),
            });
        }

        let project_id = self.write(OPERATION, |tx| {
            tx.execute(
                "INSERT INTO project (
                    project_name,
                    estimated_hours,
                    actual_hours,
                    difficulty,
                    notes
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                &project_scalar_params(&project)[..],
            )?;
            Ok(TxOutcome::Commit(tx.last_insert_rowid()))
        })?;

        debug!("event=project_insert module=repo status=assigned project_id={project_id}");
        project.project_id = Some(project_id);
        Ok(project)
    }

    fn fetch_all_projects(&self) -> RepoResult<Vec<Project>> {
        self.read("project_list", |tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {PROJECT_COLUMNS}
                 FROM project
                 ORDER BY project_name COLLATE NOCASE ASC, project_id ASC;"
            ))?;
            let projects = stmt
                .query_map([], project_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(projects)
        })
    }

    fn fetch_project_by_id(&self, project_id: ProjectId) -> RepoResult<Option<Project>> {
        self.read("project_fetch", |tx| {
            let project = tx
                .query_row(
                    &format!("SELECT {PROJECT_COLUMNS} FROM project WHERE project_id = ?1;"),
                    [project_id],
                    project_from_row,
                )
                .optional()?;

            let Some(mut project) = project else {
                return Ok(None);
            };

            project.materials = load_materials(tx, project_id)?;
            project.steps = load_steps(tx, project_id)?;
            project.categories = load_categories(tx, project_id)?;
            Ok(Some(project))
        })
    }

    fn update_project(&self, project: &Project) -> RepoResult<bool> {
        const OPERATION: &str = "project_update";
        let Some(project_id) = project.project_id else {
            return Err(RepoError::Bind {
                operation: OPERATION,
                message: "project has no identity".to_string(),
            });
        };

        self.write(OPERATION, |tx| {
            let [name, estimated, actual, difficulty, notes] = project_scalar_params(project);
            let changed = tx.execute(
                "UPDATE project
                 SET
                    project_name = ?1,
                    estimated_hours = ?2,
                    actual_hours = ?3,
                    difficulty = ?4,
                    notes = ?5
                 WHERE project_id = ?6;",
                params![name, estimated, actual, difficulty, notes, project_id],
            )?;
            Ok(TxOutcome::Commit(changed == 1))
        })
    }

    fn delete_project(&self, project_id: ProjectId) -> RepoResult<bool> {
        self.write("project_delete", |tx| {
            let changed = tx.execute("DELETE FROM project WHERE project_id = ?1;", [project_id])?;
            Ok(TxOutcome::Commit(changed == 1))
        })
    }

    fn fetch_all_categories(&self) -> RepoResult<Vec<Category>> {
        self.read("category_list", |tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category ORDER BY category_id ASC;"
            ))?;
            let categories = stmt
                .query_map([], category_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
    }

    fn add_category_to_project(
        &self,
        project_id: ProjectId,
        category_name: &str,
    ) -> RepoResult<bool> {
        self.write("project_category_link", |tx| {
            let category_id = match find_category_id(tx, category_name)? {
                Some(category_id) => category_id,
                None => {
                    tx.execute(
                        "INSERT INTO category (category_name) VALUES (?1);",
                        [category_name],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            let linked = tx.execute(
                "INSERT INTO project_category (project_id, category_id)
                 SELECT ?1, ?2
                 WHERE EXISTS (SELECT 1 FROM project WHERE project_id = ?1);",
                params![project_id, category_id],
            )?;

            if linked == 1 {
                debug!(
                    "event=project_category_link module=repo status=linked project_id={} category_id={}",
                    project_id, category_id
                );
                Ok(TxOutcome::Commit(true))
            } else {
                Ok(TxOutcome::Rollback(false))
            }
        })
    }

    fn add_material_to_project(
        &self,
        project_id: ProjectId,
        material: &Material,
    ) -> RepoResult<bool> {
        self.write("project_material_add", |tx| {
            let inserted = tx.execute(
                "INSERT INTO material (project_id, material_name, num_required, cost)
                 SELECT ?1, ?2, ?3, ?4
                 WHERE EXISTS (SELECT 1 FROM project WHERE project_id = ?1);",
                params![
                    project_id,
                    material.material_name,
                    material.num_required,
                    material.cost,
                ],
            )?;
            Ok(TxOutcome::Commit(inserted == 1))
        })
    }

    fn add_step_to_project(&self, project_id: ProjectId, step: &Step) -> RepoResult<bool> {
        self.write("project_step_add", |tx| {
            let inserted = tx.execute(
                "INSERT INTO step (project_id, step_text, step_order)
                 SELECT ?1, ?2, ?3
                 WHERE EXISTS (SELECT 1 FROM project WHERE project_id = ?1);",
                params![project_id, step.step_text, step.step_order],
            )?;
            Ok(TxOutcome::Commit(inserted == 1))
        })
    }
}

fn load_materials(tx: &Transaction<'_>, project_id: ProjectId) -> rusqlite::Result<Vec<Material>> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {MATERIAL_COLUMNS}
         FROM material
         WHERE project_id = ?1
         ORDER BY material_id ASC;"
    ))?;
    let materials = stmt
        .query_map([project_id], material_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(materials)
}

fn load_steps(tx: &Transaction<'_>, project_id: ProjectId) -> rusqlite::Result<Vec<Step>> {
    let mut stmt = tx.prepare(&format!(
        "SELECT {STEP_COLUMNS}
         FROM step
         WHERE project_id = ?1
         ORDER BY step_id ASC;"
    ))?;
    let steps = stmt
        .query_map([project_id], step_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

fn load_categories(tx: &Transaction<'_>, project_id: ProjectId) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = tx.prepare(
        "SELECT
            c.category_id AS category_id,
            c.category_name AS category_name
         FROM project_category pc
         INNER JOIN category c ON c.category_id = pc.category_id
         WHERE pc.project_id = ?1
         ORDER BY c.category_id ASC;",
    )?;
    let categories = stmt
        .query_map([project_id], category_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(categories)
}

/// Returns the last category row carrying `category_name`, if any.
fn find_category_id(
    tx: &Transaction<'_>,
    category_name: &str,
) -> rusqlite::Result<Option<CategoryId>> {
    tx.query_row(
        "SELECT category_id
         FROM category
         WHERE category_name = ?1
         ORDER BY category_id DESC
         LIMIT 1;",
        [category_name],
        |row| row.get(0),
    )
    .optional()
}

fn ensure_project_schema_ready(conn: &Connection) -> RepoResult<()> {
    for table in REQUIRED_TABLES {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )
            .map_err(|err| RepoError::from_sqlite("schema_check", err))?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
