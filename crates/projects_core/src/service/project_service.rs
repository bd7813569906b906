//! Project use-case service.
//!
//! # Responsibility
//! - Provide the entry points used by the interactive menu.
//! - Turn "no row affected" repository outcomes into domain errors.
//! - Pass every other value through unchanged; input cleanup belongs to
//!   the caller.
//!
//! # Invariants
//! - The service never retries and never swallows a repository error.
//! - A missing project is an error here, even though the repository treats
//!   it as a normal empty result.

use crate::model::project::{Category, Material, Project, ProjectId, Step};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from project use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Update/delete/attach targeted a project with no matching row.
    ProjectNotFound(ProjectId),
    /// Fetch-by-id found no row where the caller required one.
    MissingElement(ProjectId),
    /// Update requested for a project that was never saved.
    InvalidInput(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project with ID = {id} does not exist"),
            Self::MissingElement(id) => write!(f, "project number {id} does not exist"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Project service facade over a repository implementation.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new project and returns it with its assigned identity.
    pub fn add_project(&self, project: Project) -> ServiceResult<Project> {
        Ok(self.repo.insert_project(project)?)
    }

    pub fn fetch_all_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.fetch_all_projects()?)
    }

    /// Loads one full aggregate, failing when it does not exist.
    pub fn fetch_project_by_id(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.repo
            .fetch_project_by_id(project_id)?
            .ok_or(ServiceError::MissingElement(project_id))
    }

    /// Replaces the scalar fields of an existing project.
    pub fn modify_project_details(&self, project: &Project) -> ServiceResult<()> {
        let project_id = project
            .project_id
            .ok_or_else(|| ServiceError::InvalidInput("project has no identity".to_string()))?;
        ensure_affected(self.repo.update_project(project)?, project_id)
    }

    pub fn delete_project(&self, project_id: ProjectId) -> ServiceResult<()> {
        ensure_affected(self.repo.delete_project(project_id)?, project_id)
    }

    pub fn fetch_all_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.repo.fetch_all_categories()?)
    }

    /// Links the named category to a project, creating the category on
    /// first use.
    pub fn add_category_to_project(
        &self,
        project_id: ProjectId,
        category_name: &str,
    ) -> ServiceResult<()> {
        ensure_affected(
            self.repo.add_category_to_project(project_id, category_name)?,
            project_id,
        )
    }

    pub fn add_material_to_project(
        &self,
        project_id: ProjectId,
        material: &Material,
    ) -> ServiceResult<()> {
        ensure_affected(
            self.repo.add_material_to_project(project_id, material)?,
            project_id,
        )
    }

    pub fn add_step_to_project(&self, project_id: ProjectId, step: &Step) -> ServiceResult<()> {
        ensure_affected(self.repo.add_step_to_project(project_id, step)?, project_id)
    }
}

fn ensure_affected(affected: bool, project_id: ProjectId) -> ServiceResult<()> {
    if affected {
        Ok(())
    } else {
        warn!("event=project_not_found module=service status=error project_id={project_id}");
        Err(ServiceError::ProjectNotFound(project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::{ensure_affected, ServiceError};

    #[test]
    fn ensure_affected_maps_false_to_not_found() {
        assert!(ensure_affected(true, 4).is_ok());
        assert!(matches!(
            ensure_affected(false, 4),
            Err(ServiceError::ProjectNotFound(4))
        ));
    }
}
