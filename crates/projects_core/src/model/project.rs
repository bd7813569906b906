//! Project aggregate and its child entities.
//!
//! # Responsibility
//! - Define plain data holders for projects, steps, materials and categories.
//!
//! # Invariants
//! - Identities are `None` until the store assigns them on insert.
//! - Steps and materials belong to exactly one project and share its lifetime.
//! - Categories are shared between projects through a link table.

use super::decimal::Decimal2;
use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type StepId = i64;
pub type MaterialId = i64;
pub type CategoryId = i64;

/// Project aggregate root.
///
/// List reads return projects with empty child collections; fetch-by-id
/// reads populate all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Option<ProjectId>,
    pub project_name: String,
    pub estimated_hours: Option<Decimal2>,
    pub actual_hours: Option<Decimal2>,
    /// 1 to 5 by convention; not enforced here.
    pub difficulty: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Project {
    /// Creates an unsaved project with only a name set.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_id: None,
            project_name: project_name.into(),
            estimated_hours: None,
            actual_hours: None,
            difficulty: None,
            notes: None,
            steps: Vec::new(),
            materials: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.project_id.is_some()
    }
}

/// One ordered instruction of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: Option<StepId>,
    /// Filled on read; the owning project is passed explicitly on insert.
    pub project_id: Option<ProjectId>,
    pub step_text: String,
    pub step_order: i32,
}

impl Step {
    pub fn new(step_text: impl Into<String>, step_order: i32) -> Self {
        Self {
            step_id: None,
            project_id: None,
            step_text: step_text.into(),
            step_order,
        }
    }
}

/// Material required by a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub material_id: Option<MaterialId>,
    /// Filled on read; the owning project is passed explicitly on insert.
    pub project_id: Option<ProjectId>,
    pub material_name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Decimal2>,
}

impl Material {
    pub fn new(
        material_name: impl Into<String>,
        num_required: Option<i32>,
        cost: Option<Decimal2>,
    ) -> Self {
        Self {
            material_id: None,
            project_id: None,
            material_name: material_name.into(),
            num_required,
            cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}
