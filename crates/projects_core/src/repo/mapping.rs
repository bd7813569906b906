//! Explicit row <-> entity mapping.
//!
//! One function per entity shape; no runtime type dispatch. Column lists here
//! must stay in sync with the `SELECT` statements in `project_repo`.

use crate::model::decimal::Decimal2;
use crate::model::project::{Category, Material, Project, Step};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;

pub const PROJECT_COLUMNS: &str =
    "project_id, project_name, estimated_hours, actual_hours, difficulty, notes";
pub const STEP_COLUMNS: &str = "step_id, project_id, step_text, step_order";
pub const MATERIAL_COLUMNS: &str = "material_id, project_id, material_name, num_required, cost";
pub const CATEGORY_COLUMNS: &str = "category_id, category_name";

// Stored as INTEGER hundredths.
impl ToSql for Decimal2 {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.hundredths()))
    }
}

impl FromSql for Decimal2 {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_i64().map(Decimal2::from_hundredths)
    }
}

/// Reads a project row without child collections.
pub fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: Some(row.get("project_id")?),
        project_name: row.get("project_name")?,
        estimated_hours: row.get("estimated_hours")?,
        actual_hours: row.get("actual_hours")?,
        difficulty: row.get("difficulty")?,
        notes: row.get("notes")?,
        steps: Vec::new(),
        materials: Vec::new(),
        categories: Vec::new(),
    })
}

pub fn step_from_row(row: &Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        step_id: Some(row.get("step_id")?),
        project_id: Some(row.get("project_id")?),
        step_text: row.get("step_text")?,
        step_order: row.get("step_order")?,
    })
}

pub fn material_from_row(row: &Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        material_id: Some(row.get("material_id")?),
        project_id: Some(row.get("project_id")?),
        material_name: row.get("material_name")?,
        num_required: row.get("num_required")?,
        cost: row.get("cost")?,
    })
}

pub fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        category_id: row.get("category_id")?,
        category_name: row.get("category_name")?,
    })
}

/// Binds the five scalar project fields in column order
/// `project_name, estimated_hours, actual_hours, difficulty, notes`.
pub fn project_scalar_params(project: &Project) -> [&dyn ToSql; 5] {
    [
        &project.project_name,
        &project.estimated_hours,
        &project.actual_hours,
        &project.difficulty,
        &project.notes,
    ]
}
