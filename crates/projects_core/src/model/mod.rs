//! Domain model for project planning.
//!
//! # Responsibility
//! - Define the entity graph persisted by the repository layer.
//! - Provide the exact fixed-point type used for hours and costs.
//!
//! # Invariants
//! - Entities carry no storage logic; row mapping lives in `repo::mapping`.

pub mod decimal;
pub mod project;
