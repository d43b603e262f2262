//! Foreign key constraints and the collections that hold them
//!
//! This crate handles:
//! - Column pairs of (possibly multi-column) foreign keys, in filter order
//! - Name-keyed constraint collections for one schema
//! - Deriving the table reference graph and dependency-sorted table lists
//! - Loading constraint declarations from JSON

pub mod column;
pub mod constraint;
pub mod set;
pub mod declaration;

pub use column::{ColumnComparer, ConstraintColumn, ConstraintColumnSet};
pub use constraint::Constraint;
pub use set::{ConstraintSet, ConstraintSetBuilder};
pub use declaration::{parse_declarations, ConstraintDeclaration, ConstraintError};
