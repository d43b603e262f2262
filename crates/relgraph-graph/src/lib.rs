//! Table reference graph and dependency ordering
//!
//! This crate handles:
//! - The directed graph of table-level foreign key references
//! - Direct and transitive reachability
//! - Join chain construction between two tables
//! - Dependency (topological) ordering for batch inserts and deletes

pub mod graph;
pub mod order;

pub use graph::{GraphError, TableReference, TableReferenceGraph};
pub use order::{DependencyOrderComparer, DependencyOrderComparerBuilder};
