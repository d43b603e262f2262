//! Named foreign key constraints

use crate::column::ConstraintColumnSet;
use relgraph_core::{FieldIdentity, NameComparer};
use serde::{Deserialize, Serialize};

/// A named foreign key spanning one or more column pairs
///
/// All pairs share one referencing table and one referenced table. This is
/// assumed, not checked; the table accessors read the first pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name as declared in the catalog
    pub name: String,

    /// Column pairs in filter order
    pub columns: ConstraintColumnSet,
}

impl Constraint {
    /// Create a constraint with no column pairs yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: ConstraintColumnSet::new(),
        }
    }

    /// Referencing table
    pub fn table(&self) -> Option<&str> {
        self.columns.first().map(|pair| pair.column.table.as_str())
    }

    /// Referenced table
    pub fn referenced_table(&self) -> Option<&str> {
        self.columns.first().map(|pair| pair.referenced_column.table.as_str())
    }

    /// Single-column constraints can back a plain value filter
    pub fn is_single(&self) -> bool {
        self.columns.len() == 1
    }

    /// Multi-column constraints need a cascade of ordered filters
    pub fn is_multiple(&self) -> bool {
        self.columns.len() > 1
    }

    /// Whether `field` takes part in this constraint on either side
    pub fn is_match_target(&self, field: &FieldIdentity, names: &dyn NameComparer) -> bool {
        self.columns.iter().any(|pair| {
            pair.column.equals(field, names) || pair.referenced_column.equals(field, names)
        })
    }

    /// Whether `table` is the referencing or the referenced table
    pub fn is_match_target_table(&self, table: &str, names: &dyn NameComparer) -> bool {
        self.columns.iter().any(|pair| {
            names.names_equal(&pair.column.table, table) || names.names_equal(&pair.referenced_column.table, table)
        })
    }

    /// Whether this constraint implements the edge `table -> referenced_table`
    pub fn links(&self, table: &str, referenced_table: &str, names: &dyn NameComparer) -> bool {
        match (self.table(), self.referenced_table()) {
            (Some(source), Some(target)) => {
                names.names_equal(source, table) && names.names_equal(target, referenced_table)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::NameMatching;

    fn order_customer() -> Constraint {
        let mut constraint = Constraint::new("fk_orders_customer");
        constraint.columns.add(
            FieldIdentity::new("public", "orders", "customer_id"),
            FieldIdentity::new("public", "customers", "id"),
            None,
        );
        constraint
    }

    #[test]
    fn tables_come_from_first_pair() {
        let constraint = order_customer();
        assert_eq!(constraint.table(), Some("orders"));
        assert_eq!(constraint.referenced_table(), Some("customers"));
        assert!(constraint.is_single());
        assert!(!constraint.is_multiple());

        let empty = Constraint::new("fk_empty");
        assert_eq!(empty.table(), None);
        assert!(!empty.is_single());
    }

    #[test]
    fn match_targets() {
        let names = NameMatching::case_insensitive();
        let constraint = order_customer();

        assert!(constraint.is_match_target(&FieldIdentity::new("public", "orders", "CUSTOMER_ID"), &names));
        assert!(constraint.is_match_target(&FieldIdentity::new("public", "customers", "id"), &names));
        assert!(!constraint.is_match_target(&FieldIdentity::new("public", "orders", "id"), &names));

        assert!(constraint.is_match_target_table("Customers", &names));
        assert!(constraint.is_match_target_table("orders", &names));
        assert!(!constraint.is_match_target_table("products", &names));
    }

    #[test]
    fn links_is_directional() {
        let names = NameMatching::exact();
        let constraint = order_customer();
        assert!(constraint.links("orders", "customers", &names));
        assert!(!constraint.links("customers", "orders", &names));
    }
}
