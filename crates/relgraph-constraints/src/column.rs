//! Column pairs of a foreign key constraint

use relgraph_core::{FieldIdentity, IdGenerator, NameComparer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::Infallible;

/// One `column -> referenced column` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintColumn {
    /// Referencing column
    pub column: FieldIdentity,

    /// Column it points at
    pub referenced_column: FieldIdentity,

    /// Position in the filter cascade
    pub filter_order: usize,

    /// Handle for UI code, `None` when id assignment is disabled
    pub unique_id: Option<u64>,
}

/// Orders constraint columns, possibly consulting something that can fail
pub trait ColumnComparer {
    type Error;

    fn compare_columns(&mut self, a: &ConstraintColumn, b: &ConstraintColumn) -> Result<Ordering, Self::Error>;
}

impl<F> ColumnComparer for F
where
    F: FnMut(&ConstraintColumn, &ConstraintColumn) -> Ordering,
{
    type Error = Infallible;

    fn compare_columns(&mut self, a: &ConstraintColumn, b: &ConstraintColumn) -> Result<Ordering, Infallible> {
        Ok(self(a, b))
    }
}

/// Ordered column pairs owned by one constraint
///
/// The order is meaningful: UI cascades present the first pair's column as
/// the first filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintColumnSet {
    columns: Vec<ConstraintColumn>,
}

impl ConstraintColumnSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, drawing its unique id from `ids` when given
    pub fn add(
        &mut self,
        column: FieldIdentity,
        referenced_column: FieldIdentity,
        ids: Option<&mut (dyn IdGenerator + '_)>,
    ) -> &ConstraintColumn {
        let index = self.columns.len();
        self.columns.push(ConstraintColumn {
            column,
            referenced_column,
            filter_order: index,
            unique_id: ids.map(|ids| ids.next_id()),
        });
        &self.columns[index]
    }

    /// The pair whose referencing column is `field`
    pub fn find_reference(&self, field: &FieldIdentity, names: &dyn NameComparer) -> Option<&ConstraintColumn> {
        self.columns.iter().find(|pair| pair.column.equals(field, names))
    }

    /// Every pair pointing at `field`
    pub fn find_referenced(&self, field: &FieldIdentity, names: &dyn NameComparer) -> Vec<&ConstraintColumn> {
        self.columns
            .iter()
            .filter(|pair| pair.referenced_column.equals(field, names))
            .collect()
    }

    /// Index of the pair whose referencing column is `field`
    pub fn position_of(&self, field: &FieldIdentity, names: &dyn NameComparer) -> Option<usize> {
        self.columns.iter().position(|pair| pair.column.equals(field, names))
    }

    /// Sort the pairs with `comparer`
    ///
    /// The sort is stable. If the comparer fails the set is left untouched.
    /// With `assign_order` the filter order of each pair is rewritten to its
    /// new position.
    pub fn prioritize<C>(&mut self, comparer: &mut C, assign_order: bool) -> Result<(), C::Error>
    where
        C: ColumnComparer + ?Sized,
    {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        let mut failure = None;

        order.sort_by(|&a, &b| {
            if failure.is_some() {
                return Ordering::Equal;
            }
            match comparer.compare_columns(&self.columns[a], &self.columns[b]) {
                Ok(ordering) => ordering,
                Err(e) => {
                    failure = Some(e);
                    Ordering::Equal
                }
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        let mut slots: Vec<Option<ConstraintColumn>> = self.columns.drain(..).map(Some).collect();
        self.columns = order.into_iter().filter_map(|i| slots[i].take()).collect();

        if assign_order {
            self.assign_order_number();
        }

        Ok(())
    }

    /// Set every pair's filter order to its current position
    pub fn assign_order_number(&mut self) {
        for (position, pair) in self.columns.iter_mut().enumerate() {
            pair.filter_order = position;
        }
    }

    /// Referencing columns in current order
    pub fn column_fields(&self) -> Vec<&FieldIdentity> {
        self.columns.iter().map(|pair| &pair.column).collect()
    }

    /// Referenced columns in current order
    pub fn reference_fields(&self) -> Vec<&FieldIdentity> {
        self.columns.iter().map(|pair| &pair.referenced_column).collect()
    }

    pub fn get_by_id(&self, id: u64) -> Option<&ConstraintColumn> {
        self.columns.iter().find(|pair| pair.unique_id == Some(id))
    }

    /// Number of pairs carrying `id`
    pub fn count_id(&self, id: u64) -> usize {
        self.columns.iter().filter(|pair| pair.unique_id == Some(id)).count()
    }

    /// Remove the pair with `id`
    ///
    /// Nothing is removed unless exactly one pair carries the id.
    pub fn remove_by_id(&mut self, id: u64) -> Option<ConstraintColumn> {
        if self.count_id(id) != 1 {
            return None;
        }
        let index = self.columns.iter().position(|pair| pair.unique_id == Some(id))?;
        Some(self.columns.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConstraintColumn> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[ConstraintColumn] {
        &self.columns
    }

    pub fn first(&self) -> Option<&ConstraintColumn> {
        self.columns.first()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConstraintColumnSet {
    type Item = &'a ConstraintColumn;
    type IntoIter = std::slice::Iter<'a, ConstraintColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_core::{NameMatching, SequentialIdGenerator};

    fn field(table: &str, column: &str) -> FieldIdentity {
        FieldIdentity::new("public", table, column)
    }

    fn shipment_set(ids: &mut SequentialIdGenerator) -> ConstraintColumnSet {
        let mut set = ConstraintColumnSet::new();
        set.add(field("shipments", "warehouse_id"), field("bins", "warehouse_id"), Some(&mut *ids));
        set.add(field("shipments", "aisle"), field("bins", "aisle"), Some(&mut *ids));
        set.add(field("shipments", "shelf"), field("bins", "shelf"), Some(&mut *ids));
        set
    }

    #[test]
    fn add_assigns_ids_and_positions() {
        let mut ids = SequentialIdGenerator::default();
        let set = shipment_set(&mut ids);

        let ids: Vec<_> = set.iter().map(|pair| pair.unique_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        let orders: Vec<_> = set.iter().map(|pair| pair.filter_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn add_without_generator() {
        let mut set = ConstraintColumnSet::new();
        let pair = set.add(field("a", "b_id"), field("b", "id"), None);
        assert_eq!(pair.unique_id, None);
    }

    #[test]
    fn find_reference_and_referenced() {
        let names = NameMatching::case_insensitive();
        let mut set = ConstraintColumnSet::new();
        set.add(field("orders", "billing_id"), field("addresses", "id"), None);
        set.add(field("orders", "shipping_id"), field("addresses", "id"), None);

        let pair = set.find_reference(&field("ORDERS", "Shipping_Id"), &names).unwrap();
        assert_eq!(pair.column.column, "shipping_id");
        assert!(set.find_reference(&field("addresses", "id"), &names).is_none());

        assert_eq!(set.find_referenced(&field("addresses", "id"), &names).len(), 2);
        assert!(set.find_referenced(&field("orders", "billing_id"), &names).is_empty());

        assert_eq!(set.position_of(&field("orders", "shipping_id"), &names), Some(1));
        assert_eq!(set.position_of(&field("orders", "missing"), &names), None);
    }

    #[test]
    fn prioritize_reorders_and_assigns() {
        let mut ids = SequentialIdGenerator::default();
        let mut set = shipment_set(&mut ids);

        let mut by_name = |a: &ConstraintColumn, b: &ConstraintColumn| a.column.column.cmp(&b.column.column);
        set.prioritize(&mut by_name, true).unwrap();

        let columns: Vec<_> = set.column_fields().iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["aisle", "shelf", "warehouse_id"]);
        let references: Vec<_> = set.reference_fields().iter().map(|f| f.column.as_str()).collect();
        assert_eq!(references, vec!["aisle", "shelf", "warehouse_id"]);

        for (position, pair) in set.iter().enumerate() {
            assert_eq!(pair.filter_order, position);
        }
        // ids travel with their pairs
        assert_eq!(set.first().and_then(|pair| pair.unique_id), Some(2));
    }

    #[test]
    fn prioritize_without_assign_keeps_filter_order() {
        let mut ids = SequentialIdGenerator::default();
        let mut set = shipment_set(&mut ids);

        let mut reverse = |a: &ConstraintColumn, b: &ConstraintColumn| b.filter_order.cmp(&a.filter_order);
        set.prioritize(&mut reverse, false).unwrap();

        let orders: Vec<_> = set.iter().map(|pair| pair.filter_order).collect();
        assert_eq!(orders, vec![2, 1, 0]);

        set.assign_order_number();
        let orders: Vec<_> = set.iter().map(|pair| pair.filter_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    struct Failing;

    impl ColumnComparer for Failing {
        type Error = String;

        fn compare_columns(&mut self, _: &ConstraintColumn, _: &ConstraintColumn) -> Result<Ordering, String> {
            Err("count unavailable".to_string())
        }
    }

    #[test]
    fn failed_prioritize_leaves_set_untouched() {
        let mut ids = SequentialIdGenerator::default();
        let mut set = shipment_set(&mut ids);
        let before = set.clone();

        let err = set.prioritize(&mut Failing, true).unwrap_err();
        assert_eq!(err, "count unavailable");
        assert_eq!(set, before);
    }

    #[test]
    fn remove_by_id_requires_unique_match() {
        let mut ids = SequentialIdGenerator::default();
        let mut set = shipment_set(&mut ids);

        assert!(set.remove_by_id(42).is_none());
        let removed = set.remove_by_id(2).unwrap();
        assert_eq!(removed.column.column, "aisle");
        assert_eq!(set.len(), 2);
        assert!(set.get_by_id(2).is_none());

        // colliding ids
        let mut duplicate = SequentialIdGenerator::starting_at(3);
        set.add(field("shipments", "bin"), field("bins", "bin"), Some(&mut duplicate));
        assert_eq!(set.count_id(3), 2);
        assert!(set.remove_by_id(3).is_none());
        assert_eq!(set.len(), 3);
    }
}
