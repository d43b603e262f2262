//! All foreign key constraints of one schema

use crate::column::{ColumnComparer, ConstraintColumn};
use crate::constraint::Constraint;
use relgraph_core::{
    Config, ConfigError, FieldIdentity, IdGenerator, NameComparer, OrderDirection, SharedNameComparer,
};
use relgraph_graph::{GraphError, TableReferenceGraph};
use tracing::debug;

/// Name-keyed collection of constraints
///
/// The table reference graph is derived on demand by
/// [`reference_graph`](Self::reference_graph) and never cached, so it must be
/// rebuilt after the set changes.
#[derive(Debug)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    names: SharedNameComparer,
    ids: Option<Box<dyn IdGenerator>>,
    default_schema: String,
    direction: OrderDirection,
}

impl ConstraintSet {
    /// Start configuring a set
    pub fn builder() -> ConstraintSetBuilder {
        ConstraintSetBuilder::default()
    }

    /// Set configured entirely from `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            constraints: Vec::new(),
            names: config.name_comparer(),
            ids: config.id_generator(),
            default_schema: config.default_schema.clone(),
            direction: config.ordering.direction,
        }
    }

    /// Name comparer used by every lookup
    pub fn names(&self) -> &dyn NameComparer {
        self.names.as_ref()
    }

    /// Shared handle to the name comparer, for graphs and comparers built
    /// alongside this set
    pub fn name_comparer(&self) -> SharedNameComparer {
        self.names.clone()
    }

    /// Schema used by [`add_foreign_key`](Self::add_foreign_key)
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Add a column pair to the constraint called `constraint_name`,
    /// creating the constraint on first use
    pub fn add_constraint_field(
        &mut self,
        constraint_name: &str,
        column: FieldIdentity,
        referenced_column: FieldIdentity,
    ) -> &ConstraintColumn {
        let index = match self.position(constraint_name) {
            Some(index) => index,
            None => {
                debug!(constraint = constraint_name, "new constraint");
                self.constraints.push(Constraint::new(constraint_name));
                self.constraints.len() - 1
            }
        };

        self.constraints[index]
            .columns
            .add(column, referenced_column, self.ids.as_deref_mut())
    }

    /// Add a column pair in the default schema
    pub fn add_foreign_key(
        &mut self,
        constraint_name: &str,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> &ConstraintColumn {
        let column = FieldIdentity::new(self.default_schema.as_str(), table, column);
        let referenced = FieldIdentity::new(self.default_schema.as_str(), referenced_table, referenced_column);
        self.add_constraint_field(constraint_name, column, referenced)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.constraints
            .iter()
            .position(|constraint| self.names.names_equal(&constraint.name, name))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraint called `name`
    pub fn find_constraint(&self, name: &str) -> Option<&Constraint> {
        self.position(name).map(|index| &self.constraints[index])
    }

    /// Mutable access to the constraint called `name`
    pub fn find_constraint_mut(&mut self, name: &str) -> Option<&mut Constraint> {
        self.position(name).map(move |index| &mut self.constraints[index])
    }

    /// Constraints with exactly one column pair
    pub fn find_all_single(&self) -> Vec<&Constraint> {
        self.constraints.iter().filter(|c| c.is_single()).collect()
    }

    /// Constraints with more than one column pair
    pub fn find_all_multiple(&self) -> Vec<&Constraint> {
        self.constraints.iter().filter(|c| c.is_multiple()).collect()
    }

    /// Constraints that use `field` on either side
    pub fn find_by_field(&self, field: &FieldIdentity) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.is_match_target(field, self.names()))
            .collect()
    }

    /// Constraints that touch `table` on either side
    pub fn find_by_table(&self, table: &str) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.is_match_target_table(table, self.names()))
            .collect()
    }

    /// Constraints implementing the edge `table -> referenced_table`
    pub fn find_between(&self, table: &str, referenced_table: &str) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.links(table, referenced_table, self.names()))
            .collect()
    }

    /// Build the table reference graph from every column pair
    pub fn reference_graph(&self) -> TableReferenceGraph {
        let mut graph = TableReferenceGraph::new(self.names.clone());

        for constraint in &self.constraints {
            for pair in &constraint.columns {
                graph.add_reference(pair.column.table.as_str(), pair.referenced_column.table.as_str());
            }
        }

        debug!(constraints = self.constraints.len(), edges = graph.len(), "built reference graph");
        graph
    }

    /// Distinct tables across all constraints, in declaration order
    pub fn distinct_tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = Vec::new();

        for pair in self.constraints.iter().flat_map(|c| c.columns.iter()) {
            for table in [&pair.column.table, &pair.referenced_column.table] {
                if !tables.iter().any(|seen| self.names.names_equal(seen, table)) {
                    tables.push(table.clone());
                }
            }
        }

        tables
    }

    /// Distinct tables in the configured dependency order
    pub fn list_tables_sorted(&self) -> Result<Vec<String>, GraphError> {
        self.list_tables_sorted_by(self.direction)
    }

    /// Distinct tables in dependency order
    pub fn list_tables_sorted_by(&self, direction: OrderDirection) -> Result<Vec<String>, GraphError> {
        let tables = self.distinct_tables();
        self.reference_graph().sort_tables(&tables, direction)
    }

    /// Re-prioritize every multi-column constraint and renumber its filter order
    ///
    /// Stops at the first comparer failure; constraints already processed
    /// keep their new order.
    pub fn prioritize_multiple<C>(&mut self, comparer: &mut C) -> Result<(), C::Error>
    where
        C: ColumnComparer + ?Sized,
    {
        for constraint in self.constraints.iter_mut().filter(|c| c.is_multiple()) {
            constraint.columns.prioritize(comparer, true)?;
            debug!(constraint = %constraint.name, "prioritized columns");
        }
        Ok(())
    }

    /// Remove the column pair carrying `id`
    ///
    /// Only succeeds when exactly one pair in the whole set has the id. A
    /// constraint left without pairs is dropped.
    pub fn remove_column_by_id(&mut self, id: u64) -> Option<ConstraintColumn> {
        let total: usize = self.constraints.iter().map(|c| c.columns.count_id(id)).sum();
        if total != 1 {
            return None;
        }

        let index = self
            .constraints
            .iter()
            .position(|c| c.columns.count_id(id) == 1)?;
        let removed = self.constraints[index].columns.remove_by_id(id)?;

        if self.constraints[index].columns.is_empty() {
            let dropped = self.constraints.remove(index);
            debug!(constraint = %dropped.name, "dropped empty constraint");
        }

        Some(removed)
    }
}

/// Builder for [`ConstraintSet`]
#[derive(Debug, Default)]
pub struct ConstraintSetBuilder {
    names: Option<SharedNameComparer>,
    ids: Option<Box<dyn IdGenerator>>,
    default_schema: Option<String>,
    direction: OrderDirection,
}

impl ConstraintSetBuilder {
    /// Name comparer (required)
    pub fn name_comparer(mut self, names: SharedNameComparer) -> Self {
        self.names = Some(names);
        self
    }

    /// Enable unique ids for column pairs
    pub fn id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Schema for [`ConstraintSet::add_foreign_key`]
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    /// Default direction of [`ConstraintSet::list_tables_sorted`]
    pub fn direction(mut self, direction: OrderDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Finish configuration
    pub fn build(self) -> Result<ConstraintSet, ConfigError> {
        let names = self
            .names
            .ok_or_else(|| ConfigError::MissingCollaborator("constraint set needs a name comparer".to_string()))?;

        Ok(ConstraintSet {
            constraints: Vec::new(),
            names,
            ids: self.ids,
            default_schema: self.default_schema.unwrap_or_else(|| Config::default().default_schema),
            direction: self.direction,
        })
    }
}
