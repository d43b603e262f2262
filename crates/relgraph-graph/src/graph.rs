//! Table reference graph construction and traversal
//!
//! The graph is a flat list of `table -> referenced table` edges. Every
//! lookup scans the list with the injected name comparer, so the graph never
//! assumes a case or whitespace policy of its own.

use relgraph_core::{NameComparer, OrderDirection, SharedNameComparer};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// One directed edge: `table` holds a foreign key into `referenced_table`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableReference {
    /// Referencing (child) table
    pub table: String,

    /// Referenced (parent) table
    pub referenced_table: String,
}

impl TableReference {
    /// Create a new edge
    pub fn new(table: impl Into<String>, referenced_table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            referenced_table: referenced_table.into(),
        }
    }

    /// Whether the edge points back at its own table
    pub fn is_self_reference(&self, names: &dyn NameComparer) -> bool {
        names.names_equal(&self.table, &self.referenced_table)
    }
}

/// Graph errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Reference cycle prevents a dependency order among: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Directed graph of table-level references
#[derive(Debug, Clone)]
pub struct TableReferenceGraph {
    /// Distinct edges in insertion order
    edges: Vec<TableReference>,

    /// Table name equality
    names: SharedNameComparer,
}

impl TableReferenceGraph {
    /// Create an empty graph
    pub fn new(names: SharedNameComparer) -> Self {
        Self {
            edges: Vec::new(),
            names,
        }
    }

    /// Build a graph from `(table, referenced_table)` pairs
    pub fn from_references<I, T, R>(names: SharedNameComparer, references: I) -> Self
    where
        I: IntoIterator<Item = (T, R)>,
        T: Into<String>,
        R: Into<String>,
    {
        let mut graph = Self::new(names);
        for (table, referenced) in references {
            graph.add_reference(table, referenced);
        }
        graph
    }

    /// Add an edge unless an equal one is already present
    ///
    /// Returns true if the edge was new.
    pub fn add_reference(&mut self, table: impl Into<String>, referenced_table: impl Into<String>) -> bool {
        let table = table.into();
        let referenced_table = referenced_table.into();

        if self.is_direct_reference(&table, &referenced_table) {
            return false;
        }

        trace!(table = %table, referenced = %referenced_table, "adding table reference");
        self.edges.push(TableReference { table, referenced_table });
        true
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[TableReference] {
        &self.edges
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Name comparer used for every lookup
    pub fn names(&self) -> &dyn NameComparer {
        self.names.as_ref()
    }

    /// Distinct tables, in order of first appearance
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for edge in &self.edges {
            for name in [edge.table.as_str(), edge.referenced_table.as_str()] {
                if !self.names.contains(&tables, name) {
                    tables.push(name);
                }
            }
        }
        tables
    }

    /// Tables that `table` references directly, self-references included
    pub fn direct_references(&self, table: &str) -> Vec<&str> {
        self.direct_references_excluding(table, &[])
    }

    /// Tables that `table` references directly, minus anything in `exclude`
    ///
    /// Seeding `exclude` with `table` drops a self-reference, which is how
    /// traversals avoid following a "parent row" column back into its own table.
    pub fn direct_references_excluding(&self, table: &str, exclude: &[&str]) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| self.names.names_equal(&edge.table, table))
            .map(|edge| edge.referenced_table.as_str())
            .filter(|referenced| !self.names.contains(exclude, referenced))
            .collect()
    }

    /// Tables holding a direct reference into `table`
    pub fn referencing_tables(&self, table: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|edge| self.names.names_equal(&edge.referenced_table, table))
            .map(|edge| edge.table.as_str())
            .collect()
    }

    /// Check for the exact edge `table -> referenced_table`
    pub fn is_direct_reference(&self, table: &str, referenced_table: &str) -> bool {
        self.edges.iter().any(|edge| {
            self.names.names_equal(&edge.table, table)
                && self.names.names_equal(&edge.referenced_table, referenced_table)
        })
    }

    /// Whether `referenced_table` is reachable from `table` over one or more
    /// references
    ///
    /// Self-references are never followed, so a table only reaches itself
    /// through a cycle that passes through another table.
    pub fn is_reference_indirect(&self, table: &str, referenced_table: &str) -> bool {
        self.walk(table, |next| self.names.names_equal(next, referenced_table))
    }

    /// Direct or indirect reference
    pub fn references(&self, table: &str, referenced_table: &str) -> bool {
        self.is_direct_reference(table, referenced_table) || self.is_reference_indirect(table, referenced_table)
    }

    /// Every table reachable from `table`, in discovery order
    pub fn reachable_tables(&self, table: &str) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        self.walk(table, |next| {
            if !self.names.contains(&found, next) {
                found.push(next);
            }
            false
        });
        found
    }

    /// Depth-first walk over non-self references starting at `table`
    ///
    /// `visit` sees the target of every followed edge and stops the walk by
    /// returning true. Each table is expanded at most once.
    fn walk<'a>(&'a self, table: &str, mut visit: impl FnMut(&'a str) -> bool) -> bool {
        let mut visited: Vec<&'a str> = Vec::new();
        let mut stack: Vec<&'a str> = Vec::new();
        let mut frontier = self.direct_references_excluding(table, &[table]);

        loop {
            for next in frontier {
                if visit(next) {
                    return true;
                }

                if !self.names.names_equal(next, table) && !self.names.contains(&visited, next) {
                    visited.push(next);
                    stack.push(next);
                }
            }

            match stack.pop() {
                Some(node) => frontier = self.direct_references_excluding(node, &[node]),
                None => return false,
            }
        }
    }

    /// Find a chain of references leading from `table` to `referenced_table`
    ///
    /// The chain starts with `referenced_table` and continues with the
    /// intermediate tables, deepest first; `table` itself is not included.
    /// Each element is directly referenced by the one after it. Returns
    /// `None` when no path exists. The first path found wins, not the shortest.
    pub fn build_join_chain(&self, table: &str, referenced_table: &str) -> Option<Vec<String>> {
        // (table, index of the table it was reached from)
        let mut discovered: Vec<(&str, Option<usize>)> = vec![(table, None)];
        let mut stack = vec![0usize];

        while let Some(index) = stack.pop() {
            let node = discovered[index].0;
            let references = self.direct_references(node);

            if let Some(target) = references
                .iter()
                .find(|candidate| self.names.names_equal(candidate, referenced_table))
            {
                let mut chain = vec![target.to_string()];
                let mut cursor = index;
                while let (name, Some(parent)) = discovered[cursor] {
                    chain.push(name.to_string());
                    cursor = parent;
                }

                debug!(from = table, to = referenced_table, hops = chain.len(), "join chain found");
                return Some(chain);
            }

            for next in references.into_iter().rev() {
                if !discovered.iter().any(|(seen, _)| self.names.names_equal(seen, next)) {
                    discovered.push((next, Some(index)));
                    stack.push(discovered.len() - 1);
                }
            }
        }

        debug!(from = table, to = referenced_table, "no join chain");
        None
    }

    /// Complete join path from `referenced_table` back to `table`
    ///
    /// This is [`build_join_chain`](Self::build_join_chain) with `table`
    /// appended, so both ends are present.
    pub fn join_chain(&self, table: &str, referenced_table: &str) -> Option<Vec<String>> {
        let mut chain = self.build_join_chain(table, referenced_table)?;
        chain.push(table.to_string());
        Some(chain)
    }

    /// Dependency comparison between two tables
    ///
    /// `Greater` when `table1` references `table2` (so `table2` is processed
    /// first), `Less` for the opposite case. `Equal` means no ordering
    /// constraint: the same table, unrelated tables, or tables on a common cycle.
    pub fn compare(&self, table1: &str, table2: &str) -> Ordering {
        if self.names.names_equal(table1, table2) {
            return Ordering::Equal;
        }

        match (
            self.is_reference_indirect(table1, table2),
            self.is_reference_indirect(table2, table1),
        ) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    /// Dependency order of every table in the graph
    pub fn topological_sort(&self, direction: OrderDirection) -> Result<Vec<String>, GraphError> {
        let tables = self.tables();
        self.sort_tables(&tables, direction)
    }

    /// Dependency order of `tables`
    ///
    /// Kahn's algorithm over reachability, so references that pass through
    /// tables outside the list still constrain the order. Ties are broken by
    /// position in `tables`. Duplicates (under the name comparer) are dropped.
    pub fn sort_tables<S: AsRef<str>>(&self, tables: &[S], direction: OrderDirection) -> Result<Vec<String>, GraphError> {
        let mut nodes: Vec<&str> = Vec::new();
        for table in tables {
            let table = table.as_ref();
            if !self.names.contains(&nodes, table) {
                nodes.push(table);
            }
        }

        let position = |name: &str| nodes.iter().position(|node| self.names.names_equal(node, name));

        // depends_on[i]: tables that nodes[i] reaches
        let mut depends_on: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (i, node) in nodes.iter().enumerate() {
            let deps = &mut depends_on[i];
            self.walk(node, |next| {
                if let Some(j) = position(next) {
                    if j != i && !deps.contains(&j) {
                        deps.push(j);
                    }
                }
                false
            });
        }

        let prerequisites = match direction {
            OrderDirection::LeastDependentFirst => depends_on,
            OrderDirection::MostDependentFirst => {
                let mut reversed = vec![Vec::new(); nodes.len()];
                for (i, deps) in depends_on.iter().enumerate() {
                    for &j in deps {
                        reversed[j].push(i);
                    }
                }
                reversed
            }
        };

        let mut unlocks: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (i, pre) in prerequisites.iter().enumerate() {
            for &j in pre {
                unlocks[j].push(i);
            }
        }

        let mut remaining: Vec<usize> = prerequisites.iter().map(Vec::len).collect();
        let mut emitted = vec![false; nodes.len()];
        let mut order = Vec::with_capacity(nodes.len());

        while let Some(next) = (0..nodes.len()).find(|&i| !emitted[i] && remaining[i] == 0) {
            emitted[next] = true;
            order.push(nodes[next].to_string());
            for &unlocked in &unlocks[next] {
                remaining[unlocked] -= 1;
            }
        }

        if order.len() < nodes.len() {
            let blocked: Vec<String> = nodes
                .iter()
                .zip(&emitted)
                .filter(|(_, done)| !**done)
                .map(|(name, _)| name.to_string())
                .collect();
            warn!(tables = ?blocked, "reference cycle blocks dependency order");
            return Err(GraphError::Cycle(blocked));
        }

        debug!(%direction, order = ?order, "sorted tables");
        Ok(order)
    }
}
