//! Two-argument dependency ordering
//!
//! Wraps either a [`TableReferenceGraph`] or a precomputed table order in a
//! single `compare` usable with `sort_by`. Prefer
//! [`TableReferenceGraph::sort_tables`] for full orderings: graph comparison
//! is a partial order and `Equal` only means "no constraint".

use crate::graph::TableReferenceGraph;
use relgraph_core::{ConfigError, NameComparer, OrderDirection, SharedNameComparer};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
enum Strategy<'g> {
    Graph {
        graph: &'g TableReferenceGraph,
        direction: OrderDirection,
    },
    Precomputed {
        tables: Vec<String>,
        names: SharedNameComparer,
    },
}

/// Compares tables by dependency order
#[derive(Debug, Clone)]
pub struct DependencyOrderComparer<'g> {
    strategy: Strategy<'g>,
}

impl<'g> DependencyOrderComparer<'g> {
    /// Start configuring a comparer
    pub fn builder() -> DependencyOrderComparerBuilder<'g> {
        DependencyOrderComparerBuilder::default()
    }

    /// Compare through graph reachability
    pub fn from_graph(graph: &'g TableReferenceGraph, direction: OrderDirection) -> Self {
        Self {
            strategy: Strategy::Graph { graph, direction },
        }
    }

    /// Compare by position in a precomputed order
    pub fn from_order(tables: Vec<String>, names: SharedNameComparer) -> Self {
        Self {
            strategy: Strategy::Precomputed { tables, names },
        }
    }

    /// Order `table_a` relative to `table_b`
    ///
    /// Precomputed orders answer `Equal` when either table is missing.
    pub fn compare(&self, table_a: &str, table_b: &str) -> Ordering {
        match &self.strategy {
            Strategy::Graph { graph, direction } => {
                let ordering = graph.compare(table_a, table_b);
                match direction {
                    OrderDirection::LeastDependentFirst => ordering,
                    OrderDirection::MostDependentFirst => ordering.reverse(),
                }
            }
            Strategy::Precomputed { tables, names } => {
                match (position(tables, names.as_ref(), table_a), position(tables, names.as_ref(), table_b)) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    _ => Ordering::Equal,
                }
            }
        }
    }

    /// Position of `table` in the precomputed order, if that strategy is in use
    pub fn position(&self, table: &str) -> Option<usize> {
        match &self.strategy {
            Strategy::Precomputed { tables, names } => position(tables, names.as_ref(), table),
            Strategy::Graph { .. } => None,
        }
    }
}

fn position(tables: &[String], names: &dyn NameComparer, table: &str) -> Option<usize> {
    tables.iter().position(|candidate| names.names_equal(candidate, table))
}

/// Builder for [`DependencyOrderComparer`]
///
/// Exactly one backing strategy must be configured.
#[derive(Debug, Default)]
pub struct DependencyOrderComparerBuilder<'g> {
    graph: Option<(&'g TableReferenceGraph, OrderDirection)>,
    order: Option<Vec<String>>,
    names: Option<SharedNameComparer>,
}

impl<'g> DependencyOrderComparerBuilder<'g> {
    /// Back the comparer with a reference graph
    pub fn graph(mut self, graph: &'g TableReferenceGraph, direction: OrderDirection) -> Self {
        self.graph = Some((graph, direction));
        self
    }

    /// Back the comparer with a precomputed table order
    pub fn order(mut self, tables: Vec<String>) -> Self {
        self.order = Some(tables);
        self
    }

    /// Name comparer for precomputed order lookups
    pub fn name_comparer(mut self, names: SharedNameComparer) -> Self {
        self.names = Some(names);
        self
    }

    /// Finish configuration
    pub fn build(self) -> Result<DependencyOrderComparer<'g>, ConfigError> {
        match (self.graph, self.order) {
            (Some((graph, direction)), None) => Ok(DependencyOrderComparer::from_graph(graph, direction)),
            (None, Some(tables)) => {
                let names = self.names.ok_or_else(|| {
                    ConfigError::MissingCollaborator("precomputed order needs a name comparer".to_string())
                })?;
                Ok(DependencyOrderComparer::from_order(tables, names))
            }
            (None, None) => Err(ConfigError::MissingCollaborator(
                "dependency order comparer needs a reference graph or a precomputed order".to_string(),
            )),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingStrategy(
                "dependency order comparer takes a reference graph or a precomputed order, not both".to_string(),
            )),
        }
    }
}
