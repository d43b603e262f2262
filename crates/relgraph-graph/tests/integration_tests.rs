//! Integration tests for the table reference graph
//!
//! Exercises the graph through its public API on a small retail schema:
//!
//! ```text
//! regions <- customers <- orders <- order_lines -> products -> suppliers
//!                          ^   |
//!                          +---+  (orders.parent_order_id)
//! ```

use pretty_assertions::assert_eq;
use relgraph_core::{NameMatching, OrderDirection};
use relgraph_graph::{DependencyOrderComparer, GraphError, TableReferenceGraph};
use std::cmp::Ordering;

fn retail_graph() -> TableReferenceGraph {
    TableReferenceGraph::from_references(
        NameMatching::case_insensitive().shared(),
        [
            ("customers", "regions"),
            ("orders", "customers"),
            ("orders", "orders"),
            ("order_lines", "orders"),
            ("order_lines", "products"),
            ("products", "suppliers"),
        ],
    )
}

#[test]
fn test_direct_references_are_indirect_references() {
    let graph = retail_graph();

    for table in graph.tables() {
        for referenced in graph.direct_references_excluding(table, &[table]) {
            assert!(
                graph.is_reference_indirect(table, referenced),
                "{} -> {} is direct but not indirect",
                table,
                referenced
            );
        }
    }
}

#[test]
fn test_no_table_indirectly_references_itself_without_cycle() {
    let graph = retail_graph();

    for table in graph.tables() {
        assert!(!graph.is_reference_indirect(table, table), "{} reported a cycle", table);
    }
}

#[test]
fn test_every_join_chain_is_a_valid_path() {
    let graph = retail_graph();
    let tables = graph.tables();

    let mut chains = 0;
    for from in &tables {
        for to in &tables {
            if let Some(chain) = graph.join_chain(from, to) {
                chains += 1;
                assert_eq!(chain.first().map(String::as_str), Some(*to));
                assert_eq!(chain.last().map(String::as_str), Some(*from));
                for pair in chain.windows(2) {
                    assert!(graph.is_direct_reference(&pair[1], &pair[0]), "broken chain {:?}", chain);
                }
            }
        }
    }

    assert!(chains > 0);
}

#[test]
fn test_join_chain_across_schema() {
    let graph = retail_graph();

    assert_eq!(
        graph.join_chain("order_lines", "regions").unwrap(),
        vec!["regions", "customers", "orders", "order_lines"]
    );
    assert_eq!(
        graph.join_chain("ORDER_LINES", "suppliers").unwrap(),
        vec!["suppliers", "products", "ORDER_LINES"]
    );
    assert!(graph.join_chain("regions", "orders").is_none());
    assert!(graph.join_chain("customers", "products").is_none());
}

#[test]
fn test_compare_is_antisymmetric() {
    let graph = retail_graph();
    let tables = graph.tables();

    for a in &tables {
        assert_eq!(graph.compare(a, a), Ordering::Equal);
        for b in &tables {
            assert_eq!(graph.compare(a, b), graph.compare(b, a).reverse(), "{} vs {}", a, b);
        }
    }
}

#[test]
fn test_topological_orders_respect_every_reference() {
    let graph = retail_graph();

    let inserts = graph.topological_sort(OrderDirection::LeastDependentFirst).unwrap();
    let deletes = graph.topological_sort(OrderDirection::MostDependentFirst).unwrap();
    assert_eq!(inserts.len(), graph.tables().len());
    assert_eq!(deletes.len(), graph.tables().len());
    assert_ne!(inserts, deletes);

    let index = |order: &[String], table: &str| order.iter().position(|t| t == table).unwrap();
    for edge in graph.edges() {
        if edge.table == edge.referenced_table {
            continue;
        }
        assert!(index(&inserts, &edge.referenced_table) < index(&inserts, &edge.table));
        assert!(index(&deletes, &edge.referenced_table) > index(&deletes, &edge.table));
    }
}

#[test]
fn test_topological_sort_is_deterministic() {
    let first = retail_graph().topological_sort(OrderDirection::LeastDependentFirst).unwrap();
    for _ in 0..10 {
        assert_eq!(retail_graph().topological_sort(OrderDirection::LeastDependentFirst).unwrap(), first);
    }
    assert_eq!(first, vec!["regions", "customers", "orders", "suppliers", "products", "order_lines"]);
}

#[test]
fn test_cycle_is_reported() {
    let mut graph = retail_graph();
    graph.add_reference("regions", "order_lines");

    match graph.topological_sort(OrderDirection::LeastDependentFirst) {
        Err(GraphError::Cycle(tables)) => {
            assert!(tables.contains(&"regions".to_string()));
            assert!(tables.contains(&"order_lines".to_string()));
            assert!(!tables.contains(&"suppliers".to_string()));
        }
        other => panic!("expected cycle, got {:?}", other),
    }
    assert!(graph.is_reference_indirect("orders", "orders"));
}

#[test]
fn test_precomputed_comparer_matches_sorted_list() {
    let graph = retail_graph();
    let order = graph.topological_sort(OrderDirection::LeastDependentFirst).unwrap();
    let comparer = DependencyOrderComparer::from_order(order.clone(), NameMatching::case_insensitive().shared());

    let mut shuffled: Vec<String> = order.iter().rev().cloned().collect();
    shuffled.sort_by(|a, b| comparer.compare(a, b));
    assert_eq!(shuffled, order);
}
