//! Integration tests for constraint sets and their derived graphs

use pretty_assertions::assert_eq;
use relgraph_constraints::{parse_declarations, ConstraintColumn, ConstraintSet};
use relgraph_core::{Config, FieldIdentity, NameMatching, OrderDirection, SequentialIdGenerator};
use std::cmp::Ordering;

fn new_set() -> ConstraintSet {
    ConstraintSet::builder()
        .name_comparer(NameMatching::case_insensitive().shared())
        .id_generator(Box::new(SequentialIdGenerator::default()))
        .default_schema("public")
        .build()
        .unwrap()
}

#[test]
fn test_self_referencing_orders() {
    let mut set = new_set();
    set.add_foreign_key("fk_orders_customer", "orders", "customer_id", "customers", "id");
    set.add_foreign_key("fk_orders_parent", "orders", "parent_order_id", "orders", "id");

    let graph = set.reference_graph();
    assert_eq!(graph.direct_references("orders"), vec!["customers", "orders"]);
    assert!(!graph.is_reference_indirect("orders", "orders"));
    assert_eq!(set.list_tables_sorted().unwrap(), vec!["customers", "orders"]);
}

#[test]
fn test_transitive_dependency() {
    let mut set = new_set();
    set.add_foreign_key("fk_b_a", "B", "a_id", "A", "id");
    set.add_foreign_key("fk_c_b", "C", "b_id", "B", "id");

    let graph = set.reference_graph();
    assert!(!graph.is_direct_reference("C", "A"));
    assert_eq!(graph.compare("C", "A"), Ordering::Greater);
    assert_eq!(set.list_tables_sorted().unwrap(), vec!["A", "B", "C"]);
    assert_eq!(
        set.list_tables_sorted_by(OrderDirection::MostDependentFirst).unwrap(),
        vec!["C", "B", "A"]
    );
}

#[test]
fn test_unrelated_tables() {
    let mut set = new_set();
    set.add_foreign_key("fk_x", "X", "p_id", "P", "id");
    set.add_foreign_key("fk_y", "Y", "q_id", "Q", "id");

    let graph = set.reference_graph();
    assert_eq!(graph.compare("X", "Y"), Ordering::Equal);
    assert!(!graph.is_reference_indirect("X", "Y"));
    assert!(!graph.is_reference_indirect("Y", "X"));
}

#[test]
fn test_multi_column_cascade_order() {
    let mut set = new_set();
    set.add_foreign_key("fk_bin", "shipments", "warehouse_id", "bins", "warehouse_id");
    set.add_foreign_key("fk_bin", "shipments", "aisle", "bins", "aisle");
    set.add_foreign_key("fk_bin", "shipments", "shelf", "bins", "shelf");

    // warehouse_id has the fewest distinct rows, so it filters first
    let rows = |pair: &ConstraintColumn| match pair.column.column.as_str() {
        "warehouse_id" => 4,
        "aisle" => 60,
        _ => 900,
    };
    let mut by_rows = |a: &ConstraintColumn, b: &ConstraintColumn| rows(a).cmp(&rows(b));

    let mut reversed = |a: &ConstraintColumn, b: &ConstraintColumn| rows(b).cmp(&rows(a));
    set.prioritize_multiple(&mut reversed).unwrap();
    set.prioritize_multiple(&mut by_rows).unwrap();

    let bin = set.find_constraint("fk_bin").unwrap();
    let cascade: Vec<_> = bin.columns.column_fields().iter().map(|f| f.column.as_str()).collect();
    assert_eq!(cascade, vec!["warehouse_id", "aisle", "shelf"]);
    for (position, pair) in bin.columns.iter().enumerate() {
        assert_eq!(pair.filter_order, position);
    }

    let referenced = bin
        .columns
        .find_referenced(&FieldIdentity::new("public", "BINS", "Aisle"), set.names());
    assert_eq!(referenced.len(), 1);
}

#[test]
fn test_join_between_constraints() {
    let declarations = parse_declarations(
        r#"[
            {"name": "fk_lines_order", "table": "order_lines", "column": "order_id",
             "referenced_table": "orders", "referenced_column": "id"},
            {"name": "fk_orders_customer", "table": "orders", "column": "customer_id",
             "referenced_table": "customers", "referenced_column": "id"}
        ]"#,
    )
    .unwrap();

    let mut set = ConstraintSet::from_config(&Config::default());
    set.extend_declarations(&declarations).unwrap();
    let graph = set.reference_graph();

    let chain = graph.join_chain("order_lines", "customers").unwrap();
    assert_eq!(chain, vec!["customers", "orders", "order_lines"]);

    let hops: Vec<&str> = chain
        .windows(2)
        .map(|pair| set.find_between(&pair[1], &pair[0])[0].name.as_str())
        .collect();
    assert_eq!(hops, vec!["fk_orders_customer", "fk_lines_order"]);
}

#[test]
fn test_cycle_surfaces_from_sorted_list() {
    let mut set = new_set();
    set.add_foreign_key("fk_a_b", "a", "b_id", "b", "id");
    set.add_foreign_key("fk_b_a", "b", "a_id", "a", "id");

    assert!(set.list_tables_sorted().is_err());
    assert!(set.reference_graph().build_join_chain("a", "c").is_none());
}
