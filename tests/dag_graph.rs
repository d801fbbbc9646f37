// tests/dag_graph.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder, chain, diamond};

use std::error::Error;

use dagrun::dag::{DagGraph, GraphProvider};
use dagrun::errors::DagrunError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dependency_counts_follow_edges() -> TestResult {
    let graph = diamond();

    let counts: Vec<(String, usize)> = graph
        .nodes()
        .iter()
        .map(|n| (n.key.clone(), n.dependency_count))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("A".to_string(), 0),
            ("B".to_string(), 1),
            ("C".to_string(), 1),
            ("D".to_string(), 2),
        ]
    );
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.roots().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(graph.dependencies_of("D"), vec!["B", "C"]);
    assert_eq!(graph.dependents_of("A"), vec!["B", "C"]);

    let kids: Vec<String> = graph.children_of("A").iter().map(|n| n.key.clone()).collect();
    assert_eq!(kids, vec!["B", "C"]);
    assert!(graph.children_of("missing").is_empty());
    Ok(())
}

#[test]
fn duplicate_node_is_rejected() -> TestResult {
    let mut graph = DagGraph::new();
    graph.add_node("A", None)?;

    let err = graph.add_node("A", None).unwrap_err();
    assert!(matches!(err, DagrunError::DuplicateNode(ref k) if k == "A"));
    assert_eq!(graph.len(), 1);
    Ok(())
}

#[test]
fn edge_to_unknown_node_is_rejected() -> TestResult {
    let mut graph = DagGraph::new();
    graph.add_node("A", None)?;

    let err = graph.add_edge("A", "ghost").unwrap_err();
    assert!(matches!(err, DagrunError::NodeNotFound(ref k) if k == "ghost"));
    Ok(())
}

#[test]
fn edges_that_close_a_cycle_are_rejected() -> TestResult {
    let mut graph = chain(&["A", "B", "C"]);

    let err = graph.add_edge("C", "A").unwrap_err();
    assert!(matches!(err, DagrunError::DagCycle(_)), "got {err:?}");

    let err = graph.add_edge("B", "B").unwrap_err();
    assert!(matches!(err, DagrunError::DagCycle(_)), "got {err:?}");

    // Rejected edges leave the graph untouched.
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.get("A").map(|n| n.dependency_count), Some(0));
    graph.validate()?;
    Ok(())
}

#[test]
fn duplicate_edge_is_ignored() -> TestResult {
    let mut graph = chain(&["A", "B"]);
    graph.add_edge("A", "B")?;

    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.get("B").map(|n| n.dependency_count), Some(1));
    Ok(())
}

#[test]
fn node_handles_are_snapshots() -> TestResult {
    let mut graph = DagGraph::new();
    graph.add_node("A", None)?;
    let b = graph.add_node("B", None)?;
    graph.add_edge("A", "B")?;

    assert_eq!(b.dependency_count, 0);
    assert_eq!(graph.get("B").map(|n| n.dependency_count), Some(1));
    Ok(())
}

#[test]
fn topological_order_respects_every_edge() -> TestResult {
    let graph = diamond();
    let order = graph.topological_order()?;
    let pos = |k: &str| order.iter().position(|o| o == k).expect("key in order");

    for key in graph.keys() {
        for dep in graph.dependencies_of(key) {
            assert!(pos(dep) < pos(key), "{dep} must come before {key}");
        }
    }
    Ok(())
}

#[test]
fn graph_from_config_carries_commands() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_task("build", TaskConfigBuilder::new("make").build())
        .with_task("test", TaskConfigBuilder::new("make test").after("build").build())
        .with_task("lint", TaskConfigBuilder::new("make lint").build())
        .build();

    let graph = DagGraph::from_config(&cfg)?;

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.edge_count(), 1);
    let test = graph.get("test").expect("test node");
    assert_eq!(test.payload.as_deref(), Some("make test"));
    assert_eq!(test.dependency_count, 1);

    let mut roots: Vec<&str> = graph.roots().collect();
    roots.sort();
    assert_eq!(roots, vec!["build", "lint"]);
    Ok(())
}
