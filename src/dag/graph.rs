// src/dag/graph.rs

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::dag::node::Node;
use crate::dag::provider::GraphProvider;
use crate::errors::{DagrunError, Result};
use crate::types::NodeKey;

/// In-memory DAG keyed by node key.
///
/// Nodes keep their insertion order, which is also the order roots are
/// seeded into a dispatcher run. Children keep the order their edges were
/// added. Cycles are refused edge by edge in [`DagGraph::add_edge`], so a
/// graph built only through this API is always acyclic.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: Vec<Arc<Node>>,
    index: HashMap<NodeKey, usize>,
    /// Direct dependencies, by node position.
    parents: Vec<Vec<usize>>,
    /// Direct dependents, by node position.
    children: Vec<Vec<usize>>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DAG from a validated [`ConfigFile`].
    ///
    /// Each task becomes a node whose payload is its `cmd`; every entry in
    /// `after` becomes an edge `dep -> task`.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut graph = Self::new();

        for (name, task) in cfg.task.iter() {
            graph.add_node(name.clone(), Some(task.cmd.clone()))?;
        }

        for (name, task) in cfg.task.iter() {
            for dep in task.after.iter() {
                graph.add_edge(dep, name)?;
            }
        }

        Ok(graph)
    }

    /// Insert a node with no dependencies.
    ///
    /// The returned handle is a snapshot: edges added later bump the graph's
    /// copy of the node, not this one.
    pub fn add_node(&mut self, key: impl Into<NodeKey>, payload: Option<String>) -> Result<Arc<Node>> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(DagrunError::DuplicateNode(key));
        }

        let node = Arc::new(Node {
            key: key.clone(),
            dependency_count: 0,
            payload,
        });

        self.index.insert(key, self.nodes.len());
        self.nodes.push(Arc::clone(&node));
        self.parents.push(Vec::new());
        self.children.push(Vec::new());

        Ok(node)
    }

    /// Declare that `child` depends on `parent`.
    ///
    /// Adding the same edge twice is a no-op. An edge that would close a
    /// cycle (including a self-edge) is rejected with `DagCycle`.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let p = self.position(parent)?;
        let c = self.position(child)?;

        if p == c {
            return Err(DagrunError::DagCycle(format!(
                "node '{}' cannot depend on itself",
                parent
            )));
        }

        if self.children[p].contains(&c) {
            debug!(parent = %parent, child = %child, "edge already present; ignoring");
            return Ok(());
        }

        if self.reaches(c, p) {
            return Err(DagrunError::DagCycle(format!(
                "edge '{}' -> '{}' would close a cycle",
                parent, child
            )));
        }

        self.children[p].push(c);
        self.parents[c].push(p);
        Arc::make_mut(&mut self.nodes[c]).dependency_count += 1;

        Ok(())
    }

    /// Check acyclicity with a full topological sort.
    ///
    /// Graphs built through `add_edge` always pass; this exists for callers
    /// that want an explicit check before handing the graph to a dispatcher.
    pub fn validate(&self) -> Result<()> {
        self.topological_order().map(|_| ())
    }

    /// One valid topological order of all node keys.
    pub fn topological_order(&self) -> Result<Vec<NodeKey>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(self.nodes.len(), self.edge_count());
        let indices: Vec<_> = (0..self.nodes.len()).map(|i| graph.add_node(i)).collect();

        for (p, kids) in self.children.iter().enumerate() {
            for &c in kids {
                graph.add_edge(indices[p], indices[c], ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .map(|ix| self.nodes[graph[ix]].key.clone())
                .collect()),
            Err(cycle) => Err(DagrunError::DagCycle(format!(
                "cycle detected in DAG involving node '{}'",
                self.nodes[graph[cycle.node_id()]].key
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Node>> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    /// Return all node keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.key.as_str())
    }

    /// Nodes without dependencies, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.key.as_str())
    }

    /// Immediate dependencies of a node.
    pub fn dependencies_of(&self, key: &str) -> Vec<&str> {
        self.index
            .get(key)
            .map(|&i| self.parents[i].iter().map(|&p| self.nodes[p].key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Immediate dependents of a node.
    pub fn dependents_of(&self, key: &str) -> Vec<&str> {
        self.index
            .get(key)
            .map(|&i| self.children[i].iter().map(|&c| self.nodes[c].key.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    fn position(&self, key: &str) -> Result<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| DagrunError::NodeNotFound(key.to_string()))
    }

    /// Whether `to` is reachable from `from` along child edges.
    fn reaches(&self, from: usize, to: usize) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];

        while let Some(i) = stack.pop() {
            if i == to {
                return true;
            }
            if std::mem::replace(&mut visited[i], true) {
                continue;
            }
            stack.extend(self.children[i].iter().copied());
        }

        false
    }
}

impl GraphProvider for DagGraph {
    fn nodes(&self) -> Vec<Arc<Node>> {
        self.nodes.clone()
    }

    fn children_of(&self, key: &str) -> Vec<Arc<Node>> {
        self.index
            .get(key)
            .map(|&i| {
                self.children[i]
                    .iter()
                    .map(|&c| Arc::clone(&self.nodes[c]))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
