#![allow(dead_code)]

use std::collections::BTreeMap;

use dagrun::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use dagrun::dag::DagGraph;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.config.concurrency = n;
        self
    }

    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.config.config.queue_capacity = n;
        self
    }

    pub fn preflight(mut self, val: bool) -> Self {
        self.config.config.preflight = val;
        self
    }

    /// The raw, unvalidated config (for validation tests).
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.to_string(),
                after: vec![],
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// Graph from node keys and `(parent, child)` edges.
pub fn graph_from_edges(keys: &[&str], edges: &[(&str, &str)]) -> DagGraph {
    let mut graph = DagGraph::new();
    for key in keys {
        graph.add_node(*key, None).expect("duplicate key in test graph");
    }
    for (parent, child) in edges {
        graph.add_edge(parent, child).expect("invalid edge in test graph");
    }
    graph
}

/// `keys[0] -> keys[1] -> ... -> keys[n-1]`.
pub fn chain(keys: &[&str]) -> DagGraph {
    let edges: Vec<(&str, &str)> = keys.windows(2).map(|w| (w[0], w[1])).collect();
    graph_from_edges(keys, &edges)
}

/// A -> B, A -> C, B -> D, C -> D.
pub fn diamond() -> DagGraph {
    graph_from_edges(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
    )
}

/// One root `"root"` with `k` independent children `child_0 .. child_{k-1}`.
pub fn fan_out(k: usize) -> DagGraph {
    let mut graph = DagGraph::new();
    graph.add_node("root", None).expect("root");
    for i in 0..k {
        let key = format!("child_{i}");
        graph.add_node(key.clone(), None).expect("child");
        graph.add_edge("root", &key).expect("edge");
    }
    graph
}
