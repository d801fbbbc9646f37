// src/dag/node.rs

use crate::types::NodeKey;

/// A unit of work in the dependency graph.
///
/// Nodes are owned by a graph provider and handed to the dispatcher as
/// `Arc<Node>`; nothing in a run mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Unique key within the graph.
    pub key: NodeKey,
    /// Number of direct predecessors (in-degree) at graph-build time.
    pub dependency_count: usize,
    /// Opaque data for the callback. The CLI stores the shell command here.
    pub payload: Option<String>,
}

impl Node {
    pub fn new(key: impl Into<NodeKey>) -> Self {
        Self {
            key: key.into(),
            dependency_count: 0,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Whether the node has no predecessors.
    pub fn is_root(&self) -> bool {
        self.dependency_count == 0
    }
}
