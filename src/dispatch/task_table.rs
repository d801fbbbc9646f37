// src/dispatch/task_table.rs

//! Per-run dependency counters.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use crate::dag::Node;
use crate::types::NodeKey;

/// Remaining-dependency counter for one node.
#[derive(Debug, Clone)]
pub struct Task {
    remaining: usize,
    node: Arc<Node>,
}

impl Task {
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }
}

/// Result of resolving one parent -> child edge.
#[derive(Debug, Clone)]
pub enum Decrement {
    /// Child still waits on this many parents.
    Waiting(usize),
    /// This edge was the child's last dependency; the child is ready now.
    Ready(Arc<Node>),
    /// The child already had no remaining dependencies. Refused.
    Exhausted,
    /// The key is not part of this run.
    Unknown,
}

/// Task table for a single run: node key -> remaining dependency count.
#[derive(Debug, Default)]
pub struct TaskTable {
    tasks: HashMap<NodeKey, Task>,
}

impl TaskTable {
    /// Seed one task per node with `remaining = dependency_count`.
    pub fn seed(nodes: &[Arc<Node>]) -> Self {
        let tasks = nodes
            .iter()
            .map(|node| {
                (
                    node.key.clone(),
                    Task {
                        remaining: node.dependency_count,
                        node: Arc::clone(node),
                    },
                )
            })
            .collect();

        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Task> {
        self.tasks.get(key)
    }

    pub fn remaining(&self, key: &str) -> Option<usize> {
        self.tasks.get(key).map(Task::remaining)
    }

    /// Resolve one dependency of `key`.
    ///
    /// Returns `Ready` exactly once per task: on the 1 -> 0 transition.
    pub fn decrement(&mut self, key: &str) -> Decrement {
        let Some(task) = self.tasks.get_mut(key) else {
            return Decrement::Unknown;
        };

        match task.remaining {
            0 => {
                error!(
                    node = %key,
                    "dependency count already zero; refusing extra decrement"
                );
                Decrement::Exhausted
            }
            1 => {
                task.remaining = 0;
                Decrement::Ready(Arc::clone(&task.node))
            }
            n => {
                task.remaining = n - 1;
                Decrement::Waiting(n - 1)
            }
        }
    }
}
