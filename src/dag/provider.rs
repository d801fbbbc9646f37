// src/dag/provider.rs

//! The read-only graph interface the dispatcher consumes.

use std::sync::Arc;

use crate::dag::node::Node;

/// Immutable dependency graph as seen by the dispatcher.
///
/// Implementations must describe a fixed, acyclic graph for the whole
/// duration of a run: the dispatcher neither locks the provider nor checks
/// for cycles (beyond the optional preflight). Each node's
/// `dependency_count` must equal the number of nodes that list it among
/// their children.
pub trait GraphProvider: Send + Sync + 'static {
    /// Every node in the graph. Roots are dispatched in this order.
    fn nodes(&self) -> Vec<Arc<Node>>;

    /// Direct dependents of `key`. Unknown keys yield an empty list.
    fn children_of(&self, key: &str) -> Vec<Arc<Node>>;

    /// Total number of nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
