// src/dispatch/preflight.rs

//! Best-effort schedulability check run before seeding.
//!
//! This is not graph validation. It replays the run with plain counters
//! (Kahn's algorithm over the provider's in-degrees and children) and
//! reports nodes that could never become ready: members of a cycle, their
//! descendants, and nodes whose declared `dependency_count` disagrees with
//! the edges the provider actually reports.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::dag::GraphProvider;
use crate::errors::DispatchError;
use crate::types::NodeKey;

pub fn check<G>(graph: &G) -> Result<(), DispatchError>
where
    G: GraphProvider + ?Sized,
{
    let nodes = graph.nodes();

    let children: HashMap<NodeKey, Vec<NodeKey>> = nodes
        .iter()
        .map(|n| {
            let kids = graph
                .children_of(&n.key)
                .into_iter()
                .map(|c| c.key.clone())
                .collect();
            (n.key.clone(), kids)
        })
        .collect();

    let mut incoming: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    for kid in children.values().flatten() {
        *incoming.entry(kid.as_str()).or_default() += 1;
    }

    let mismatched: Vec<NodeKey> = nodes
        .iter()
        .filter(|n| incoming.get(n.key.as_str()).copied().unwrap_or(0) != n.dependency_count)
        .map(|n| n.key.clone())
        .collect();

    if !mismatched.is_empty() {
        warn!(
            nodes = ?mismatched,
            "declared dependency counts disagree with reported edges"
        );
    }

    let mut remaining: HashMap<&str, usize> = nodes
        .iter()
        .map(|n| (n.key.as_str(), n.dependency_count))
        .collect();
    let mut ready: VecDeque<&str> = nodes
        .iter()
        .filter(|n| n.dependency_count == 0)
        .map(|n| n.key.as_str())
        .collect();
    let mut reached = 0usize;

    while let Some(key) = ready.pop_front() {
        reached += 1;
        for kid in children.get(key).into_iter().flatten() {
            if let Some(count) = remaining.get_mut(kid.as_str()) {
                if *count == 1 {
                    ready.push_back(kid.as_str());
                }
                *count = count.saturating_sub(1);
            }
        }
    }

    debug!(reached, total = nodes.len(), "preflight replay finished");

    if reached == nodes.len() && mismatched.is_empty() {
        return Ok(());
    }

    let mut unreachable: Vec<NodeKey> = nodes
        .iter()
        .filter(|n| remaining.get(n.key.as_str()).copied().unwrap_or(0) > 0)
        .map(|n| n.key.clone())
        .collect();
    for key in mismatched {
        if !unreachable.contains(&key) {
            unreachable.push(key);
        }
    }

    Err(DispatchError::Unschedulable { unreachable })
}
