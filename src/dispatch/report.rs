// src/dispatch/report.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::dag::Node;
use crate::errors::DispatchError;
use crate::types::{NodeKey, ShutdownCause};

/// Outcome of one dispatcher run.
///
/// `run()` collapses this into `Result<(), DispatchError>`; callers that need
/// to know which nodes were abandoned after a failure or stop use
/// `run_with_report()` instead.
#[derive(Debug)]
pub struct RunReport {
    /// Number of nodes in the graph.
    pub total: usize,
    /// Nodes whose callback succeeded, in completion order.
    pub completed: Vec<NodeKey>,
    /// Nodes whose callback did not succeed in this run, in graph order.
    /// Includes the failed node itself.
    pub never_ran: Vec<NodeKey>,
    /// Child-decrement operations performed during the run.
    pub edges_resolved: usize,
    pub cause: ShutdownCause,
    pub error: Option<DispatchError>,
}

impl RunReport {
    /// Report for a run that finished, failed or was stopped.
    pub(crate) fn finished(
        nodes: &[Arc<Node>],
        completed: Vec<NodeKey>,
        edges_resolved: usize,
        cause: ShutdownCause,
        error: Option<DispatchError>,
    ) -> Self {
        let done: HashSet<&str> = completed.iter().map(String::as_str).collect();
        let never_ran = nodes
            .iter()
            .filter(|n| !done.contains(n.key.as_str()))
            .map(|n| n.key.clone())
            .collect();

        Self {
            total: nodes.len(),
            completed,
            never_ran,
            edges_resolved,
            cause,
            error,
        }
    }

    /// Report for a run refused before any worker started.
    pub(crate) fn not_started(nodes: &[Arc<Node>], error: DispatchError) -> Self {
        Self::finished(nodes, Vec::new(), 0, ShutdownCause::Failed, Some(error))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<(), DispatchError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
