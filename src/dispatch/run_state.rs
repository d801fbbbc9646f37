// src/dispatch/run_state.rs

//! Mutable state shared by all workers of one run.
//!
//! Everything in here sits behind a single `std::sync::Mutex`. The lock is
//! taken for completion bookkeeping and error recording only; it is never
//! held across an `.await` or a callback.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::dag::{GraphProvider, Node};
use crate::dispatch::ready_queue::ReadyQueue;
use crate::dispatch::task_table::{Decrement, TaskTable};
use crate::errors::DispatchError;
use crate::types::NodeKey;

/// What a successful completion did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// More nodes remain; `completed` is the new completed count.
    InProgress { completed: usize },
    /// This completion was the last node of the graph.
    AllDone,
}

#[derive(Debug)]
pub struct RunState {
    table: TaskTable,
    total: usize,
    completed: Vec<NodeKey>,
    edges_resolved: usize,
    first_error: Option<DispatchError>,
}

impl RunState {
    pub fn new(table: TaskTable, total: usize) -> Self {
        Self {
            table,
            total,
            completed: Vec::with_capacity(total),
            edges_resolved: 0,
            first_error: None,
        }
    }

    /// Completion bookkeeping for a node whose callback succeeded.
    ///
    /// Resolves one dependency per direct child, enqueues children that
    /// became ready, and advances the completed count. Since decrement and
    /// readiness check happen under the same lock, a child shared by parents
    /// finishing concurrently is enqueued exactly once.
    pub fn on_completed<G>(
        &mut self,
        node: &Node,
        graph: &G,
        queue: &ReadyQueue,
    ) -> Result<Completion, DispatchError>
    where
        G: GraphProvider + ?Sized,
    {
        for child in graph.children_of(&node.key) {
            match self.table.decrement(&child.key) {
                Decrement::Ready(ready) => {
                    self.edges_resolved += 1;
                    debug!(node = %ready.key, parent = %node.key, "node ready");
                    queue.push(ready)?;
                }
                Decrement::Waiting(remaining) => {
                    self.edges_resolved += 1;
                    debug!(
                        node = %child.key,
                        parent = %node.key,
                        remaining,
                        "dependency resolved"
                    );
                }
                Decrement::Exhausted => {}
                Decrement::Unknown => {
                    warn!(
                        node = %child.key,
                        parent = %node.key,
                        "child not present in task table; skipping"
                    );
                }
            }
        }

        self.completed.push(node.key.clone());
        let completed = self.completed.len();

        if completed == self.total {
            Ok(Completion::AllDone)
        } else {
            Ok(Completion::InProgress { completed })
        }
    }

    /// Keep `err` as the run's error unless one is already recorded.
    ///
    /// Returns `true` if `err` was kept.
    pub fn record_error(&mut self, err: DispatchError) -> bool {
        if self.first_error.is_some() {
            debug!(error = %err, "run already failed; discarding later error");
            return false;
        }
        self.first_error = Some(err);
        true
    }

    pub fn first_error(&self) -> Option<&DispatchError> {
        self.first_error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<DispatchError> {
        self.first_error.take()
    }

    pub fn completed(&self) -> &[NodeKey] {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn edges_resolved(&self) -> usize {
        self.edges_resolved
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }
}

/// Lock the run state, recovering the data from a poisoned mutex.
///
/// Callbacks never run under this lock, so a poisoned lock still holds
/// consistent counters.
pub(crate) fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
