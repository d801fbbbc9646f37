// src/dispatch/ready_queue.rs

//! Multi-producer / multi-consumer queue of nodes that are ready to run.
//!
//! Built on a bounded `tokio::sync::mpsc` channel whose receiver is shared
//! behind an async mutex. The capacity is exactly the number of nodes in the
//! graph: every node is pushed at most once per run, so a push can never
//! find the queue full and producers never block, and more slots would never
//! be used. A configured hint is only logged.

use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error};

use crate::dag::Node;
use crate::errors::DispatchError;

#[derive(Debug, Clone)]
pub struct ReadyQueue {
    tx: mpsc::Sender<Arc<Node>>,
    rx: Arc<Mutex<mpsc::Receiver<Arc<Node>>>>,
    capacity: usize,
}

impl ReadyQueue {
    /// Queue able to hold every node of a graph with `node_count` nodes.
    ///
    /// `hint` is the configured capacity. It never changes the size; a
    /// non-zero hint that differs from the node count is logged.
    pub fn sized_for(node_count: usize, hint: usize) -> Self {
        let capacity = node_count.clamp(1, Semaphore::MAX_PERMITS);
        if hint != 0 && hint != capacity {
            debug!(
                hint,
                node_count,
                capacity,
                "ignoring ready queue capacity hint; sizing to the graph"
            );
        }

        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of nodes currently waiting.
    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueue a ready node without waiting.
    ///
    /// Only fails if the queue is full or closed, neither of which happens
    /// while the capacity covers the whole graph and the queue is alive.
    pub fn push(&self, node: Arc<Node>) -> Result<(), DispatchError> {
        match self.tx.try_send(node) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(node)) | Err(TrySendError::Closed(node)) => {
                error!(
                    node = %node.key,
                    capacity = self.capacity,
                    "ready queue rejected node"
                );
                Err(DispatchError::QueueRejected {
                    key: node.key.clone(),
                })
            }
        }
    }

    /// Wait for the next ready node.
    ///
    /// The receiver lock is held only while waiting, so dropping this future
    /// (e.g. when shutdown wins a `select!`) releases it for other workers.
    pub async fn pop(&self) -> Option<Arc<Node>> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}
