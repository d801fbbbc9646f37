// src/errors.rs

//! Crate-wide error types.
//!
//! - [`DagrunError`] covers config loading and graph construction.
//! - [`DispatchError`] is what a dispatcher run resolves to when it does not
//!   complete every node.

use thiserror::Error;

use crate::types::NodeKey;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a dispatcher run did not complete every node.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The callback returned an error. Only the first failure of a run is kept.
    #[error("callback failed for node '{key}': {source:#}")]
    Callback {
        key: NodeKey,
        #[source]
        source: anyhow::Error,
    },

    /// `stop()` was called before every node completed.
    #[error("dispatch stopped after {completed} of {total} nodes")]
    Stopped { completed: usize, total: usize },

    /// Preflight found nodes whose dependency count can never reach zero.
    #[error("graph is not schedulable; nodes never ready: {unreachable:?}")]
    Unschedulable { unreachable: Vec<NodeKey> },

    /// The ready queue refused a node.
    #[error("ready queue rejected node '{key}'")]
    QueueRejected { key: NodeKey },

    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
}

impl DispatchError {
    /// Key of the node whose callback failed, if this is a callback failure.
    pub fn failed_key(&self) -> Option<&str> {
        match self {
            DispatchError::Callback { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagrunError>;
