// src/dag/mod.rs

//! DAG representation.
//!
//! - [`node`] defines the immutable unit of work.
//! - [`provider`] is the read-only interface the dispatcher consumes.
//! - [`graph`] is the in-memory graph used by the CLI and tests.

pub mod graph;
pub mod node;
pub mod provider;

pub use graph::DagGraph;
pub use node::Node;
pub use provider::GraphProvider;
