// src/dispatch/callback.rs

//! Per-node work function invoked by the workers.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dag::Node;

/// Work performed for each node.
///
/// The dispatcher guarantees that `call` is invoked at most once per node and
/// run, never concurrently for the same node, and only after every direct
/// predecessor's call returned `Ok`. Returning an error fails the run.
///
/// Any `Fn(Arc<Node>) -> impl Future<Output = anyhow::Result<()>>` closure is
/// a `Callback`.
pub trait Callback: Send + Sync + 'static {
    fn call(&self, node: Arc<Node>) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl<F, Fut> Callback for F
where
    F: Fn(Arc<Node>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, node: Arc<Node>) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(self(node))
    }
}
