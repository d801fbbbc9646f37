// src/dispatch/worker.rs

//! Worker loop.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::dag::GraphProvider;
use crate::dispatch::callback::Callback;
use crate::dispatch::ready_queue::ReadyQueue;
use crate::dispatch::run_state::{self, Completion, RunState};
use crate::dispatch::shutdown::Shutdown;
use crate::errors::DispatchError;
use crate::types::ShutdownCause;

/// Everything a worker shares with its siblings for one run.
pub(crate) struct WorkerContext<G: GraphProvider, C: Callback> {
    pub graph: Arc<G>,
    pub callback: Arc<C>,
    pub queue: ReadyQueue,
    pub state: Mutex<RunState>,
    pub shutdown: Shutdown,
}

impl<G: GraphProvider, C: Callback> WorkerContext<G, C> {
    pub fn lock_state(&self) -> MutexGuard<'_, RunState> {
        run_state::lock(&self.state)
    }

    /// Record `err` (first one wins) and shut the run down.
    pub fn fail(&self, err: DispatchError) {
        self.lock_state().record_error(err);
        self.shutdown.request(ShutdownCause::Failed);
    }
}

/// Pull ready nodes and run the callback until shutdown.
///
/// Shutdown is cooperative: it is checked before every dequeue, never while a
/// callback is running.
pub(crate) async fn run_worker<G, C>(id: usize, ctx: Arc<WorkerContext<G, C>>)
where
    G: GraphProvider,
    C: Callback,
{
    debug!(worker = id, "worker started");

    loop {
        let node = tokio::select! {
            biased;
            _ = ctx.shutdown.requested() => {
                debug!(worker = id, cause = %ctx.shutdown.cause(), "shutdown observed; worker exiting");
                break;
            }
            next = ctx.queue.pop() => match next {
                Some(node) => node,
                None => {
                    debug!(worker = id, "ready queue closed; worker exiting");
                    break;
                }
            },
        };

        if ctx.shutdown.is_requested() {
            debug!(worker = id, node = %node.key, "shutdown raced dequeue; not starting node");
            break;
        }

        debug!(worker = id, node = %node.key, "dispatching node");

        match ctx.callback.call(Arc::clone(&node)).await {
            Ok(()) => {
                let outcome = ctx
                    .lock_state()
                    .on_completed(&node, ctx.graph.as_ref(), &ctx.queue);

                match outcome {
                    Ok(Completion::InProgress { completed }) => {
                        debug!(worker = id, node = %node.key, completed, "node completed");
                    }
                    Ok(Completion::AllDone) => {
                        info!(worker = id, node = %node.key, "last node completed; shutting down");
                        ctx.shutdown.request(ShutdownCause::Completed);
                    }
                    Err(err) => {
                        ctx.fail(err);
                        break;
                    }
                }
            }
            Err(source) => {
                warn!(
                    worker = id,
                    node = %node.key,
                    error = %source,
                    "callback failed; requesting shutdown"
                );
                ctx.fail(DispatchError::Callback {
                    key: node.key.clone(),
                    source,
                });
                break;
            }
        }
    }

    debug!(worker = id, "worker finished");
}
