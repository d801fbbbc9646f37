// src/dispatch/dispatcher.rs

use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::model::ConfigSection;
use crate::dag::GraphProvider;
use crate::dispatch::callback::Callback;
use crate::dispatch::preflight;
use crate::dispatch::ready_queue::ReadyQueue;
use crate::dispatch::report::RunReport;
use crate::dispatch::run_state::{self, RunState};
use crate::dispatch::shutdown::{Shutdown, StopHandle};
use crate::dispatch::task_table::TaskTable;
use crate::dispatch::worker::{WorkerContext, run_worker};
use crate::errors::DispatchError;
use crate::types::ShutdownCause;

/// Knobs for a [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Number of workers. Clamped to at least 1.
    pub concurrency: usize,
    /// Ready-queue capacity hint. Informational only: the queue always holds
    /// exactly the graph's node count.
    pub queue_capacity: usize,
    /// Run the schedulability check before seeding.
    pub preflight: bool,
}

impl DispatchOptions {
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &ConfigSection) -> Self {
        Self {
            concurrency: cfg.concurrency,
            queue_capacity: cfg.queue_capacity,
            preflight: cfg.preflight,
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            queue_capacity: 0,
            preflight: true,
        }
    }
}

/// Runs a callback over every node of a dependency graph, in dependency
/// order, on a fixed pool of workers.
///
/// - A node starts only after all of its direct predecessors' callbacks
///   returned `Ok`.
/// - Nodes that are ready at the same time run in no particular order.
/// - The first callback error stops dispatching new nodes; callbacks already
///   running finish, and the error is returned from [`Dispatcher::run`].
///
/// The graph is only read. A dispatcher can be run any number of times; each
/// run seeds fresh per-run state.
pub struct Dispatcher<G: GraphProvider, C: Callback> {
    graph: Arc<G>,
    callback: Arc<C>,
    options: DispatchOptions,
    stop: CancellationToken,
}

impl<G: GraphProvider, C: Callback> Dispatcher<G, C> {
    pub fn new(graph: Arc<G>, concurrency: usize, callback: Arc<C>) -> Self {
        Self::with_options(graph, callback, DispatchOptions::with_concurrency(concurrency))
    }

    pub fn with_options(graph: Arc<G>, callback: Arc<C>, mut options: DispatchOptions) -> Self {
        if options.concurrency == 0 {
            warn!("dispatcher concurrency 0 requested; using 1");
            options.concurrency = 1;
        }

        Self {
            graph,
            callback,
            options,
            stop: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Stop the current run (if any) and every later one.
    ///
    /// Idempotent and non-blocking. Callbacks already running are not
    /// interrupted; an error already recorded by the run is kept.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            info!("stopping dag dispatcher");
        }
        self.stop.cancel();
    }

    /// Handle for stopping this dispatcher from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(self.stop.clone())
    }

    /// Dispatch every node. Resolves once all workers have exited.
    ///
    /// Returns `Ok(())` only if every node's callback succeeded.
    pub async fn run(&self) -> Result<(), DispatchError> {
        self.run_with_report().await.into_result()
    }

    /// Like [`Dispatcher::run`] but also reports which nodes completed and
    /// which never ran.
    pub async fn run_with_report(&self) -> RunReport {
        let nodes = self.graph.nodes();
        let total = nodes.len();

        if total == 0 {
            debug!("empty graph; nothing to dispatch");
            return RunReport::finished(&nodes, Vec::new(), 0, ShutdownCause::Completed, None);
        }

        if self.options.preflight {
            if let Err(err) = preflight::check(self.graph.as_ref()) {
                error!(error = %err, "preflight check failed; not dispatching");
                return RunReport::not_started(&nodes, err);
            }
        }

        let queue = ReadyQueue::sized_for(total, self.options.queue_capacity);
        let table = TaskTable::seed(&nodes);

        let mut roots = 0usize;
        for node in nodes.iter().filter(|n| table.remaining(&n.key) == Some(0)) {
            if let Err(err) = queue.push(Arc::clone(node)) {
                return RunReport::not_started(&nodes, err);
            }
            roots += 1;
        }

        if roots == 0 {
            let err = DispatchError::Unschedulable {
                unreachable: nodes.iter().map(|n| n.key.clone()).collect(),
            };
            error!(total, "no node without dependencies; not dispatching");
            return RunReport::not_started(&nodes, err);
        }

        info!(
            total,
            roots,
            concurrency = self.options.concurrency,
            queue_capacity = queue.capacity(),
            "starting dag dispatcher"
        );

        let ctx = Arc::new(WorkerContext {
            graph: Arc::clone(&self.graph),
            callback: Arc::clone(&self.callback),
            queue,
            state: Mutex::new(RunState::new(table, total)),
            shutdown: Shutdown::child_of(&self.stop),
        });

        let mut workers = JoinSet::new();
        for id in 0..self.options.concurrency {
            workers.spawn(run_worker(id, Arc::clone(&ctx)));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "worker task failed");
                ctx.fail(DispatchError::WorkerPanicked(err.to_string()));
            }
        }

        let cause = ctx.shutdown.cause();
        let mut state = run_state::lock(&ctx.state);
        let completed = state.completed().to_vec();
        let edges_resolved = state.edges_resolved();
        let mut err = state.take_error();
        drop(state);

        if err.is_none() && completed.len() < total {
            err = Some(DispatchError::Stopped {
                completed: completed.len(),
                total,
            });
        }

        match &err {
            None => info!(total, edges_resolved, "dag dispatcher finished"),
            Some(e) => warn!(
                completed = completed.len(),
                total,
                %cause,
                error = %e,
                "dag dispatcher finished without completing every node"
            ),
        }

        RunReport::finished(&nodes, completed, edges_resolved, cause, err)
    }
}
