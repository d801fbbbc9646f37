// src/dispatch/mod.rs

//! The dependency dispatcher.
//!
//! Turns a static dependency graph into a parallel, dependency-respecting
//! execution of a callback:
//!
//! - [`dispatcher`] seeds a run, starts the workers and collects the outcome.
//! - [`task_table`] holds the per-run remaining-dependency counters.
//! - [`run_state`] is the lock-protected state shared by workers, including
//!   the completion bookkeeping that releases children.
//! - [`ready_queue`] is the MPMC queue of runnable nodes.
//! - [`worker`] is the loop each worker runs.
//! - [`shutdown`] is the broadcast stop signal.
//! - [`preflight`] is the optional schedulability check.
//! - [`report`] describes what a run did.

pub mod callback;
pub mod dispatcher;
pub mod preflight;
pub mod ready_queue;
pub mod report;
pub mod run_state;
pub mod shutdown;
pub mod task_table;
mod worker;

pub use callback::Callback;
pub use dispatcher::{DispatchOptions, Dispatcher};
pub use ready_queue::ReadyQueue;
pub use report::RunReport;
pub use run_state::{Completion, RunState};
pub use shutdown::{Shutdown, StopHandle};
pub use task_table::{Decrement, Task, TaskTable};
