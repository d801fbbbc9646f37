#![allow(dead_code)]

pub use dagrun_test_utils::builders;
pub use dagrun_test_utils::recording::RecordingCallback;
pub use dagrun_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use dagrun::dag::DagGraph;
use dagrun::dispatch::{DispatchOptions, Dispatcher, RunReport};

/// Run `graph` once with `recorder` on `concurrency` workers.
pub async fn run_recorded(
    graph: DagGraph,
    concurrency: usize,
    recorder: &RecordingCallback,
) -> RunReport {
    let dispatcher = Dispatcher::with_options(
        Arc::new(graph),
        Arc::new(recorder.clone()),
        DispatchOptions::with_concurrency(concurrency),
    );
    with_timeout(dispatcher.run_with_report()).await
}

/// Assert every started child began after all of its parents finished.
pub fn assert_dependency_order(graph: &DagGraph, recorder: &RecordingCallback) {
    for child in recorder.records() {
        for parent in graph.dependencies_of(&child.key) {
            let p = recorder
                .record_for(parent)
                .unwrap_or_else(|| panic!("{} ran but its parent {parent} did not", child.key));
            let finished = p
                .finished
                .unwrap_or_else(|| panic!("parent {parent} of {} never finished", child.key));
            assert!(
                finished < child.started,
                "{} started (seq {}) before parent {parent} finished (seq {finished})",
                child.key,
                child.started
            );
            assert!(p.ok, "{} ran although parent {parent} failed", child.key);
        }
    }
}
