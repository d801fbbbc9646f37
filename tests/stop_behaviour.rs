// tests/stop_behaviour.rs

mod common;
use crate::common::builders::{chain, diamond, graph_from_edges};
use crate::common::{RecordingCallback, init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use dagrun::dispatch::Dispatcher;
use dagrun::errors::DispatchError;
use dagrun::types::ShutdownCause;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_after_completion_is_harmless() -> TestResult {
    init_tracing();

    let recorder = RecordingCallback::new();
    let dispatcher = Dispatcher::new(Arc::new(diamond()), 2, Arc::new(recorder.clone()));

    with_timeout(dispatcher.run()).await?;

    dispatcher.stop();
    dispatcher.stop();
    dispatcher.stop_handle().stop();

    assert!(dispatcher.stop_handle().is_stopped());
    assert_eq!(recorder.call_count(), 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_mid_run_lets_running_callback_finish() -> TestResult {
    init_tracing();

    let recorder = RecordingCallback::new().with_delay_for("A", Duration::from_millis(150));
    let dispatcher = Dispatcher::new(Arc::new(chain(&["A", "B", "C"])), 2, Arc::new(recorder.clone()));
    let handle = dispatcher.stop_handle();

    let stopper = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();
        // Concurrent, repeated stops must not block or panic.
        handle.stop();
    };

    let (report, ()) = with_timeout(async { tokio::join!(dispatcher.run_with_report(), stopper) }).await;

    assert_eq!(report.cause, ShutdownCause::Stopped);
    assert_eq!(report.completed, vec!["A"]);
    assert_eq!(report.never_ran, vec!["B", "C"]);
    assert_eq!(recorder.calls_for("B"), 0);

    let a = recorder.record_for("A").expect("A started");
    assert!(a.finished.is_some());

    match report.into_result() {
        Err(DispatchError::Stopped { completed, total }) => {
            assert_eq!(completed, 1);
            assert_eq!(total, 3);
        }
        other => panic!("expected Stopped, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn stopped_dispatcher_does_not_start_new_runs() -> TestResult {
    init_tracing();

    let recorder = RecordingCallback::new();
    let dispatcher = Dispatcher::new(Arc::new(chain(&["A", "B"])), 1, Arc::new(recorder.clone()));
    dispatcher.stop();

    let report = with_timeout(dispatcher.run_with_report()).await;

    assert_eq!(recorder.call_count(), 0);
    assert_eq!(report.cause, ShutdownCause::Stopped);
    assert!(matches!(
        report.error,
        Some(DispatchError::Stopped { completed: 0, total: 2 })
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_from_many_tasks_at_once() -> TestResult {
    init_tracing();

    let recorder = RecordingCallback::new().with_delay(Duration::from_millis(50));
    let dispatcher = Dispatcher::new(Arc::new(chain(&["A", "B", "C", "D"])), 4, Arc::new(recorder.clone()));

    let mut stoppers = Vec::new();
    for _ in 0..16 {
        let handle = dispatcher.stop_handle();
        stoppers.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.stop();
        }));
    }

    let report = with_timeout(dispatcher.run_with_report()).await;
    for s in stoppers {
        s.await?;
    }

    assert_eq!(report.cause, ShutdownCause::Stopped);
    assert!(report.completed.len() < 4);
    assert!(matches!(report.error, Some(DispatchError::Stopped { .. })));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_after_failure_keeps_the_callback_error() -> TestResult {
    init_tracing();

    let graph = graph_from_edges(&["root", "bad", "slow"], &[("root", "bad"), ("root", "slow")]);
    let recorder = RecordingCallback::new()
        .failing(&["bad"])
        .with_delay_for("slow", Duration::from_millis(150));
    let dispatcher = Dispatcher::new(Arc::new(graph), 2, Arc::new(recorder.clone()));
    let handle = dispatcher.stop_handle();

    let stopper = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop();
    };

    let (report, ()) = with_timeout(async { tokio::join!(dispatcher.run_with_report(), stopper) }).await;

    assert_eq!(report.cause, ShutdownCause::Failed);
    assert_eq!(report.error.as_ref().and_then(DispatchError::failed_key), Some("bad"));
    Ok(())
}
