use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use dagrun::dag::Node;
use dagrun::dispatch::Callback;
use futures::future::BoxFuture;

/// One callback invocation, stamped with global sequence numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub key: String,
    pub started: usize,
    /// `None` while the call is still running.
    pub finished: Option<usize>,
    pub ok: bool,
}

#[derive(Default)]
struct Inner {
    clock: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    records: Mutex<Vec<CallRecord>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    delay_for: HashMap<String, Duration>,
}

/// A callback that records when each node started and finished.
///
/// Clones share the same log, so a test keeps one clone and hands another to
/// the dispatcher.
#[derive(Clone, Default)]
pub struct RecordingCallback {
    inner: Arc<Inner>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call for each of `keys`.
    pub fn failing(mut self, keys: &[&str]) -> Self {
        self.inner_mut().failing = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Sleep this long in every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inner_mut().delay = Some(delay);
        self
    }

    /// Sleep this long in the call for `key` (overrides `with_delay`).
    pub fn with_delay_for(mut self, key: &str, delay: Duration) -> Self {
        self.inner_mut().delay_for.insert(key.to_string(), delay);
        self
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::get_mut(&mut self.inner).expect("configure RecordingCallback before cloning it")
    }

    pub fn records(&self) -> Vec<CallRecord> {
        self.inner.records.lock().unwrap().clone()
    }

    /// Keys in the order their calls started.
    pub fn started_order(&self) -> Vec<String> {
        let mut records = self.records();
        records.sort_by_key(|r| r.started);
        records.into_iter().map(|r| r.key).collect()
    }

    pub fn call_count(&self) -> usize {
        self.inner.records.lock().unwrap().len()
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.inner
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.key == key)
            .count()
    }

    pub fn record_for(&self, key: &str) -> Option<CallRecord> {
        self.inner
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.key == key)
            .cloned()
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Callback for RecordingCallback {
    fn call(&self, node: Arc<Node>) -> BoxFuture<'static, anyhow::Result<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let key = node.key.clone();
            let started = inner.clock.fetch_add(1, Ordering::SeqCst);
            let index = {
                let mut records = inner.records.lock().unwrap();
                records.push(CallRecord {
                    key: key.clone(),
                    started,
                    finished: None,
                    ok: false,
                });
                records.len() - 1
            };

            let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = inner.delay_for.get(&key).copied().or(inner.delay);
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            let ok = !inner.failing.contains(&key);
            inner.in_flight.fetch_sub(1, Ordering::SeqCst);

            let finished = inner.clock.fetch_add(1, Ordering::SeqCst);
            {
                let mut records = inner.records.lock().unwrap();
                records[index].finished = Some(finished);
                records[index].ok = ok;
            }

            if ok {
                Ok(())
            } else {
                Err(anyhow!("injected failure for '{key}'"))
            }
        })
    }
}
