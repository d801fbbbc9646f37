// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration exactly as read from a TOML file.
///
/// ```toml
/// [config]
/// concurrency = 4
/// queue_capacity = 0
/// preflight = true
///
/// [task.build]
/// cmd = "make"
///
/// [task.test]
/// cmd = "make test"
/// after = ["build"]
/// ```
///
/// Nothing here has been validated yet; convert into [`ConfigFile`] with
/// `ConfigFile::try_from` to get the checked form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Dispatcher behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `config::validate`),
/// so holders can rely on: at least one task, known `after` references, no
/// cycles, `concurrency >= 1`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }
}

/// Largest accepted `queue_capacity`: the most permits a tokio channel holds.
pub const MAX_QUEUE_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Number of workers pulling from the ready queue.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Ready-queue capacity hint. The queue is always sized to the graph;
    /// the value is only logged when it differs. Must not exceed
    /// [`MAX_QUEUE_CAPACITY`].
    #[serde(default)]
    pub queue_capacity: usize,

    /// Run the best-effort schedulability check before dispatching.
    #[serde(default = "default_preflight")]
    pub preflight: bool,
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_preflight() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            queue_capacity: 0,
            preflight: default_preflight(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Shell command run when the task is dispatched.
    pub cmd: String,

    /// Dependency list: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,
}
