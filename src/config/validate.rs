// src/config/validate.rs

use std::collections::{BTreeMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::config::model::{
    ConfigFile, ConfigSection, MAX_QUEUE_CAPACITY, RawConfigFile, TaskConfig,
};
use crate::errors::{DagrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DagrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

/// Run every semantic check on a raw config.
///
/// Field-level problems are collected and reported together as one
/// `ConfigError`; the cycle check only runs once every `after` reference
/// resolves.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(DagrunError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }

    let mut problems = Vec::new();
    check_section(&cfg.config, &mut problems);
    for (name, task) in cfg.task.iter() {
        check_task(name, task, &cfg.task, &mut problems);
    }

    if !problems.is_empty() {
        return Err(DagrunError::ConfigError(problems.join("; ")));
    }

    check_acyclic(&cfg.task)
}

fn check_section(section: &ConfigSection, problems: &mut Vec<String>) {
    if section.concurrency == 0 {
        problems.push("[config].concurrency must be >= 1 (got 0)".to_string());
    }
    if section.queue_capacity > MAX_QUEUE_CAPACITY {
        problems.push(format!(
            "[config].queue_capacity must be <= {MAX_QUEUE_CAPACITY} (got {})",
            section.queue_capacity
        ));
    }
}

fn check_task(
    name: &str,
    task: &TaskConfig,
    all: &BTreeMap<String, TaskConfig>,
    problems: &mut Vec<String>,
) {
    if task.cmd.trim().is_empty() {
        problems.push(format!("task '{name}' has an empty `cmd`"));
    }

    let mut seen = HashSet::new();
    for dep in task.after.iter() {
        if !seen.insert(dep.as_str()) {
            warn!(task = %name, dep = %dep, "dependency listed twice in `after`");
            continue;
        }
        if dep == name {
            problems.push(format!("task '{name}' cannot depend on itself in `after`"));
        } else if !all.contains_key(dep) {
            problems.push(format!(
                "task '{name}' has unknown dependency '{dep}' in `after`"
            ));
        }
    }
}

/// Reject cycles, naming every task that takes part in one.
fn check_acyclic(tasks: &BTreeMap<String, TaskConfig>) -> Result<()> {
    // dep -> task, so `[task.B] after = ["A"]` is A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (name, task) in tasks.iter() {
        graph.add_node(name.as_str());
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    let mut cycles: Vec<Vec<&str>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|mut scc| {
            scc.sort_unstable();
            scc
        })
        .collect();

    if cycles.is_empty() {
        return Ok(());
    }

    cycles.sort();
    let listed: Vec<String> = cycles
        .iter()
        .map(|members| format!("[{}]", members.join(", ")))
        .collect();

    Err(DagrunError::DagCycle(format!(
        "cycle detected in task DAG between tasks {}",
        listed.join(" and ")
    )))
}
