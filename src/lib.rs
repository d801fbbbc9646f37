// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod dispatch;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::dag::DagGraph;
use crate::dispatch::{DispatchOptions, Dispatcher};
use crate::exec::CommandCallback;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - DAG construction
/// - the dispatcher with the shell-command callback
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    debug!(path = %config_path.display(), "loading config");
    let cfg = load_and_validate(&config_path)?;
    let graph = DagGraph::from_config(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &graph)?;
        return Ok(());
    }

    let options = dispatch_options(&cfg, &args);
    let dispatcher = Dispatcher::with_options(Arc::new(graph), Arc::new(CommandCallback::new()), options);

    // Ctrl-C → cooperative stop; running commands finish.
    let ctrl_c = {
        let handle = dispatcher.stop_handle();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            handle.stop();
        })
    };

    let report = dispatcher.run_with_report().await;
    ctrl_c.abort();

    if !report.never_ran.is_empty() {
        warn!(tasks = ?report.never_ran, "tasks that did not run to completion");
    }

    report.into_result()?;
    Ok(())
}

/// Merge `[config]` with CLI overrides.
fn dispatch_options(cfg: &ConfigFile, args: &CliArgs) -> DispatchOptions {
    let mut options = DispatchOptions::from_config(&cfg.config);
    if let Some(n) = args.concurrency {
        options.concurrency = n;
    }
    if let Some(n) = args.queue_capacity {
        options.queue_capacity = n;
    }
    if args.no_preflight {
        options.preflight = false;
    }
    options
}

/// Simple dry-run output: print tasks, deps, commands and one valid order.
fn print_dry_run(cfg: &ConfigFile, graph: &DagGraph) -> Result<()> {
    println!("dagrun dry-run");
    println!("  config.concurrency = {}", cfg.config.concurrency);
    println!("  config.queue_capacity = {}", cfg.config.queue_capacity);
    println!("  config.preflight = {}", cfg.config.preflight);
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
    }
    println!();

    println!("order:");
    for (i, key) in graph.topological_order()?.iter().enumerate() {
        println!("  {}. {key}", i + 1);
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
