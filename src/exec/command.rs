// src/exec/command.rs

//! Shell-command callback.

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::dag::Node;
use crate::dispatch::Callback;

/// Runs each node's payload as a shell command.
///
/// stdout lines are logged at `info`, stderr at `debug`. A non-zero exit
/// status fails the node. Nodes without a payload succeed immediately.
#[derive(Debug, Clone, Default)]
pub struct CommandCallback;

impl CommandCallback {
    pub fn new() -> Self {
        Self
    }
}

impl Callback for CommandCallback {
    fn call(&self, node: Arc<Node>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            match node.payload.as_deref() {
                Some(cmd) => run_command(&node.key, cmd).await,
                None => {
                    debug!(task = %node.key, "no command; nothing to run");
                    Ok(())
                }
            }
        })
    }
}

async fn run_command(task: &str, cmdline: &str) -> Result<()> {
    info!(task = %task, cmd = %cmdline, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", task))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "{}", line);
            }
        });
    }

    // Always consume stderr so buffers don't fill.
    if let Some(stderr) = child.stderr.take() {
        let task_name = task.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", task))?;

    let code = status.code().unwrap_or(-1);
    info!(
        task = %task,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if !status.success() {
        bail!("task '{}' exited with code {}", task, code);
    }

    Ok(())
}
