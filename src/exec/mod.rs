// src/exec/mod.rs

//! Process execution layer.
//!
//! [`command`] provides the callback the CLI hands to the dispatcher: each
//! node's payload is run as a shell command with `tokio::process::Command`.

pub mod command;

pub use command::CommandCallback;
