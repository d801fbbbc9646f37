// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};

use std::error::Error;
use std::fs;

use dagrun::config::{ConfigFile, MAX_QUEUE_CAPACITY, load_and_validate, load_from_path};
use dagrun::errors::DagrunError;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, std::path::PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("Dagrun.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn loads_tasks_and_config_section() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[config]
concurrency = 3
queue_capacity = 16
preflight = false

[task.build]
cmd = "cargo build"

[task.test]
cmd = "cargo test"
after = ["build"]
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.config.concurrency, 3);
    assert_eq!(cfg.config.queue_capacity, 16);
    assert!(!cfg.config.preflight);
    assert_eq!(cfg.task.len(), 2);
    assert_eq!(cfg.task["test"].after, vec!["build"]);
    assert!(cfg.task["build"].after.is_empty());
    Ok(())
}

#[test]
fn config_section_is_optional() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.only]
cmd = "true"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert!(cfg.config.concurrency >= 1);
    assert_eq!(cfg.config.queue_capacity, 0);
    assert!(cfg.config.preflight);
    Ok(())
}

#[test]
fn cycle_is_rejected() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[task.a]
cmd = "true"
after = ["b"]

[task.b]
cmd = "true"
after = ["a"]
"#,
    )?;

    // Parses fine; only validation fails.
    load_from_path(&path)?;

    let err = load_and_validate(&path).unwrap_err();
    match err {
        DagrunError::DagCycle(msg) => assert!(msg.contains("[a, b]"), "{msg}"),
        other => panic!("expected DagCycle, got {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_dependency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").after("missing").build())
        .build_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    match err {
        DagrunError::ConfigError(msg) => assert!(msg.contains("unknown dependency"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn self_dependency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").after("a").build())
        .build_raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    match err {
        DagrunError::ConfigError(msg) => assert!(msg.contains("cannot depend on itself"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_concurrency_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .concurrency(0)
        .with_task("a", TaskConfigBuilder::new("true").build())
        .build_raw();

    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(DagrunError::ConfigError(_))
    ));
}

#[test]
fn queue_capacity_beyond_channel_limit_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .queue_capacity(usize::MAX / 4)
        .with_task("a", TaskConfigBuilder::new("true").build())
        .build_raw();

    match ConfigFile::try_from(raw) {
        Err(DagrunError::ConfigError(msg)) => assert!(msg.contains("queue_capacity"), "{msg}"),
        other => panic!("expected ConfigError, got {other:?}"),
    }

    let at_limit = ConfigFileBuilder::new()
        .queue_capacity(MAX_QUEUE_CAPACITY)
        .with_task("a", TaskConfigBuilder::new("true").build())
        .build_raw();
    assert!(ConfigFile::try_from(at_limit).is_ok());
}

#[test]
fn config_without_tasks_is_rejected() -> TestResult {
    let (_dir, path) = write_config("[config]\nconcurrency = 2\n")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(DagrunError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let (_dir, path) = write_config("[task.a\ncmd = ")?;

    assert!(matches!(load_from_path(&path), Err(DagrunError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() -> TestResult {
    let dir = tempdir()?;
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, DagrunError::IoError(_)));
    Ok(())
}

#[test]
fn every_field_problem_is_reported_at_once() {
    let raw = ConfigFileBuilder::new()
        .concurrency(0)
        .with_task("a", TaskConfigBuilder::new("  ").build())
        .with_task("b", TaskConfigBuilder::new("true").after("ghost").build())
        .build_raw();

    match ConfigFile::try_from(raw) {
        Err(DagrunError::ConfigError(msg)) => {
            assert!(msg.contains("concurrency"), "{msg}");
            assert!(msg.contains("task 'a' has an empty `cmd`"), "{msg}");
            assert!(msg.contains("unknown dependency 'ghost'"), "{msg}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn repeated_dependency_is_tolerated() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_task("b", TaskConfigBuilder::new("true").after("a").after("a").build())
        .build();

    let graph = dagrun::dag::DagGraph::from_config(&cfg)?;
    assert_eq!(graph.edge_count(), 1);
    Ok(())
}
