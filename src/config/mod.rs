// src/config/mod.rs

//! Configuration loading and validation for dagrun.
//!
//! - Data model for the TOML task file (`model.rs`).
//! - Loading from disk (`loader.rs`).
//! - Semantic checks: unknown dependencies, cycles, sane `[config]` values
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, MAX_QUEUE_CAPACITY, RawConfigFile, TaskConfig};
pub use validate::validate_config;
