// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and the built-in profiles (`model.rs`).
//! - Load an optional config file from disk (`loader.rs`).
//! - Validate profiles before anything is launched (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_builtin};
pub use model::{ConfigFile, ProfileConfig, ProjectSection, RawConfigFile};
