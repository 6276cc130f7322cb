// src/lib.rs

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod fs;
pub mod launch;
pub mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cli::{CliArgs, Command, LaunchArgs};
use crate::config::{load_or_builtin, ConfigFile};
use crate::db::{ensure_database_file, DatabaseFile};
use crate::errors::{LauncherError, Result};
use crate::fs::RealFileSystem;
use crate::launch::{Console, LaunchEnv, LaunchPlan, LaunchSpec, Launcher, OsSignals, RealProcessBackend};

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code the process should terminate with. Errors are only
/// returned for failures that were not already reported on the console.
pub async fn run(args: CliArgs) -> Result<i32> {
    let root = project_root(args.root.as_deref())?;
    let cfg = load_or_builtin(&RealFileSystem, args.config.as_deref())?;
    debug!(root = %root.display(), profiles = ?cfg.launcher.keys().collect::<Vec<_>>(), "configuration loaded");

    match args.command {
        Command::Api(launch) => run_profile(&cfg, "api", &root, &launch).await,
        Command::Dashboard(launch) => run_profile(&cfg, "dashboard", &root, &launch).await,
        Command::Run { profile, launch } => run_profile(&cfg, &profile, &root, &launch).await,
        Command::InitDb { path } => init_database(&cfg, &root, path),
    }
}

async fn run_profile(cfg: &ConfigFile, name: &str, root: &Path, args: &LaunchArgs) -> Result<i32> {
    let profile = cfg.profile(name)?;
    let plan = LaunchPlan::from_profile(name, profile, root, &LaunchEnv::from_process());

    if args.dry_run {
        print_dry_run(&plan.resolve(&RealFileSystem));
        return Ok(0);
    }

    let mut launcher = Launcher::new(RealProcessBackend, Arc::new(RealFileSystem), Console::stderr());
    match launcher.run(&plan, &mut OsSignals).await {
        Ok(exit) => Ok(exit.exit_code()),
        // Already reported by the launcher with its own prefix.
        Err(err @ LauncherError::LaunchError { .. }) => Ok(err.exit_code()),
        Err(err) => Err(err),
    }
}

fn init_database(cfg: &ConfigFile, root: &Path, path: Option<PathBuf>) -> Result<i32> {
    let path = path.unwrap_or_else(|| cfg.project.database.clone());
    let path = if path.is_absolute() { path } else { root.join(path) };

    match ensure_database_file(&RealFileSystem, &path)? {
        DatabaseFile::Existing => {
            println!("[init-database] OK: using existing database at {}", path.display());
        }
        DatabaseFile::Created => {
            println!("[init-database] Database created at {}", path.display());
        }
    }
    Ok(0)
}

/// Absolute project root: `--root` if given (relative to the current
/// directory), otherwise the current directory.
fn project_root(arg: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match arg {
        Some(root) if root.is_absolute() => root.to_path_buf(),
        Some(root) => cwd.join(root),
        None => cwd,
    })
}

/// Dry-run output: the fully resolved launch, nothing is started.
fn print_dry_run(spec: &LaunchSpec) {
    println!("companion-launcher dry-run: {}", spec.name());
    println!("  title: {}", spec.title());
    println!("  working_dir: {}", spec.working_dir().display());
    println!(
        "  interpreter: {} ({:?})",
        spec.program().display(),
        spec.interpreter().source
    );
    println!("  command: {}", spec.command_line());
    for line in spec.banner() {
        println!("  banner: {line}");
    }
    if !spec.env().is_empty() {
        println!("  env:");
        for (key, value) in spec.env() {
            println!("    {key}={}", value.to_string_lossy());
        }
    }
}
