// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `companion-launcher`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "companion-launcher",
    version,
    about = "Start a companion service with the project's interpreter and mirror its exit status.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML file with extra or overriding `[launcher.<name>]` profiles.
    ///
    /// Without it only the built-in `api` and `dashboard` profiles exist.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Project root that relative working directories and interpreter
    /// paths are resolved against.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `LAUNCHER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start the API service (built-in `api` profile).
    Api(LaunchArgs),

    /// Start the dashboard service (built-in `dashboard` profile).
    Dashboard(LaunchArgs),

    /// Start any configured profile by name.
    Run {
        /// Profile name from `[launcher.<name>]`.
        profile: String,

        #[command(flatten)]
        launch: LaunchArgs,
    },

    /// Make sure the database file exists, creating an empty one if needed.
    InitDb {
        /// Database file path; defaults to `[project].database` under the root.
        #[arg(long, value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct LaunchArgs {
    /// Resolve and print the launch, but don't start the process.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_subcommand_takes_profile_and_dry_run() {
        let args = CliArgs::parse_from([
            "companion-launcher",
            "run",
            "worker",
            "--dry-run",
            "--root",
            "/srv/app",
        ]);
        match args.command {
            Command::Run { profile, launch } => {
                assert_eq!(profile, "worker");
                assert!(launch.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(args.root, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn api_subcommand_defaults_to_real_launch() {
        let args = CliArgs::parse_from(["companion-launcher", "api"]);
        assert!(matches!(args.command, Command::Api(LaunchArgs { dry_run: false })));
        assert!(args.config.is_none());
    }
}
