// src/errors.rs

//! Crate-wide error type and exit-code helpers.

use thiserror::Error;

/// Exit code used when the companion process could not be started at all.
///
/// Follows the shell convention for "command not found / not executable" so
/// it stays apart from the codes a healthy child normally returns.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

/// Exit code for configuration and IO failures that happen before any launch.
pub const GENERAL_FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Unknown launcher profile: {0}")]
    UnknownProfile(String),

    #[error("failed to start {name} ({program}): {source}")]
    LaunchError {
        name: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LauncherError {
    /// Process exit code the binary should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::LaunchError { .. } => LAUNCH_FAILURE_EXIT_CODE,
            _ => GENERAL_FAILURE_EXIT_CODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_errors_use_the_reserved_exit_code() {
        let err = LauncherError::LaunchError {
            name: "api".to_string(),
            program: "python".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), LAUNCH_FAILURE_EXIT_CODE);
        assert!(err.to_string().contains("failed to start api (python)"));
    }

    #[test]
    fn config_errors_use_the_general_exit_code() {
        let err = LauncherError::ConfigError("bad".to_string());
        assert_eq!(err.exit_code(), GENERAL_FAILURE_EXIT_CODE);
    }
}
