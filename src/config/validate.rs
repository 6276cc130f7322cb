// src/config/validate.rs

use crate::config::model::{builtin_profiles, ConfigFile, ProfileConfig, RawConfigFile};
use crate::errors::{LauncherError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LauncherError;

    /// Validate the file's profiles and lay them over the built-in ones.
    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let mut launcher = builtin_profiles();
        launcher.extend(raw.launcher);
        Ok(ConfigFile::new_unchecked(raw.project, launcher))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.database.as_os_str().is_empty() {
        return Err(LauncherError::ConfigError(
            "[project].database must not be empty".to_string(),
        ));
    }

    for (name, profile) in cfg.launcher.iter() {
        validate_profile(name, profile)?;
    }
    Ok(())
}

fn validate_profile(name: &str, profile: &ProfileConfig) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LauncherError::ConfigError(
            "launcher profile names must not be empty".to_string(),
        ));
    }

    if profile.args.is_empty() {
        return Err(LauncherError::ConfigError(format!(
            "[launcher.{name}].args must name the script or module to run"
        )));
    }

    for candidate in profile.interpreter_candidates.iter() {
        if candidate.trim().is_empty() {
            return Err(LauncherError::ConfigError(format!(
                "[launcher.{name}].interpreter_candidates contains an empty entry"
            )));
        }
        if !has_path_separator(candidate) {
            return Err(LauncherError::ConfigError(format!(
                "[launcher.{name}].interpreter_candidates entry '{candidate}' is a bare command; \
                 use `fallback` for commands looked up on the search path"
            )));
        }
    }

    if profile.fallback.trim().is_empty() {
        return Err(LauncherError::ConfigError(format!(
            "[launcher.{name}].fallback must not be empty"
        )));
    }
    if has_path_separator(&profile.fallback) {
        return Err(LauncherError::ConfigError(format!(
            "[launcher.{name}].fallback '{}' must be a bare command name, not a path",
            profile.fallback
        )));
    }

    for key in profile.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(LauncherError::ConfigError(format!(
                "[launcher.{name}].env has invalid variable name '{key}'"
            )));
        }
    }

    Ok(())
}

fn has_path_separator(entry: &str) -> bool {
    entry.contains('/') || entry.contains('\\')
}
