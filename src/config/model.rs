// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{LauncherError, Result};

/// Placeholder expanded to the project root inside `env` values, `args` and
/// `banner` lines.
pub const ROOT_PLACEHOLDER: &str = "{root}";

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [project]
/// database = "farmtech.db"
///
/// [launcher.worker]
/// title = "Background worker"
/// working_dir = "services/worker"
/// args = ["-m", "worker", "--queue", "default"]
/// interpreter_candidates = [".venv/bin/python"]
/// fallback = "python3"
/// banner = ["Worker: {root}/services/worker"]
///
/// [launcher.worker.env]
/// WORKER_MODE = "dev"
/// ```
///
/// All sections are optional. Profiles named here replace the built-in
/// profile of the same name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub project: ProjectSection,

    /// Profiles from `[launcher.<name>]`.
    #[serde(default)]
    pub launcher: BTreeMap<String, ProfileConfig>,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Database file ensured by `init-db`, relative to the project root.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_database() -> PathBuf {
    PathBuf::from("farmtech.db")
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

/// `[launcher.<name>]` section: static description of one companion process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Human-readable name used in console diagnostics.
    #[serde(default)]
    pub title: Option<String>,

    /// Directory the child starts in; relative paths are joined onto the root.
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Arguments passed to the interpreter, verbatim and without a shell.
    pub args: Vec<String>,

    /// Interpreter paths in priority order; the first one that exists wins.
    /// Relative entries are joined onto the root.
    #[serde(default = "default_interpreter_candidates")]
    pub interpreter_candidates: Vec<String>,

    /// Bare command used, unverified, when no candidate exists on disk.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Lines printed before the child is spawned.
    #[serde(default)]
    pub banner: Vec<String>,

    /// Variables merged over the parent's environment.
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,
}

fn default_working_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_interpreter_candidates() -> Vec<String> {
    vec![
        "services/api/.venv/Scripts/python.exe".to_string(),
        "services/api/.venv/bin/python".to_string(),
    ]
}

fn default_fallback() -> String {
    "python".to_string()
}

fn default_env() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("PYTHONPATH".to_string(), ROOT_PLACEHOLDER.to_string()),
        ("PYTHONIOENCODING".to_string(), "utf-8".to_string()),
    ])
}

impl ProfileConfig {
    /// A profile with the default interpreter list and environment.
    pub fn with_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            working_dir: default_working_dir(),
            args: args.into_iter().map(Into::into).collect(),
            interpreter_candidates: default_interpreter_candidates(),
            fallback: default_fallback(),
            banner: Vec::new(),
            env: default_env(),
        }
    }

    /// Display name, falling back to the profile key.
    pub fn display_title<'a>(&'a self, name: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(name)
    }
}

/// Validated configuration; only obtainable through `TryFrom<RawConfigFile>`
/// or [`ConfigFile::builtin`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub project: ProjectSection,
    pub launcher: BTreeMap<String, ProfileConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        project: ProjectSection,
        launcher: BTreeMap<String, ProfileConfig>,
    ) -> Self {
        Self { project, launcher }
    }

    /// Only the built-in `api` and `dashboard` profiles.
    pub fn builtin() -> Self {
        Self::new_unchecked(ProjectSection::default(), builtin_profiles())
    }

    pub fn profile(&self, name: &str) -> Result<&ProfileConfig> {
        self.launcher
            .get(name)
            .ok_or_else(|| LauncherError::UnknownProfile(name.to_string()))
    }
}

/// The API and dashboard launchers the project ships with.
pub fn builtin_profiles() -> BTreeMap<String, ProfileConfig> {
    let mut api = ProfileConfig::with_args(["start_api.py"]);
    api.title = Some("API".to_string());
    api.banner = vec![format!("Project: {ROOT_PLACEHOLDER}")];

    let mut dashboard = ProfileConfig::with_args([
        "-m",
        "streamlit",
        "run",
        "app.py",
        "--server.port=8501",
    ]);
    dashboard.title = Some("Streamlit dashboard".to_string());
    dashboard.working_dir = PathBuf::from("apps/dashboard");
    dashboard.banner = vec![format!("Dashboard: {ROOT_PLACEHOLDER}/apps/dashboard")];

    BTreeMap::from([
        ("api".to_string(), api),
        ("dashboard".to_string(), dashboard),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_share_interpreters_and_env() {
        let cfg = ConfigFile::builtin();
        let api = cfg.profile("api").unwrap();
        let dashboard = cfg.profile("dashboard").unwrap();

        assert_eq!(api.interpreter_candidates, dashboard.interpreter_candidates);
        assert_eq!(api.fallback, "python");
        assert_eq!(api.banner, vec!["Project: {root}".to_string()]);
        assert_eq!(api.env.get("PYTHONIOENCODING").map(String::as_str), Some("utf-8"));
        assert_eq!(dashboard.working_dir, PathBuf::from("apps/dashboard"));
        assert_eq!(dashboard.args.last().map(String::as_str), Some("--server.port=8501"));
    }

    #[test]
    fn unknown_profile_is_reported_by_name() {
        let err = ConfigFile::builtin().profile("worker").unwrap_err();
        assert!(matches!(err, LauncherError::UnknownProfile(ref n) if n == "worker"));
    }

    #[test]
    fn profile_fields_default_when_omitted() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[launcher.worker]
args = ["worker.py"]
"#,
        )
        .unwrap();
        let worker = &raw.launcher["worker"];
        assert_eq!(worker.working_dir, PathBuf::from("."));
        assert_eq!(worker.interpreter_candidates, default_interpreter_candidates());
        assert_eq!(worker.fallback, "python");
        assert!(worker.banner.is_empty());
        assert_eq!(worker.display_title("worker"), "worker");
        assert_eq!(raw.project.database, PathBuf::from("farmtech.db"));
    }

    #[test]
    fn documented_profile_keys_are_accepted() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[launcher.worker]
title = "Worker"
working_dir = "services/worker"
args = ["worker.py"]
interpreter_candidates = [".venv/bin/python"]
fallback = "python3"
banner = ["Worker: {root}/services/worker"]
env = { WORKER_MODE = "dev" }
"#,
        )
        .unwrap();
        let worker = &raw.launcher["worker"];
        assert_eq!(worker.interpreter_candidates, vec![".venv/bin/python".to_string()]);
        assert_eq!(worker.fallback, "python3");
        assert_eq!(worker.banner, vec!["Worker: {root}/services/worker".to_string()]);
        assert_eq!(worker.env.get("WORKER_MODE").map(String::as_str), Some("dev"));
    }
}
