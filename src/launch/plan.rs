// src/launch/plan.rs

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::model::{ProfileConfig, ROOT_PLACEHOLDER};
use crate::fs::FileSystem;

use super::interpreter::{resolve_interpreter, Candidate, ResolvedInterpreter};

/// Environment-derived inputs, read once at the program entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    /// Interpreter override (`PYTHON`), tried before every other candidate.
    pub interpreter_override: Option<PathBuf>,
}

impl LaunchEnv {
    pub const INTERPRETER_VAR: &'static str = "PYTHON";

    pub fn from_process() -> Self {
        Self::from_override(std::env::var_os(Self::INTERPRETER_VAR))
    }

    /// Empty values count as unset.
    pub fn from_override(value: Option<OsString>) -> Self {
        Self {
            interpreter_override: value.filter(|v| !v.is_empty()).map(PathBuf::from),
        }
    }
}

/// Everything needed to launch one companion process, before the
/// interpreter is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub name: String,
    pub title: String,
    pub working_dir: PathBuf,
    pub candidates: Vec<Candidate>,
    pub fallback: String,
    pub banner: Vec<String>,
    pub args: Vec<OsString>,
    pub env: BTreeMap<String, OsString>,
}

impl LaunchPlan {
    /// Build a plan from a configured profile.
    ///
    /// `{root}` in args and env values expands to `root` byte for byte, so a
    /// root that is not valid UTF-8 still reaches the child intact.
    pub fn from_profile(name: &str, profile: &ProfileConfig, root: &Path, env: &LaunchEnv) -> Self {
        let mut candidates = Vec::with_capacity(profile.interpreter_candidates.len() + 1);
        if let Some(path) = &env.interpreter_override {
            candidates.push(Candidate::Override(path.clone()));
        }
        candidates.extend(
            profile
                .interpreter_candidates
                .iter()
                .map(|entry| Candidate::from_config_entry(entry, root)),
        );

        let working_dir = if profile.working_dir.is_absolute() {
            profile.working_dir.clone()
        } else if profile.working_dir == Path::new(".") {
            root.to_path_buf()
        } else {
            root.join(&profile.working_dir)
        };

        let root_display = root.display().to_string();

        Self {
            name: name.to_string(),
            title: profile.display_title(name).to_string(),
            working_dir,
            candidates,
            fallback: profile.fallback.clone(),
            banner: profile
                .banner
                .iter()
                .map(|line| line.replace(ROOT_PLACEHOLDER, &root_display))
                .collect(),
            args: profile.args.iter().map(|a| expand_root(a, root)).collect(),
            env: profile
                .env
                .iter()
                .map(|(k, v)| (k.clone(), expand_root(v, root)))
                .collect(),
        }
    }

    /// Choose the interpreter and freeze the plan.
    pub fn resolve(&self, fs: &dyn FileSystem) -> LaunchSpec {
        LaunchSpec {
            name: self.name.clone(),
            title: self.title.clone(),
            working_dir: self.working_dir.clone(),
            interpreter: resolve_interpreter(&self.candidates, &self.fallback, fs),
            banner: self.banner.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }
}

fn expand_root(value: &str, root: &Path) -> OsString {
    let mut parts = value.split(ROOT_PLACEHOLDER);
    let mut out = OsString::from(parts.next().unwrap_or_default());
    for part in parts {
        out.push(root.as_os_str());
        out.push(part);
    }
    out
}

/// A resolved, immutable launch: interpreter chosen, nothing left to decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    name: String,
    title: String,
    working_dir: PathBuf,
    interpreter: ResolvedInterpreter,
    banner: Vec<String>,
    args: Vec<OsString>,
    env: BTreeMap<String, OsString>,
}

impl LaunchSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn interpreter(&self) -> &ResolvedInterpreter {
        &self.interpreter
    }

    pub fn program(&self) -> &Path {
        &self.interpreter.program
    }

    pub fn banner(&self) -> &[String] {
        &self.banner
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, OsString> {
        &self.env
    }

    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env.get(key).map(OsString::as_os_str)
    }

    /// Prefix for console diagnostics, e.g. `[start-api]`.
    pub fn console_prefix(&self) -> String {
        format!("[start-{}]", self.name)
    }

    /// Human-readable command line. Display only; never fed to a shell.
    pub fn command_line(&self) -> String {
        let mut line = self.program().display().to_string();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("{arg:?}"));
            } else {
                line.push_str(&arg);
            }
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::builtin_profiles;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn dashboard_profile_expands_root_and_working_dir() {
        let profiles = builtin_profiles();
        let plan = LaunchPlan::from_profile(
            "dashboard",
            &profiles["dashboard"],
            Path::new("/proj"),
            &LaunchEnv::default(),
        );

        assert_eq!(plan.working_dir, PathBuf::from("/proj/apps/dashboard"));
        assert_eq!(plan.env.get("PYTHONPATH"), Some(&OsString::from("/proj")));
        assert_eq!(plan.banner, vec!["Dashboard: /proj/apps/dashboard".to_string()]);
        assert_eq!(plan.fallback, "python");
        assert_eq!(
            plan.candidates[1],
            Candidate::Path(PathBuf::from("/proj/services/api/.venv/bin/python"))
        );
    }

    #[test]
    fn override_is_placed_first() {
        let profiles = builtin_profiles();
        let env = LaunchEnv::from_override(Some(OsString::from("/opt/py/bin/python")));
        let plan = LaunchPlan::from_profile("api", &profiles["api"], Path::new("/proj"), &env);

        assert_eq!(
            plan.candidates.first(),
            Some(&Candidate::Override(PathBuf::from("/opt/py/bin/python")))
        );
    }

    #[test]
    fn empty_override_counts_as_unset() {
        assert_eq!(LaunchEnv::from_override(Some(OsString::new())), LaunchEnv::default());
    }

    #[test]
    fn placeholder_expands_everywhere_in_a_value() {
        let expanded = expand_root("{root}/a:{root}/b", Path::new("/srv"));
        assert_eq!(expanded, OsString::from("/srv/a:/srv/b"));
        assert_eq!(expand_root("plain", Path::new("/srv")), OsString::from("plain"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_root_reaches_the_env_unchanged() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let root = PathBuf::from(OsStr::from_bytes(b"/srv/caf\xe9"));
        let profiles = builtin_profiles();
        let plan = LaunchPlan::from_profile("api", &profiles["api"], &root, &LaunchEnv::default());

        let pythonpath = plan.env.get("PYTHONPATH").cloned().unwrap();
        assert_eq!(pythonpath.into_vec(), b"/srv/caf\xe9".to_vec());
    }

    #[test]
    fn resolved_spec_reports_command_line() {
        let profiles = builtin_profiles();
        let plan = LaunchPlan::from_profile(
            "api",
            &profiles["api"],
            Path::new("/proj"),
            &LaunchEnv::default(),
        );

        let spec = plan.resolve(&MockFileSystem::new());

        assert_eq!(spec.command_line(), "python start_api.py");
        assert_eq!(spec.console_prefix(), "[start-api]");
        assert_eq!(spec.working_dir(), Path::new("/proj"));
        assert_eq!(spec.banner(), ["Project: /proj".to_string()]);
        assert_eq!(spec.env_var("PYTHONIOENCODING"), Some(OsStr::new("utf-8")));
        assert!(spec.interpreter().is_fallback());
    }
}
