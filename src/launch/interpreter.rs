// src/launch/interpreter.rs

//! Interpreter resolution.
//!
//! Candidates are tried in order:
//! 1. an operator override (taken as-is, never checked),
//! 2. filesystem paths, first one that exists wins,
//! 3. otherwise the profile's bare fallback command.
//!
//! The fallback is not verified. A bad fallback only shows up later as a
//! spawn failure.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Operator-supplied interpreter; wins without an existence check.
    Override(PathBuf),
    /// Filesystem path, existence-checked.
    Path(PathBuf),
}

impl Candidate {
    /// A configured candidate path; relative entries are joined onto `root`.
    pub fn from_config_entry(entry: &str, root: &Path) -> Self {
        let path = Path::new(entry);
        if path.is_absolute() {
            Candidate::Path(path.to_path_buf())
        } else {
            Candidate::Path(root.join(path))
        }
    }
}

/// Where the chosen interpreter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Override,
    /// Index of the existing path candidate in the input list.
    Found(usize),
    /// No checked candidate existed; the program is an unverified name.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInterpreter {
    pub program: PathBuf,
    pub source: ResolutionSource,
}

impl ResolvedInterpreter {
    pub fn is_fallback(&self) -> bool {
        self.source == ResolutionSource::Fallback
    }
}

/// Pick exactly one interpreter from `candidates`, or `fallback`. Never fails.
pub fn resolve_interpreter(
    candidates: &[Candidate],
    fallback: &str,
    fs: &dyn FileSystem,
) -> ResolvedInterpreter {
    if let Some(Candidate::Override(path)) = candidates
        .iter()
        .find(|c| matches!(c, Candidate::Override(_)))
    {
        debug!(program = %path.display(), "using interpreter override");
        return ResolvedInterpreter {
            program: path.clone(),
            source: ResolutionSource::Override,
        };
    }

    for (idx, candidate) in candidates.iter().enumerate() {
        if let Candidate::Path(path) = candidate {
            if fs.exists(path) {
                debug!(program = %path.display(), "found interpreter");
                return ResolvedInterpreter {
                    program: path.clone(),
                    source: ResolutionSource::Found(idx),
                };
            }
            debug!(candidate = %path.display(), "interpreter candidate missing");
        }
    }

    warn!(
        program = fallback,
        "no interpreter found on disk; falling back to search path"
    );

    ResolvedInterpreter {
        program: PathBuf::from(fallback),
        source: ResolutionSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn venv_candidates() -> Vec<Candidate> {
        vec![
            Candidate::Path(PathBuf::from("/proj/.venv/bin/python")),
            Candidate::Path(PathBuf::from("/proj/.venv/Scripts/python.exe")),
        ]
    }

    #[test]
    fn nothing_on_disk_falls_back_to_bare_python() {
        let fs = MockFileSystem::new();
        let resolved = resolve_interpreter(&venv_candidates(), "python", &fs);

        assert_eq!(resolved.program, PathBuf::from("python"));
        assert!(resolved.is_fallback());
    }

    #[test]
    fn configured_fallback_is_used_verbatim() {
        let fs = MockFileSystem::new();
        let resolved = resolve_interpreter(&venv_candidates(), "python3.12", &fs);

        assert_eq!(resolved.program, PathBuf::from("python3.12"));
        assert!(resolved.is_fallback());
    }

    #[test]
    fn first_existing_path_wins() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/.venv/Scripts/python.exe", b"");

        let resolved = resolve_interpreter(&venv_candidates(), "python", &fs);

        assert_eq!(resolved.program, PathBuf::from("/proj/.venv/Scripts/python.exe"));
        assert_eq!(resolved.source, ResolutionSource::Found(1));
    }

    #[test]
    fn override_skips_the_existence_check() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/.venv/bin/python", b"");
        let mut candidates = vec![Candidate::Override(PathBuf::from("/opt/missing/python"))];
        candidates.extend(venv_candidates());

        let resolved = resolve_interpreter(&candidates, "python", &fs);

        assert_eq!(resolved.program, PathBuf::from("/opt/missing/python"));
        assert_eq!(resolved.source, ResolutionSource::Override);
    }

    #[test]
    fn relative_entries_are_joined_onto_root() {
        let root = Path::new("/proj");
        assert_eq!(
            Candidate::from_config_entry(".venv/bin/python", root),
            Candidate::Path(PathBuf::from("/proj/.venv/bin/python"))
        );
        assert_eq!(
            Candidate::from_config_entry("/usr/bin/python3", root),
            Candidate::Path(PathBuf::from("/usr/bin/python3"))
        );
    }
}
