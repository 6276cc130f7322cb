#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use companion_launcher::launch::{Candidate, LaunchPlan};

/// Builder for `LaunchPlan` to simplify test setup.
pub struct LaunchPlanBuilder {
    plan: LaunchPlan,
}

impl LaunchPlanBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            plan: LaunchPlan {
                name: name.to_string(),
                title: name.to_string(),
                working_dir: std::env::temp_dir(),
                candidates: vec![],
                fallback: "python".to_string(),
                banner: vec![],
                args: vec![],
                env: BTreeMap::new(),
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.plan.title = title.to_string();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plan.working_dir = dir.into();
        self
    }

    /// Interpreter used without an existence check.
    pub fn interpreter(mut self, program: impl Into<PathBuf>) -> Self {
        self.plan.candidates.push(Candidate::Override(program.into()));
        self
    }

    pub fn candidate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plan.candidates.push(Candidate::Path(path.into()));
        self
    }

    pub fn fallback(mut self, name: &str) -> Self {
        self.plan.fallback = name.to_string();
        self
    }

    pub fn banner(mut self, line: &str) -> Self {
        self.plan.banner.push(line.to_string());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.plan.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.plan.env.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> LaunchPlan {
        self.plan
    }
}
