//! Build pipelines: named stages with declared dependencies, planned as a
//! DAG and executed by a concurrent, fail-fast scheduler.

mod clean;
mod command;
mod executor;
mod graph;
mod scheduler;
mod stage;


pub use clean::remove_path;
pub use command::run_command;
pub use executor::{ActionExecutor, StageExecutor, StageOutput};
pub use graph::{Pipeline, Plan};
pub use scheduler::Scheduler;
pub use stage::{Stage, StageAction};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline has no stages")]
    EmptyPipeline,

    #[error("Stage '{0}' is defined more than once")]
    DuplicateStage(String),

    #[error("Stage '{stage}' depends on unknown stage '{dependency}'")]
    UnknownDependency { stage: String, dependency: String },

    #[error("Unknown stage '{0}'")]
    UnknownStage(String),

    #[error("Dependency cycle through stage '{0}'")]
    Cycle(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// How a failing external tool affects the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// A failing stage stops the run (one-shot builds)
    #[default]
    Abort,
    /// A failing command is recorded and the run goes on (interactive use)
    Continue,
}

impl FailurePolicy {
    pub fn from_exit_on_failure(exit_on_failure: bool) -> Self {
        if exit_on_failure {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        }
    }
}

/// Settings handed to every stage invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Directory relative stage paths are resolved against
    pub root: PathBuf,
    pub policy: FailurePolicy,
    /// Maximum number of concurrently running stages
    pub jobs: usize,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: FailurePolicy::default(),
            jobs: default_jobs(),
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// `path` joined onto the root unless already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

/// Available parallelism, or 1 when it cannot be determined
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
