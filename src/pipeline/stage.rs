use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One named step of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    /// Stages that must complete before this one starts
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(flatten)]
    pub action: StageAction,
}

impl Stage {
    pub fn new(name: impl Into<String>, action: StageAction) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            action,
        }
    }

    pub fn after<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(deps.into_iter().map(Into::into));
        self
    }
}

/// What a stage does when it runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StageAction {
    /// Run an external tool; exit code 0 is success
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        cwd: Option<PathBuf>,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },

    /// Recursively delete paths
    Clean {
        paths: Vec<PathBuf>,
        #[serde(default = "default_max_busy_tries")]
        max_busy_tries: u32,
    },

    /// Inline sources and relativize paths of generated source maps
    SanitizeSourceMaps {
        maps: Vec<PathBuf>,
        base: PathBuf,
        #[serde(default)]
        source_root: Option<String>,
        #[serde(default)]
        file: Option<String>,
        #[serde(default)]
        skip_sanitized: bool,
    },

    /// Run translate hooks over a file or directory tree
    Translate {
        input: PathBuf,
        output: PathBuf,
        /// Hook names to apply; empty means every configured hook
        #[serde(default)]
        hooks: Vec<String>,
    },
}

impl StageAction {
    /// Short label for plans and logs
    pub fn kind(&self) -> &'static str {
        match self {
            StageAction::Command { .. } => "command",
            StageAction::Clean { .. } => "clean",
            StageAction::SanitizeSourceMaps { .. } => "sanitize-source-maps",
            StageAction::Translate { .. } => "translate",
        }
    }
}

fn default_max_busy_tries() -> u32 {
    5
}
