use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::hooks::{BlockReplaceHook, CommandHook, HookRegistry, TranslateHook};
use crate::pipeline::{default_jobs, FailurePolicy, Pipeline, RunContext, Stage};

/// File looked up by [`BuildConfig::discover`]
pub const CONFIG_FILENAME: &str = "assetline.toml";

/// Top-level build configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct BuildConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default, rename = "hook")]
    pub hooks: Vec<HookConfig>,
    #[serde(default, rename = "stage")]
    pub stages: Vec<Stage>,
    /// Directory containing the configuration file; relative stage paths
    /// resolve against it.
    #[serde(skip)]
    pub root: PathBuf,
}

/// The `[pipeline]` table.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Stages run when no target is named
    #[serde(default)]
    pub default: Vec<String>,
    /// Concurrent stage limit; available parallelism when absent
    pub jobs: Option<usize>,
    /// When false, failing external tools are recorded and the run goes on
    #[serde(default = "default_exit_on_failure")]
    pub exit_on_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default: Vec::new(),
            jobs: None,
            exit_on_failure: default_exit_on_failure(),
        }
    }
}

fn default_exit_on_failure() -> bool {
    true
}

/// One `[[hook]]` entry.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HookConfig {
    pub name: String,
    /// Extensions the hook applies to, without dot
    pub extensions: Vec<String>,
    #[serde(flatten)]
    pub kind: HookKind,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HookKind {
    /// Pipe file text through an external program
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Replace `<!-- build:NAME -->` blocks
    BlockReplace { blocks: BTreeMap<String, String> },
}

/// Overrides coming from the command line
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub jobs: Option<usize>,
    pub keep_going: bool,
}

impl BuildConfig {
    /// Parse the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: BuildConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        eprintln!(
            "[config] Loaded {} ({} stages, {} hooks)",
            path.display(),
            config.stages.len(),
            config.hooks.len()
        );
        Ok(config)
    }

    /// Find and load the nearest `assetline.toml` at or above `start`
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
            if !current.pop() {
                bail!(
                    "No {} found in {} or any parent directory",
                    CONFIG_FILENAME,
                    start.display()
                );
            }
        }
    }

    /// Validated pipeline of the configured stages
    pub fn pipeline(&self) -> Result<Pipeline> {
        Pipeline::new(self.stages.clone()).context("Invalid pipeline configuration")
    }

    /// Registry holding every configured hook, in declaration order
    pub fn hooks(&self) -> Result<HookRegistry> {
        let mut registry = HookRegistry::new();
        let mut seen: Vec<&str> = Vec::new();

        for hook in &self.hooks {
            if seen.contains(&hook.name.as_str()) {
                bail!("Hook '{}' is defined more than once", hook.name);
            }
            seen.push(&hook.name);

            if hook.extensions.is_empty() {
                bail!("Hook '{}' lists no extensions", hook.name);
            }

            let built: Arc<dyn TranslateHook> = match &hook.kind {
                HookKind::Command { program, args } => {
                    Arc::new(CommandHook::new(&hook.name, program).args(args.iter().cloned()))
                }
                HookKind::BlockReplace { blocks } => {
                    Arc::new(BlockReplaceHook::new(&hook.name, blocks.clone()))
                }
            };
            for ext in &hook.extensions {
                registry.register(ext, Arc::clone(&built));
            }
        }

        Ok(registry)
    }

    /// Stages to plan when the command line names none
    pub fn default_targets(&self) -> &[String] {
        &self.pipeline.default
    }

    /// Context handed to every stage of a run
    pub fn run_context(&self, overrides: &RunOverrides) -> RunContext {
        let exit_on_failure = self.pipeline.exit_on_failure && !overrides.keep_going;
        let jobs = overrides
            .jobs
            .or(self.pipeline.jobs)
            .unwrap_or_else(default_jobs);

        RunContext::new(self.root.clone())
            .policy(FailurePolicy::from_exit_on_failure(exit_on_failure))
            .jobs(jobs)
    }
}
