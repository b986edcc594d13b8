use super::clean::remove_path;
use super::command::run_command;
use super::{FailurePolicy, RunContext, Stage, StageAction};
use crate::hooks::{translate_tree, HookRegistry};
use crate::report::Artifact;
use crate::sourcemap::{sanitize_all, SanitizeOptions};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// What a stage produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutput {
    /// Files written, with digests when known
    pub artifacts: Vec<Artifact>,
    /// Set when the stage failed but the run policy let it pass
    pub tolerated: Option<String>,
}

/// Runs a single stage. Called concurrently for independent stages.
pub trait StageExecutor: Sync {
    fn execute(&self, stage: &Stage, ctx: &RunContext) -> Result<StageOutput>;
}

/// Executes the built-in stage actions
pub struct ActionExecutor {
    hooks: HookRegistry,
}

impl ActionExecutor {
    pub fn new(hooks: HookRegistry) -> Self {
        Self { hooks }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(HookRegistry::new())
    }
}

impl StageExecutor for ActionExecutor {
    fn execute(&self, stage: &Stage, ctx: &RunContext) -> Result<StageOutput> {
        match &stage.action {
            StageAction::Command {
                program,
                args,
                cwd,
                env,
            } => {
                let cwd = match cwd {
                    Some(dir) => ctx.resolve(dir),
                    None => ctx.root.clone(),
                };
                let status = run_command(&stage.name, program, args, &cwd, env)?;
                if status.success() {
                    return Ok(StageOutput::default());
                }

                let message = format!("'{}' exited with {}", program, status);
                match ctx.policy {
                    FailurePolicy::Abort => bail!(message),
                    FailurePolicy::Continue => {
                        eprintln!("[{}] Warning: {} (continuing)", stage.name, message);
                        Ok(StageOutput {
                            artifacts: Vec::new(),
                            tolerated: Some(message),
                        })
                    }
                }
            }

            StageAction::Clean {
                paths,
                max_busy_tries,
            } => {
                for path in paths {
                    let target = ctx.resolve(path);
                    let removed = remove_path(&target, *max_busy_tries)
                        .with_context(|| format!("Failed to remove {}", target.display()))?;
                    if removed {
                        eprintln!("[{}] Removed {}", stage.name, target.display());
                    }
                }
                Ok(StageOutput::default())
            }

            StageAction::SanitizeSourceMaps {
                maps,
                base,
                source_root,
                file,
                skip_sanitized,
            } => {
                if file.is_some() && maps.len() > 1 {
                    bail!(
                        "Stage '{}' sets `file` but lists {} source maps; `file` needs a single map",
                        stage.name,
                        maps.len()
                    );
                }
                let maps: Vec<PathBuf> = maps.iter().map(|m| ctx.resolve(m)).collect();
                let options = SanitizeOptions {
                    base: ctx.resolve(base),
                    source_root: source_root.clone(),
                    file: file.clone(),
                    skip_sanitized: *skip_sanitized,
                };

                let outcomes = sanitize_all(&maps, &options)?;
                let artifacts = outcomes
                    .into_iter()
                    .map(|outcome| Artifact {
                        path: outcome.map_path,
                        sha256: Some(outcome.digest),
                    })
                    .collect();

                Ok(StageOutput {
                    artifacts,
                    tolerated: None,
                })
            }

            StageAction::Translate {
                input,
                output,
                hooks,
            } => {
                let registry = if hooks.is_empty() {
                    self.hooks.clone()
                } else {
                    for name in hooks {
                        if !self.hooks.hook_names().contains(&name.as_str()) {
                            bail!("Unknown hook '{}'", name);
                        }
                    }
                    self.hooks.subset(hooks)
                };

                let written = translate_tree(&registry, &ctx.resolve(input), &ctx.resolve(output))?;
                let artifacts = written
                    .into_iter()
                    .map(|path| Artifact { path, sha256: None })
                    .collect();

                Ok(StageOutput {
                    artifacts,
                    tolerated: None,
                })
            }
        }
    }
}
