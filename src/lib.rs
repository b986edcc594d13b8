// Public API exports
pub mod config;
pub mod hooks;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod sourcemap;

// Re-export main types for convenience
pub use config::{BuildConfig, RunOverrides, CONFIG_FILENAME};

pub use sourcemap::{
    sanitize, sanitize_all, SanitizeOptions, SanitizeOutcome, SourceMap, SourceMapError,
};

pub use hooks::{BlockReplaceHook, CommandHook, HookError, HookRegistry, TranslateHook};

pub use pipeline::{
    ActionExecutor, FailurePolicy, Pipeline, PipelineError, Plan, RunContext, Scheduler, Stage,
    StageAction, StageExecutor,
};

pub use report::{Artifact, RunReport, StageRecord, StageStatus};
