//! Translate hooks: the extension point applied to module sources before they
//! are written to the output tree.
//!
//! A hook receives the path and full text of one file and returns the
//! replacement text. Hooks are registered per file extension in a
//! [`HookRegistry`] and run in registration order.

mod block_replace;
mod command;
mod registry;
mod tree;


pub use block_replace::BlockReplaceHook;
pub use command::CommandHook;
pub use registry::HookRegistry;
pub use tree::translate_tree;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Hook '{hook}' could not run '{program}': {source}")]
    Spawn {
        hook: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hook '{hook}' failed on {} with exit code {code:?}: {stderr}", path.display())]
    CommandFailed {
        hook: String,
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Hook '{hook}' found an unterminated block '{block}' in {}", path.display())]
    UnterminatedBlock {
        hook: String,
        block: String,
        path: PathBuf,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Core trait that all translate hooks implement
pub trait TranslateHook: Send + Sync {
    /// Name used in logs and configuration
    fn name(&self) -> &str;

    /// Transform the full text of the file at `path`
    fn translate(&self, path: &Path, source: String) -> Result<String, HookError>;
}
