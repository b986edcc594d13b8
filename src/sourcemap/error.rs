use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceMapError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse source map {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write source map {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceMapError {
    /// Path of the file the failure refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            SourceMapError::Read { path, .. }
            | SourceMapError::Parse { path, .. }
            | SourceMapError::Write { path, .. } => path,
        }
    }
}
