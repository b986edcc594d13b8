mod document;
mod error;
mod loader;
mod rewriter;
mod writer;

#[cfg(test)]
mod tests;

pub use document::SourceMap;
pub use error::SourceMapError;
pub use loader::{load, LoadedSourceMap};
pub use rewriter::{rewrite, DEFAULT_SOURCE_ROOT};
pub use writer::{digest, write};

use crate::paths;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Parameters for sanitizing a source map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SanitizeOptions {
    /// Directory the rewritten `sources` entries are expressed relative to
    pub base: PathBuf,
    /// Written as `sourceRoot`; `/` when absent or empty
    #[serde(default)]
    pub source_root: Option<String>,
    /// Written as `file`; derived from the map's file name when absent or empty
    #[serde(default)]
    pub file: Option<String>,
    /// Leave maps that already look sanitized untouched
    #[serde(default)]
    pub skip_sanitized: bool,
}

impl SanitizeOptions {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            ..Self::default()
        }
    }

    pub fn source_root(mut self, source_root: impl Into<String>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn skip_sanitized(mut self, skip: bool) -> Self {
        self.skip_sanitized = skip;
        self
    }

    /// The `sourceRoot` value that will be written
    pub fn effective_source_root(&self) -> &str {
        rewriter::non_empty(self.source_root.as_deref()).unwrap_or(DEFAULT_SOURCE_ROOT)
    }
}

/// Result of sanitizing one map
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeOutcome {
    pub map_path: PathBuf,
    /// Final `sources` entries
    pub sources: Vec<String>,
    /// SHA-256 of the map file as it now exists on disk
    pub digest: String,
    /// True when the map was already sanitized and left alone
    pub skipped: bool,
}

/// Load, rewrite and write back the source map at `map_path`.
///
/// Nothing is written unless the map and every referenced source could be
/// read.
pub fn sanitize(map_path: &Path, options: &SanitizeOptions) -> Result<SanitizeOutcome, SourceMapError> {
    if options.skip_sanitized {
        if let Some(outcome) = check_already_sanitized(map_path, options)? {
            eprintln!(
                "[sourcemap] {} already sanitized, skipping",
                map_path.display()
            );
            return Ok(outcome);
        }
    }

    let loaded = load(map_path)?;
    let rewritten = rewrite(&loaded, options);
    let digest = write(map_path, &rewritten)?;

    eprintln!(
        "[sourcemap] ✓ Sanitized {} ({} sources)",
        map_path.display(),
        rewritten.sources.len()
    );

    Ok(SanitizeOutcome {
        map_path: map_path.to_path_buf(),
        sources: rewritten.sources,
        digest,
        skipped: false,
    })
}

/// Sanitize several maps concurrently.
///
/// Each map is independent, so a failure on one does not undo the others.
/// A map listed more than once is sanitized once, at its first position.
/// The first error in input order is returned.
pub fn sanitize_all(
    map_paths: &[PathBuf],
    options: &SanitizeOptions,
) -> Result<Vec<SanitizeOutcome>, SourceMapError> {
    let mut seen = HashSet::new();
    let unique: Vec<&PathBuf> = map_paths
        .iter()
        .filter(|path| seen.insert(paths::resolve(Path::new("."), path)))
        .collect();

    unique
        .par_iter()
        .map(|path| sanitize(path, options))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

fn check_already_sanitized(
    map_path: &Path,
    options: &SanitizeOptions,
) -> Result<Option<SanitizeOutcome>, SourceMapError> {
    let raw = std::fs::read(map_path).map_err(|source| SourceMapError::Read {
        path: map_path.to_path_buf(),
        source,
    })?;
    let map: SourceMap = serde_json::from_slice(&raw).map_err(|source| SourceMapError::Parse {
        path: map_path.to_path_buf(),
        source,
    })?;

    if !map.is_sanitized_for(options.effective_source_root()) {
        return Ok(None);
    }

    Ok(Some(SanitizeOutcome {
        map_path: map_path.to_path_buf(),
        sources: map.sources,
        digest: digest(&raw),
        skipped: true,
    }))
}
