use super::{SourceMap, SourceMapError};
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed source map together with the text of every source it references.
#[derive(Debug, Clone)]
pub struct LoadedSourceMap {
    /// Location the map was read from
    pub map_path: PathBuf,
    pub map: SourceMap,
    /// Absolute path of each entry in `map.sources`, same order
    pub resolved_sources: Vec<PathBuf>,
    /// Text of each entry in `map.sources`, same order
    pub contents: Vec<String>,
}

/// Read and parse the map at `map_path`, then read every referenced source.
///
/// Sources are resolved against the directory containing the map. The first
/// unreadable file aborts the load.
pub fn load(map_path: &Path) -> Result<LoadedSourceMap, SourceMapError> {
    let raw = fs::read(map_path).map_err(|source| SourceMapError::Read {
        path: map_path.to_path_buf(),
        source,
    })?;

    let map: SourceMap =
        serde_json::from_slice(&raw).map_err(|source| SourceMapError::Parse {
            path: map_path.to_path_buf(),
            source,
        })?;

    let map_dir = map_dir(map_path);
    let mut resolved_sources = Vec::with_capacity(map.sources.len());
    let mut contents = Vec::with_capacity(map.sources.len());

    for source in &map.sources {
        let resolved = paths::resolve(&map_dir, Path::new(source));
        let bytes = fs::read(&resolved).map_err(|e| SourceMapError::Read {
            path: resolved.clone(),
            source: e,
        })?;

        contents.push(String::from_utf8_lossy(&bytes).into_owned());
        resolved_sources.push(resolved);
    }

    Ok(LoadedSourceMap {
        map_path: map_path.to_path_buf(),
        map,
        resolved_sources,
        contents,
    })
}

fn map_dir(map_path: &Path) -> PathBuf {
    match map_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
