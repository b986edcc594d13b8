use super::{SourceMap, SourceMapError};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize `map` as compact JSON and replace the file at `map_path`.
///
/// The document goes to a temporary file next to the map and is renamed over
/// it, so a failed write leaves the old map in place. A symlinked `map_path`
/// is written through: the link stays and its target is replaced, keeping
/// the target's permissions. Returns the SHA-256 of the bytes written, hex
/// encoded.
pub fn write(map_path: &Path, map: &SourceMap) -> Result<String, SourceMapError> {
    let json = serde_json::to_vec(map).map_err(|source| SourceMapError::Parse {
        path: map_path.to_path_buf(),
        source,
    })?;

    let target = write_target(map_path)?;
    let temp_path = temp_path_for(&target);

    if let Err(source) = fs::write(&temp_path, &json) {
        let _ = fs::remove_file(&temp_path);
        return Err(SourceMapError::Write {
            path: temp_path,
            source,
        });
    }

    if let Ok(existing) = fs::metadata(&target) {
        let _ = fs::set_permissions(&temp_path, existing.permissions());
    }

    if let Err(source) = fs::rename(&temp_path, &target) {
        let _ = fs::remove_file(&temp_path);
        return Err(SourceMapError::Write { path: target, source });
    }

    Ok(digest(&json))
}

/// SHA-256 of `bytes`, hex encoded
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// The regular file behind `map_path`, following symlinks
fn write_target(map_path: &Path) -> Result<PathBuf, SourceMapError> {
    match fs::symlink_metadata(map_path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(map_path).map_err(|source| SourceMapError::Write {
                path: map_path.to_path_buf(),
                source,
            })
        }
        _ => Ok(map_path.to_path_buf()),
    }
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}
