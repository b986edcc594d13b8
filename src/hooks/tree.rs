use super::{HookError, HookRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Translate every hooked file under `input` into the mirrored location
/// under `output`.
///
/// `input` may be a single file, in which case it lands directly in
/// `output`. Files whose extension has no hook are ignored. Returns the
/// written paths, sorted.
pub fn translate_tree(
    registry: &HookRegistry,
    input: &Path,
    output: &Path,
) -> Result<Vec<PathBuf>, HookError> {
    let root = if input.is_file() {
        input.parent().unwrap_or(Path::new("")).to_path_buf()
    } else {
        input.to_path_buf()
    };

    let mut written = Vec::new();

    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.map_err(|e| HookError::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| input.to_path_buf()),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() || registry.select(entry.path()).is_empty() {
            continue;
        }

        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        let target = output.join(relative);

        let source = fs::read(entry.path()).map_err(|source| HookError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        let translated = registry.apply(entry.path(), String::from_utf8_lossy(&source).into_owned())?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| HookError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, translated).map_err(|source| HookError::Io {
            path: target.clone(),
            source,
        })?;

        eprintln!("[hooks] {} -> {}", entry.path().display(), target.display());
        written.push(target);
    }

    Ok(written)
}
