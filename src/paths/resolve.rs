use std::env;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path.
///
/// - `.` components are dropped
/// - `..` folds against the preceding normal component
/// - `..` directly under the root of an absolute path is discarded
///
/// Leading `..` components of a relative path are kept. The filesystem is
/// never consulted, so symlinks are not followed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut prefix: Option<Component> = None;
    let mut has_root = false;
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) => prefix = Some(component),
            Component::RootDir => has_root = true,
            Component::CurDir => continue,
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // Nothing above the root
                _ if has_root => {}
                _ => parts.push(component),
            },
            Component::Normal(_) => parts.push(component),
        }
    }

    let mut normalized = PathBuf::new();
    if let Some(prefix) = prefix {
        normalized.push(prefix.as_os_str());
    }
    if has_root {
        normalized.push(Component::RootDir.as_os_str());
    }
    for part in parts {
        normalized.push(part.as_os_str());
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Resolve `path` against `base`, producing an absolute, normalized path.
///
/// Absolute `path`s ignore `base`. A relative `base` is anchored at the
/// current working directory first.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize(path);
    }
    normalize(&absolute(base).join(path))
}

/// Compute the relative path from directory `from` to `to`.
///
/// Both inputs are resolved to absolute paths first. The result uses `/` as
/// separator regardless of platform, since it ends up in source map URLs.
/// Returns an empty string when both point at the same location.
pub fn relative_to(from: &Path, to: &Path) -> String {
    let from = normalize(&absolute(from));
    let to = normalize(&absolute(to));

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }

    segments.join("/")
}

/// File name of a source map with a single trailing `.map` removed
/// (`dist/main.js.map` -> `main.js`). Names without `.map` are unchanged.
pub fn file_name_without_map(map_path: &Path) -> String {
    let name = map_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".map") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    // An unreadable cwd leaves the path relative; normalization still applies
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
