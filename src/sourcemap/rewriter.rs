use super::{LoadedSourceMap, SanitizeOptions, SourceMap};
use crate::paths;
use std::path::Path;

/// Root written when the caller does not supply one
pub const DEFAULT_SOURCE_ROOT: &str = "/";

/// Produce the sanitized document for a loaded map.
///
/// Inlines the source texts, re-expresses every source relative to
/// `options.base`, and overwrites `sourceRoot` and `file`. Pure: nothing is
/// read or written here.
pub fn rewrite(loaded: &LoadedSourceMap, options: &SanitizeOptions) -> SourceMap {
    let base = paths::resolve(Path::new("."), &options.base);
    let mut map = loaded.map.clone();

    map.sources_content = Some(loaded.contents.iter().cloned().map(Some).collect());
    map.sources = loaded
        .resolved_sources
        .iter()
        .map(|resolved| paths::relative_to(&base, resolved))
        .collect();
    map.source_root = Some(options.effective_source_root().to_string());
    map.file = Some(match non_empty(options.file.as_deref()) {
        Some(file) => file.to_string(),
        None => paths::file_name_without_map(&loaded.map_path),
    });

    map
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
