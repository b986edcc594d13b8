use super::{HookError, TranslateHook};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Dispatch table from file extension to an ordered chain of hooks
#[derive(Default, Clone)]
pub struct HookRegistry {
    /// Extension -> hooks, in registration order
    map: HashMap<String, Vec<Arc<dyn TranslateHook>>>,
}

impl HookRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for a file extension
    ///
    /// # Arguments
    /// * `extension` - File extension without dot (e.g., "html"); case-insensitive
    /// * `hook` - Hook implementation, appended to the extension's chain
    ///
    /// # Example
    /// ```ignore
    /// registry.register("html", Arc::new(BlockReplaceHook::new("html-replace", blocks)));
    /// registry.register("html", Arc::new(CommandHook::new("minify", "html-minifier")));
    /// ```
    pub fn register(&mut self, extension: &str, hook: Arc<dyn TranslateHook>) {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.map.entry(ext).or_default().push(hook);
    }

    /// Hooks that apply to `path`, in the order they run
    pub fn select(&self, path: &Path) -> &[Arc<dyn TranslateHook>] {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        self.map.get(&ext).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run every hook registered for `path` over `source`
    pub fn apply(&self, path: &Path, source: String) -> Result<String, HookError> {
        self.select(path)
            .iter()
            .try_fold(source, |text, hook| hook.translate(path, text))
    }

    /// Number of registrations across all extensions
    pub fn hook_count(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    /// List all extensions with at least one hook
    pub fn registered_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.map.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Registry holding only the hooks whose name is in `names`
    pub fn subset(&self, names: &[String]) -> HookRegistry {
        let map = self
            .map
            .iter()
            .map(|(ext, hooks)| {
                let kept: Vec<_> = hooks
                    .iter()
                    .filter(|hook| names.iter().any(|n| n == hook.name()))
                    .cloned()
                    .collect();
                (ext.clone(), kept)
            })
            .filter(|(_, hooks)| !hooks.is_empty())
            .collect();

        HookRegistry { map }
    }

    /// Names of every registered hook, deduplicated
    pub fn hook_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .map
            .values()
            .flat_map(|hooks| hooks.iter().map(|h| h.name()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
