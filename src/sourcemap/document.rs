use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A revision 3 source map document.
///
/// Only the fields the sanitizer touches are typed; everything else the
/// producer emitted (`x_google_ignoreList`, `debugId`, ...) is carried in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(
        rename = "sourceRoot",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_root: Option<String>,

    /// Source paths, relative to the map's directory until rewritten
    pub sources: Vec<String>,

    /// Parallel to `sources`
    #[serde(
        rename = "sourcesContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sources_content: Option<Vec<Option<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mappings: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceMap {
    /// True when every source already carries inline content and the
    /// declared root matches `source_root`.
    pub fn is_sanitized_for(&self, source_root: &str) -> bool {
        let contents_complete = match &self.sources_content {
            Some(contents) => {
                contents.len() == self.sources.len() && contents.iter().all(Option::is_some)
            }
            None => false,
        };

        contents_complete && self.source_root.as_deref() == Some(source_root)
    }
}
