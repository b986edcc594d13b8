use super::{HookError, TranslateHook};
use std::collections::BTreeMap;
use std::path::Path;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Replaces `<!-- build:NAME --> ... <!-- endbuild -->` blocks in HTML.
///
/// The whole block, markers included, is swapped for the markup configured
/// under `NAME`. Blocks with no configured replacement are kept verbatim.
pub struct BlockReplaceHook {
    name: String,
    blocks: BTreeMap<String, String>,
}

impl BlockReplaceHook {
    pub fn new(name: impl Into<String>, blocks: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Replacement markup for a stylesheet block
    pub fn stylesheet(href: &str) -> String {
        format!(r#"<link rel="stylesheet" href="{}">"#, href)
    }

    /// Replacement markup for a script block
    pub fn script(src: &str) -> String {
        format!(r#"<script src="{}"></script>"#, src)
    }
}

impl TranslateHook for BlockReplaceHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, path: &Path, source: String) -> Result<String, HookError> {
        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;

        while let Some(open) = find_comment(&source, cursor, |body| body.starts_with("build:")) {
            let block = open.body.strip_prefix("build:").unwrap_or(open.body).trim();
            let close = find_comment(&source, open.end, |body| body == "endbuild").ok_or_else(
                || HookError::UnterminatedBlock {
                    hook: self.name.clone(),
                    block: block.to_string(),
                    path: path.to_path_buf(),
                },
            )?;

            output.push_str(&source[cursor..open.start]);
            match self.blocks.get(block) {
                Some(replacement) => output.push_str(replacement),
                None => output.push_str(&source[open.start..close.end]),
            }
            cursor = close.end;
        }

        output.push_str(&source[cursor..]);
        Ok(output)
    }
}

struct Comment<'a> {
    start: usize,
    end: usize,
    /// Trimmed text between the comment delimiters
    body: &'a str,
}

/// First complete HTML comment at or after `from` whose trimmed body matches
fn find_comment<'a>(
    text: &'a str,
    mut from: usize,
    matches: impl Fn(&str) -> bool,
) -> Option<Comment<'a>> {
    while let Some(offset) = text[from..].find(COMMENT_OPEN) {
        let start = from + offset;
        let body_start = start + COMMENT_OPEN.len();
        let body_len = text[body_start..].find(COMMENT_CLOSE)?;
        let end = body_start + body_len + COMMENT_CLOSE.len();
        let body = text[body_start..body_start + body_len].trim();

        if matches(body) {
            return Some(Comment { start, end, body });
        }
        from = end;
    }
    None
}
