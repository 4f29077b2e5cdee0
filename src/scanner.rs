//! Comment block scanner.
//!
//! Finds every live `/** ... */` block in a source file, records its exact
//! byte span and 1-based starting line, and performs a shallow line walk for
//! already-present `@param`/`@tparam`/`@return` tags plus the one-liner
//! classification the validator needs.

use crate::model::CommentBlock;
use regex::Regex;
use std::sync::LazyLock;

static RE_SHALLOW_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\*?\s*@(tparam|param|return)\b(?:\s+(\S+))?").unwrap()
});

/// Scan a source file for documentation blocks.
pub fn scan(source: &str) -> Vec<CommentBlock> {
    let mut blocks = Vec::new();
    let mut pos = 0usize;

    while let Some(found) = source[pos..].find("/**") {
        let start = pos + found;
        let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);

        // A line-comment marker before the opener means the block is
        // commented out, not live documentation.
        if source[line_start..start].contains("//") {
            log::debug!("skipping commented-out block at byte {start}");
            pos = start + 3;
            continue;
        }

        let Some(close) = source[start + 3..].find("*/") else {
            break;
        };
        let inner_start = start + 3;
        let end = inner_start + close + 2;
        let inner_text = &source[inner_start..inner_start + close];

        let mut shallow_params = Vec::new();
        let mut shallow_tparams = Vec::new();
        let mut has_return_tag = false;
        for line in inner_text.lines() {
            if let Some(caps) = RE_SHALLOW_TAG.captures(line) {
                match &caps[1] {
                    "param" => {
                        if let Some(name) = caps.get(2) {
                            shallow_params.push(name.as_str().to_string());
                        }
                    }
                    "tparam" => {
                        if let Some(name) = caps.get(2) {
                            shallow_tparams.push(name.as_str().to_string());
                        }
                    }
                    "return" => has_return_tag = true,
                    _ => {}
                }
            }
        }

        blocks.push(CommentBlock {
            inner_text: inner_text.to_string(),
            start,
            end,
            line_number: source[..start].matches('\n').count() + 1,
            shallow_params,
            shallow_tparams,
            has_return_tag,
            is_one_liner: classify_one_liner(inner_text),
        });

        pos = end;
    }

    blocks
}

/// A comment is a one-liner when, before any tag line, no blank line is
/// followed by further non-blank prose. A blank line immediately before the
/// tag section does not break one-liner status.
fn classify_one_liner(inner: &str) -> bool {
    let mut seen_prose = false;
    let mut blank_after_prose = false;
    for raw in inner.lines() {
        let t = raw.trim_start();
        let t = t.strip_prefix('*').unwrap_or(t).trim();
        if t.starts_with('@') {
            break;
        }
        if t.is_empty() {
            if seen_prose {
                blank_after_prose = true;
            }
        } else {
            if blank_after_prose {
                return false;
            }
            seen_prose = true;
        }
    }
    true
}
