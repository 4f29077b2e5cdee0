//! Fixer/formatter — canonical re-serialization of one comment block and
//! whole-file span splicing.
//!
//! `build_fixed_block` returns only the replacement block; callers splice it
//! back using the original span, so nothing outside the comment's own span is
//! ever touched. The renderer is idempotent: run again on its own output with
//! nothing to add, it returns byte-identical text.

use crate::content::{self, Fence};
use crate::model::{CheckResult, CommentBlock, ExpositionItem, Issue, ParsedContent};

/// Build the canonically formatted replacement for one comment block,
/// appending the given signature tags as `TODO FILL IN` entries.
pub fn build_fixed_block(
    source: &str,
    comment: &CommentBlock,
    missing_tparams: &[String],
    missing_params: &[String],
    needs_return: bool,
) -> String {
    let mut parsed = content::parse(&comment.inner_text);
    promote_opening_line(&mut parsed, &comment.inner_text);

    let nothing_to_add = missing_tparams.is_empty() && missing_params.is_empty() && !needs_return;
    let original = &source[comment.start..comment.end];
    if nothing_to_add && !original.contains('\n') {
        return original.to_string();
    }

    for name in missing_tparams {
        parsed
            .signature_tags
            .push(format!("@tparam {name} TODO FILL IN"));
    }
    for name in missing_params {
        parsed
            .signature_tags
            .push(format!("@param {name} TODO FILL IN"));
    }
    if needs_return {
        parsed.signature_tags.push("@return TODO FILL IN".to_string());
    }
    parsed.signature_tags.sort_by_key(|tag| tag_rank(tag));

    let indent = target_indent(source, comment);
    render(&parsed, &indent)
}

/// Rewrite every fixable result in one pass over an immutable snapshot of
/// the source. Returns the new text and how many blocks were replaced.
pub fn apply_fixes(source: &str, results: &[CheckResult]) -> (String, usize) {
    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    for result in results {
        let (tparams, params, needs_return) = fixable_tags(result);
        if tparams.is_empty() && params.is_empty() && !needs_return {
            continue;
        }
        let comment = &result.comment;
        let line_start = source[..comment.start]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let block = build_fixed_block(source, comment, &tparams, &params, needs_return);
        edits.push((line_start, comment.end, block));
    }

    // Descending start order: earlier replacements never invalidate the
    // spans of blocks not yet processed.
    edits.sort_by(|a, b| b.0.cmp(&a.0));
    let fixed = edits.len();
    let mut text = source.to_string();
    for (start, end, replacement) in edits {
        text.replace_range(start..end, &replacement);
    }
    (text, fixed)
}

/// The tags a rewrite would insert for this result. `Unknown*` and
/// `UnnecessaryReturn` are report-only: fixing them would delete
/// user-written documentation.
pub fn fixable_tags(result: &CheckResult) -> (Vec<String>, Vec<String>, bool) {
    let mut tparams = Vec::new();
    let mut params = Vec::new();
    let mut needs_return = false;
    for issue in &result.issues {
        match issue {
            Issue::MissingTparam { names } => tparams.extend(names.iter().cloned()),
            Issue::MissingParam { names } => params.extend(names.iter().cloned()),
            Issue::MissingReturn => needs_return = true,
            _ => {}
        }
    }
    (tparams, params, needs_return)
}

/// Fixed key order: tparam < param < return, stable otherwise.
fn tag_rank(tag: &str) -> u8 {
    let t = tag.trim_start();
    if t.starts_with("@tparam") {
        0
    } else if t.starts_with("@param") {
        1
    } else {
        2
    }
}

/// Repair a description accidentally placed on a continuation line: when the
/// model has no opening text but the first physical line is non-blank and
/// unmarked, pull it up.
fn promote_opening_line(parsed: &mut ParsedContent, inner: &str) {
    if parsed.opening_text.is_some() {
        return;
    }
    let Some(first) = inner.lines().next() else {
        return;
    };
    let trimmed = first.trim();
    if trimmed.is_empty()
        || first.trim_start().starts_with('*')
        || content::is_fence_marker(trimmed)
    {
        return;
    }
    if let Some(ExpositionItem::Text(text)) = parsed.exposition.first() {
        if text.trim() == trimmed {
            parsed.opening_text = Some(trimmed.to_string());
            parsed.exposition.remove(0);
        }
    }
}

/// Target indentation: the whitespace prefix of the opener's line, narrowed
/// to the following declaration's indentation when that is strictly shorter.
fn target_indent(source: &str, comment: &CommentBlock) -> String {
    let line_start = source[..comment.start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut indent: String = source[line_start..comment.start]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    if let Some(decl_line) = source[comment.end..]
        .lines()
        .find(|line| !line.trim().is_empty())
    {
        let decl_indent: String = decl_line
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect();
        if decl_indent.len() < indent.len() {
            log::debug!(
                "narrowing comment indent from {} to {} columns",
                indent.len(),
                decl_indent.len()
            );
            indent = decl_indent;
        }
    }
    indent
}

fn render(parsed: &ParsedContent, indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    match &parsed.opening_text {
        Some(text) => lines.push(format!("{indent}/** {text}")),
        None => lines.push(format!("{indent}/**")),
    }

    let mut fence = Fence::None;
    for item in &parsed.exposition {
        match item {
            ExpositionItem::Blank => lines.push(blank_star(indent)),
            ExpositionItem::Raw(line) => {
                fence = fence.advance(line.trim());
                lines.push(line.clone());
            }
            ExpositionItem::Text(text) => push_content_line(&mut lines, indent, text, &mut fence),
            ExpositionItem::Tag(body) => {
                for segment in body.split('\n') {
                    push_content_line(&mut lines, indent, segment, &mut fence);
                }
            }
        }
    }

    if !parsed.signature_tags.is_empty() {
        let has_description = parsed.opening_text.is_some() || !parsed.exposition.is_empty();
        if has_description && lines.last().map(String::as_str) != Some(blank_star(indent).as_str())
        {
            if !parsed.blank_before_signature {
                log::debug!("inserting separator before the signature section");
            }
            lines.push(blank_star(indent));
        }
        for tag in &parsed.signature_tags {
            for segment in tag.split('\n') {
                push_content_line(&mut lines, indent, segment, &mut fence);
            }
        }
    }

    lines.push(format!("{indent} */"));
    lines.join("\n")
}

fn blank_star(indent: &str) -> String {
    format!("{indent} *")
}

/// Render one content line behind the `*` margin. Outside code spans,
/// 0-1 leading spaces are normalized up to exactly two and indentation of
/// two or more spaces is preserved verbatim; code-span interiors are
/// reproduced exactly.
fn push_content_line(lines: &mut Vec<String>, indent: &str, text: &str, fence: &mut Fence) {
    let trimmed = text.trim();
    let inside = *fence != Fence::None;
    let rendered = if inside {
        format!("{indent} *{text}")
    } else if trimmed.is_empty() {
        blank_star(indent)
    } else {
        let lead = text.len() - text.trim_start_matches(' ').len();
        if lead >= 2 {
            format!("{indent} *{text}")
        } else {
            format!("{indent} *  {trimmed}")
        }
    };
    *fence = fence.advance(trimmed);
    lines.push(rendered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_source;
    use crate::scanner;

    fn first_block(source: &str) -> CommentBlock {
        scanner::scan(source).remove(0)
    }

    #[test]
    fn adds_param_after_one_line_description() {
        let src = "/** Does something. */\ndef f(x: Int): Unit = ()\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &["x".into()], false);
        assert_eq!(
            block,
            "/** Does something.\n *\n *  @param x TODO FILL IN\n */"
        );
    }

    #[test]
    fn reorders_tags_without_other_changes() {
        let src = "/** Mixed.\n *  @param x the x\n *  @tparam A the A\n */\nclass C[A](x: Int)\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &[], false);
        assert_eq!(
            block,
            "/** Mixed.\n *\n *  @tparam A the A\n *  @param x the x\n */"
        );
    }

    #[test]
    fn tag_order_tparam_param_return() {
        let src = "/** Builds. */\ndef b[A](x: Int): A = ???\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &["A".into()], &["x".into()], true);
        let tparam_at = block.find("@tparam").unwrap();
        let param_at = block.find("@param").unwrap();
        let return_at = block.find("@return").unwrap();
        assert!(tparam_at < param_at && param_at < return_at);
    }

    #[test]
    fn single_line_block_unchanged_when_nothing_to_add() {
        let src = "  /** Short. */\n  val x = 1\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &[], false);
        assert_eq!(block, "/** Short. */");
    }

    #[test]
    fn overindented_comment_narrowed_to_declaration() {
        let src = "      /** Overindented. */\n  def f(x: Int): Unit = ()\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &["x".into()], false);
        assert_eq!(
            block,
            "  /** Overindented.\n   *\n   *  @param x TODO FILL IN\n   */"
        );
    }

    #[test]
    fn brace_span_content_reproduced_exactly() {
        let src = "/** Uses caching.\n * {{{\n * @memoize\n *   cache.get(key)\n * }}}\n */\ndef f(x: Int): Int = x\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &["x".into()], true);
        assert!(block.contains(" * @memoize\n"));
        assert!(block.contains(" *   cache.get(key)\n"));
        // The fenced tag never migrates into the signature section.
        let fence_close = block.find("}}}").unwrap();
        assert!(block.find("@memoize").unwrap() < fence_close);
        assert!(block.find("@param x").unwrap() > fence_close);
    }

    #[test]
    fn unmargined_brace_lines_kept_verbatim() {
        let src = "/** Raw sample.\n * {{{\nval answer = 42\n * }}}\n */\ndef f(x: Int): Int = x\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &["x".into()], false);
        assert!(block.contains("\nval answer = 42\n"));
    }

    #[test]
    fn multi_line_tag_body_preserved() {
        let src =
            "/** Maps values.\n *  @param f the function\n *     applied to each element\n */\ndef m(f: Int): Int = f\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &[], false);
        assert!(block.contains(" *  @param f the function\n *     applied to each element"));
    }

    #[test]
    fn sloppy_margin_normalized_to_two_spaces() {
        let src = "/** Top.\n * @param x the value\n */\ndef f(x: Int): Unit = ()\n";
        let comment = first_block(src);
        let block = build_fixed_block(src, &comment, &[], &[], false);
        assert!(block.contains(" *  @param x the value"));
    }

    #[test]
    fn rebuild_of_own_output_is_identical() {
        let src = "/** Does something.\n *\n * Carefully.\n */\ndef f[A](x: Int): A = ???\n";
        let results = check_source(src);
        let (fixed, n) = apply_fixes(src, &results);
        assert_eq!(n, 1);
        let again = check_source(&fixed);
        assert!(again[0].issues.is_empty());
        let (stable, m) = apply_fixes(&fixed, &again);
        assert_eq!(m, 0);
        assert_eq!(stable, fixed);
    }

    #[test]
    fn rebuild_with_no_additions_is_idempotent() {
        let src = "/** Sums.\n *  @param a left\n *  @param b right\n */\ndef sum(a: Int, b: Int): Int = a + b\n";
        let comment = first_block(src);
        let once = build_fixed_block(src, &comment, &[], &[], false);
        let redoc = format!("{once}\ndef sum(a: Int, b: Int): Int = a + b\n");
        let comment2 = first_block(&redoc);
        let twice = build_fixed_block(&redoc, &comment2, &[], &[], false);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_fixes_replaces_multiple_blocks() {
        let src = "/** A. */\ndef a(x: Int): Int = x\n\n/** B. */\ndef b(y: Int): Int = y\n";
        let (fixed, n) = apply_fixes(src, &check_source(src));
        assert_eq!(n, 2);
        assert!(fixed.contains("/** A.\n *\n *  @param x TODO FILL IN\n */\ndef a"));
        assert!(fixed.contains("/** B.\n *\n *  @param y TODO FILL IN\n */\ndef b"));
    }

    #[test]
    fn apply_fixes_leaves_unrelated_text_alone() {
        let src = "package demo\n\n/** A. */\ndef a(x: Int): Int = x\n\nobject Done\n";
        let (fixed, n) = apply_fixes(src, &check_source(src));
        assert_eq!(n, 1);
        assert!(fixed.starts_with("package demo\n\n"));
        assert!(fixed.ends_with("\nobject Done\n"));
    }

    #[test]
    fn report_only_issues_do_not_rewrite() {
        // A stale @param and an unnecessary @return: nothing fixable.
        let src = "/** Cleans.\n *  @param gone old name\n *  @return nothing\n */\ndef clean(): Unit = ()\n";
        let (fixed, n) = apply_fixes(src, &check_source(src));
        assert_eq!(n, 0);
        assert_eq!(fixed, src);
    }

    #[test]
    fn unmarked_description_line_becomes_opening_text() {
        let inner = "\nOrphan description.\n * @param x v\n ";
        let mut parsed = content::parse(inner);
        promote_opening_line(&mut parsed, inner);
        assert_eq!(parsed.opening_text.as_deref(), Some("Orphan description."));
        assert!(parsed.exposition.is_empty());
    }

    #[test]
    fn promote_opening_is_a_safe_no_op_on_parsed_models() {
        let inner = " Already first.\n * More.\n ";
        let mut parsed = content::parse(inner);
        let before = parsed.clone();
        promote_opening_line(&mut parsed, inner);
        assert_eq!(parsed.opening_text, before.opening_text);
        assert_eq!(parsed.exposition, before.exposition);
    }
}
