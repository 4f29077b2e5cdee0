//! Content model parser — line-by-line state machine.
//!
//! Parses a comment block's inner text into a [`ParsedContent`]: free-form
//! exposition (prose and contextual tags) separated from the
//! `@tparam`/`@param`/`@return` signature section, with fenced code spans
//! treated as opaque. The model is what makes the fixer's idempotence and
//! losslessness checkable by construction instead of by regex ordering.

use crate::model::{ExpositionItem, ParsedContent};

/// Tags documenting one element of a declaration's signature.
pub const SIGNATURE_TAGS: [&str; 3] = ["@tparam", "@param", "@return"];

/// Contextual tags: documentation about the declaration, not its signature.
/// Anything tag-shaped outside this set is ordinary exposition text so it is
/// never dropped or reordered.
pub const CONTEXT_TAGS: [&str; 18] = [
    "@see",
    "@note",
    "@example",
    "@throws",
    "@since",
    "@author",
    "@version",
    "@deprecated",
    "@migration",
    "@todo",
    "@constructor",
    "@usecase",
    "@define",
    "@inheritdoc",
    "@group",
    "@groupname",
    "@groupdesc",
    "@groupprio",
];

/// Code-span state: outside, inside a ``` fence, or inside a `{{{` span.
/// The two styles are mutually exclusive; markers match by trimmed-line
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fence {
    #[default]
    None,
    Backtick,
    Brace,
}

impl Fence {
    /// The state after seeing one trimmed line.
    pub fn advance(self, trimmed: &str) -> Fence {
        match self {
            Fence::None if trimmed == "```" => Fence::Backtick,
            Fence::None if trimmed == "{{{" => Fence::Brace,
            Fence::Backtick if trimmed == "```" => Fence::None,
            Fence::Brace if trimmed == "}}}" => Fence::None,
            other => other,
        }
    }
}

enum AccKind {
    Exposition,
    Signature,
}

#[derive(Default)]
struct State {
    out: ParsedContent,
    in_signature: bool,
    fence: Fence,
    acc: Option<(AccKind, String)>,
    pending_blanks: usize,
    seen_content: bool,
}

/// Parse a comment block's inner text (everything between `/**` and `*/`).
pub fn parse(inner: &str) -> ParsedContent {
    let mut st = State::default();
    for line in inner.lines() {
        st.line(line);
    }
    st.finish()
}

pub fn is_signature_tag(trimmed: &str) -> bool {
    SIGNATURE_TAGS.iter().any(|t| tag_matches(trimmed, t))
}

pub fn is_context_tag(trimmed: &str) -> bool {
    CONTEXT_TAGS.iter().any(|t| tag_matches(trimmed, t))
}

pub fn is_fence_marker(trimmed: &str) -> bool {
    trimmed == "```" || trimmed == "{{{" || trimmed == "}}}"
}

/// The tag name must be a whole token: `@param x` matches, `@paramount` not.
fn tag_matches(trimmed: &str, tag: &str) -> bool {
    trimmed
        .strip_prefix(tag)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

impl State {
    fn line(&mut self, raw: &str) {
        let ws_stripped = raw.trim_start();
        let (content, margined) = match ws_stripped.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (ws_stripped, false),
        };
        let trimmed = content.trim();
        let in_fence = self.fence != Fence::None;

        if !in_fence && is_signature_tag(trimmed) {
            self.flush_acc();
            if !self.in_signature {
                self.in_signature = true;
                if self.pending_blanks > 0 {
                    self.out.blank_before_signature = true;
                }
            }
            // Blank lines are never preserved between exposition and the
            // signature section; the fixer re-inserts one canonical
            // separator instead.
            self.pending_blanks = 0;
            self.acc = Some((AccKind::Signature, content.to_string()));
            self.seen_content = true;
            return;
        }

        if !in_fence && is_context_tag(trimmed) {
            self.flush_acc();
            self.materialize_blanks();
            self.acc = Some((AccKind::Exposition, content.to_string()));
            self.seen_content = true;
            return;
        }

        if !in_fence && trimmed.is_empty() {
            if matches!(self.acc, Some((AccKind::Exposition, _))) {
                self.flush_acc();
                self.pending_blanks += 1;
            } else if self.in_signature {
                // dropped
            } else if self.seen_content {
                // Blanks before any content (the empty tail of the opening
                // line) and trailing blanks are never materialized.
                self.pending_blanks += 1;
            }
            return;
        }

        // Content line, or any line while inside a code span.
        self.toggle_fence(trimmed);

        if in_fence && !margined {
            // Raw code-span line: reproduced verbatim, never margined. A raw
            // line inside a signature-tag body stays in the tag; anywhere
            // else it closes the open accumulator and lands in exposition.
            if let Some((AccKind::Signature, buf)) = &mut self.acc {
                buf.push('\n');
                buf.push_str(raw);
            } else {
                self.flush_acc();
                self.materialize_blanks();
                self.out.exposition.push(ExpositionItem::Raw(raw.to_string()));
            }
            self.seen_content = true;
            return;
        }

        if let Some((_, buf)) = &mut self.acc {
            buf.push('\n');
            buf.push_str(content);
            return;
        }

        if !self.seen_content && !margined && !is_fence_marker(trimmed) {
            // The text on the same physical line as the opening delimiter.
            self.out.opening_text = Some(trimmed.to_string());
            self.seen_content = true;
            return;
        }

        self.materialize_blanks();
        self.out.exposition.push(ExpositionItem::Text(content.to_string()));
        self.seen_content = true;
    }

    fn toggle_fence(&mut self, trimmed: &str) {
        self.fence = self.fence.advance(trimmed);
    }

    fn flush_acc(&mut self) {
        match self.acc.take() {
            Some((AccKind::Exposition, buf)) => {
                self.out.exposition.push(ExpositionItem::Tag(buf));
            }
            Some((AccKind::Signature, buf)) => {
                self.out.signature_tags.push(buf);
            }
            None => {}
        }
    }

    fn materialize_blanks(&mut self) {
        for _ in 0..self.pending_blanks {
            self.out.exposition.push(ExpositionItem::Blank);
        }
        self.pending_blanks = 0;
    }

    fn finish(mut self) -> ParsedContent {
        self.flush_acc();
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_comment() {
        let p = parse(" Does something. ");
        assert_eq!(p.opening_text.as_deref(), Some("Does something."));
        assert!(p.exposition.is_empty());
        assert!(p.signature_tags.is_empty());
    }

    #[test]
    fn opening_then_tags() {
        let p = parse(" Runs the job.\n * @param x the value\n ");
        assert_eq!(p.opening_text.as_deref(), Some("Runs the job."));
        assert_eq!(p.signature_tags, vec![" @param x the value"]);
        assert!(!p.blank_before_signature);
    }

    #[test]
    fn blank_before_signature_recorded_not_kept() {
        let p = parse("\n * Summary.\n *\n * @param x the value\n ");
        assert!(p.blank_before_signature);
        assert_eq!(p.exposition, vec![ExpositionItem::Text(" Summary.".into())]);
        assert_eq!(p.signature_tags, vec![" @param x the value"]);
    }

    #[test]
    fn paragraph_break_materialized() {
        let p = parse("\n * First.\n *\n * Second.\n ");
        assert_eq!(
            p.exposition,
            vec![
                ExpositionItem::Text(" First.".into()),
                ExpositionItem::Blank,
                ExpositionItem::Text(" Second.".into()),
            ]
        );
    }

    #[test]
    fn trailing_blanks_dropped() {
        let p = parse("\n * Text.\n *\n *\n ");
        assert_eq!(p.exposition, vec![ExpositionItem::Text(" Text.".into())]);
    }

    #[test]
    fn context_tag_accumulates_continuation() {
        let p = parse("\n * @note careful with this\n * when the input is large\n ");
        assert_eq!(
            p.exposition,
            vec![ExpositionItem::Tag(
                " @note careful with this\n when the input is large".into()
            )]
        );
    }

    #[test]
    fn blank_preserved_before_context_tag() {
        let p = parse("\n * Intro.\n *\n * @see elsewhere\n ");
        assert_eq!(
            p.exposition,
            vec![
                ExpositionItem::Text(" Intro.".into()),
                ExpositionItem::Blank,
                ExpositionItem::Tag(" @see elsewhere".into()),
            ]
        );
    }

    #[test]
    fn unrecognized_tag_is_plain_exposition() {
        let p = parse("\n * @memoize\n * @param x the value\n ");
        assert_eq!(p.exposition, vec![ExpositionItem::Text(" @memoize".into())]);
        assert_eq!(p.signature_tags, vec![" @param x the value"]);
    }

    #[test]
    fn signature_tag_multi_line_body() {
        let p = parse("\n * @param x a value that needs\n *   a long explanation\n ");
        assert_eq!(
            p.signature_tags,
            vec![" @param x a value that needs\n   a long explanation"]
        );
    }

    #[test]
    fn blank_dropped_inside_signature_section() {
        let p = parse("\n * @param x first\n *\n * @param y second\n ");
        assert_eq!(p.signature_tags, vec![" @param x first", " @param y second"]);
    }

    #[test]
    fn backtick_fence_shields_tags() {
        let p = parse("\n * Usage:\n * ```\n * @memoize\n * ```\n ");
        assert!(p.signature_tags.is_empty());
        assert_eq!(
            p.exposition,
            vec![
                ExpositionItem::Text(" Usage:".into()),
                ExpositionItem::Text(" ```".into()),
                ExpositionItem::Text(" @memoize".into()),
                ExpositionItem::Text(" ```".into()),
            ]
        );
    }

    #[test]
    fn brace_fence_shields_tags() {
        let p = parse("\n * {{{\n * val x = frob(1)\n * }}}\n ");
        assert!(p.signature_tags.is_empty());
        assert_eq!(p.exposition.len(), 3);
    }

    #[test]
    fn unmargined_brace_span_lines_kept_raw() {
        let p = parse("\n * {{{\nval x = 1\n * }}}\n ");
        assert_eq!(
            p.exposition,
            vec![
                ExpositionItem::Text(" {{{".into()),
                ExpositionItem::Raw("val x = 1".into()),
                ExpositionItem::Text(" }}}".into()),
            ]
        );
    }

    #[test]
    fn blank_inside_fence_kept_as_content() {
        let p = parse("\n * ```\n *\n * ```\n ");
        assert_eq!(
            p.exposition,
            vec![
                ExpositionItem::Text(" ```".into()),
                ExpositionItem::Text("".into()),
                ExpositionItem::Text(" ```".into()),
            ]
        );
    }

    #[test]
    fn fence_inside_context_tag_appends_to_body() {
        let p = parse("\n * @example run it:\n * {{{\n * frob(1)\n * }}}\n ");
        assert_eq!(
            p.exposition,
            vec![ExpositionItem::Tag(
                " @example run it:\n {{{\n frob(1)\n }}}".into()
            )]
        );
    }

    #[test]
    fn tags_only_comment() {
        let p = parse("\n * @param x the value\n * @return the result\n ");
        assert_eq!(p.opening_text, None);
        assert!(p.exposition.is_empty());
        assert_eq!(p.signature_tags.len(), 2);
    }

    #[test]
    fn context_tag_after_signature_stays_exposition() {
        let p = parse("\n * @param x the value\n * @see elsewhere\n ");
        assert_eq!(p.signature_tags, vec![" @param x the value"]);
        assert_eq!(p.exposition, vec![ExpositionItem::Tag(" @see elsewhere".into())]);
    }
}
