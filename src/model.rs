//! Data model for scanned comments, extracted declarations, and issues.

use serde::Serialize;
use std::fmt;

/// Declaration kinds recognized by surface-syntax extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Def,
    Class,
    Trait,
    Object,
    Val,
    Var,
    Unknown,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclKind::Def => "def",
            DeclKind::Class => "class",
            DeclKind::Trait => "trait",
            DeclKind::Object => "object",
            DeclKind::Val => "val",
            DeclKind::Var => "var",
            DeclKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Signature facts extracted from the declaration following a comment.
///
/// Reconstructed per comment/declaration pair, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<String>,
    /// Raw return-type text for `def`s, e.g. `Int` or `Map[K, V]`.
    /// `None` when absent or unparsable.
    pub return_type: Option<String>,
}

impl Declaration {
    /// The "nothing to check" fallback for chunks that match no known shape.
    pub fn unknown() -> Self {
        Declaration {
            kind: DeclKind::Unknown,
            name: String::new(),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
        }
    }
}

/// One `/** ... */` block found in a source file.
///
/// Byte offsets are valid only against the exact source text the block was
/// scanned from.
#[derive(Debug, Clone)]
pub struct CommentBlock {
    /// Text between the opening `/**` and the closing `*/`.
    pub inner_text: String,
    /// Byte offset of the `/` of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing `*/`.
    pub end: usize,
    /// 1-based line of the opening delimiter.
    pub line_number: usize,
    /// `@param` identifiers found by the shallow line walk.
    pub shallow_params: Vec<String>,
    /// `@tparam` identifiers found by the shallow line walk.
    pub shallow_tparams: Vec<String>,
    pub has_return_tag: bool,
    /// True when the descriptive prose is a single paragraph.
    pub is_one_liner: bool,
}

/// One unit of exposition in a parsed comment body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpositionItem {
    /// A content line, stored as it appeared after the `*` margin.
    Text(String),
    /// A paragraph break.
    Blank,
    /// A contextual tag (`@see`, `@note`, ...) with its continuation lines,
    /// newline-joined.
    Tag(String),
    /// A code-span line that carried no `*` margin; reproduced verbatim.
    Raw(String),
}

/// Structural model of a comment's inner text: description and contextual
/// tags separated from the `@tparam`/`@param`/`@return` section.
#[derive(Debug, Clone, Default)]
pub struct ParsedContent {
    /// Text that appeared on the same physical line as the opening `/**`.
    pub opening_text: Option<String>,
    pub exposition: Vec<ExpositionItem>,
    /// Signature tags, newline-joined bodies, stored as they appeared after
    /// the `*` margin. Only the three recognized tag kinds land here.
    pub signature_tags: Vec<String>,
    /// Whether at least one blank line preceded the first signature tag.
    pub blank_before_signature: bool,
}

/// A documentation mismatch surfaced by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    MissingParam { names: Vec<String> },
    UnknownParam { names: Vec<String> },
    MissingTparam { names: Vec<String> },
    UnknownTparam { names: Vec<String> },
    MissingReturn,
    UnnecessaryReturn,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingParam { names } => {
                write!(f, "missing @param doc: {}", names.join(", "))
            }
            Issue::UnknownParam { names } => {
                write!(f, "stale @param doc, no such parameter: {}", names.join(", "))
            }
            Issue::MissingTparam { names } => {
                write!(f, "missing @tparam doc: {}", names.join(", "))
            }
            Issue::UnknownTparam { names } => {
                write!(
                    f,
                    "stale @tparam doc, no such type parameter: {}",
                    names.join(", ")
                )
            }
            Issue::MissingReturn => f.write_str("missing @return doc"),
            Issue::UnnecessaryReturn => f.write_str("@return doc on a Unit declaration"),
        }
    }
}

/// The unit the fixer and the reporters operate on.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub comment: CommentBlock,
    pub declaration: Declaration,
    pub issues: Vec<Issue>,
}
