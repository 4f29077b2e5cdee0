//! Declaration extractor — surface-syntax signature facts.
//!
//! Pattern-matches the text window following a comment block for the first
//! `def`/`class`/`trait`/`object`/`val`/`var` keyword behind optional
//! annotations and modifiers, then pulls out the name, type-parameter names,
//! value-parameter names, and the raw return type. No symbol table, no type
//! resolution; anything that matches no known shape degrades to
//! [`DeclKind::Unknown`].

use crate::model::{DeclKind, Declaration};
use regex::Regex;
use std::sync::LazyLock;

/// How many non-blank lines after a comment are searched for a declaration.
const DECL_WINDOW_LINES: usize = 40;

// Annotations (with an optional one-level-nested argument list) and modifier
// keywords may precede the declaration keyword; nothing else.
static RE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)^(?:\s+",
        r"|@[\w.]+(?:\((?:[^()]|\([^()]*\))*\))?",
        r"|(?:private|protected)\[[^\]]*\]",
        r"|(?:final|sealed|abstract|implicit|lazy|override|case|open|inline|transparent|infix|private|protected)\b",
        r")*(def|class|trait|object|val|var)\s+(.+)$",
    ))
    .unwrap()
});

/// Build the bounded extraction window: the next non-blank lines of source
/// text starting at byte offset `from`.
pub fn declaration_chunk(source: &str, from: usize) -> String {
    source[from..]
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DECL_WINDOW_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract a declaration from a raw chunk of source text.
pub fn extract(chunk: &str) -> Declaration {
    let Some(caps) = RE_DECL.captures(chunk) else {
        log::debug!("no declaration shape in chunk, treating as unknown");
        return Declaration::unknown();
    };
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    match &caps[1] {
        "def" => parse_def(rest),
        "class" => parse_template(rest, DeclKind::Class),
        "trait" => parse_template(rest, DeclKind::Trait),
        "object" => named_only(rest, DeclKind::Object),
        "val" => named_only(rest, DeclKind::Val),
        "var" => named_only(rest, DeclKind::Var),
        _ => Declaration::unknown(),
    }
}

/// `def name[A, B](x: T)(y: U): R = ...` — curried groups are concatenated.
fn parse_def(rest: &str) -> Declaration {
    let (name, after) = take_name(rest);
    let (type_params, after) = take_type_params(after);

    let mut params = Vec::new();
    let mut rem = after.trim_start();
    while rem.starts_with('(') {
        let (inner, after_group) = balanced_span(rem, '(', ')');
        params.extend(split_top_level(inner).iter().filter_map(|e| param_name(e)));
        rem = after_group.trim_start();
    }

    let return_type = rem
        .strip_prefix(':')
        .and_then(capture_return_type);

    Declaration {
        kind: DeclKind::Def,
        name,
        type_params,
        params,
        return_type,
    }
}

/// `class`/`trait`: name, optional type parameters, optional single
/// constructor parameter group.
fn parse_template(rest: &str, kind: DeclKind) -> Declaration {
    let (name, after) = take_name(rest);
    let (type_params, after) = take_type_params(after);

    let mut params = Vec::new();
    let rem = after.trim_start();
    if rem.starts_with('(') {
        let (inner, _) = balanced_span(rem, '(', ')');
        params.extend(split_top_level(inner).iter().filter_map(|e| param_name(e)));
    }

    Declaration {
        kind,
        name,
        type_params,
        params,
        return_type: None,
    }
}

fn named_only(rest: &str, kind: DeclKind) -> Declaration {
    let (name, _) = take_name(rest);
    Declaration {
        kind,
        name,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: None,
    }
}

/// The name runs up to the first `(`, `[`, `:`, `=`, or whitespace.
fn take_name(rest: &str) -> (String, &str) {
    let end = rest
        .find(|c: char| matches!(c, '(' | '[' | ':' | '=') || c.is_whitespace())
        .unwrap_or(rest.len());
    (rest[..end].to_string(), &rest[end..])
}

fn take_type_params(after: &str) -> (Vec<String>, &str) {
    let rem = after.trim_start();
    if !rem.starts_with('[') {
        return (Vec::new(), after);
    }
    let (inner, rest) = balanced_span(rem, '[', ']');
    let names = split_top_level(inner)
        .iter()
        .filter_map(|e| tparam_name(e))
        .collect();
    (names, rest)
}

/// Given `s` starting with `open`, return the text inside the balanced pair
/// and the remainder after the matching `close`. Unbalanced input takes
/// everything to the end.
fn balanced_span(s: &str, open: char, close: char) -> (&str, &str) {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return (&s[1..i], &s[i + close.len_utf8()..]);
            }
        }
    }
    (&s[1..], "")
}

/// Split on commas at bracket depth zero. Commas nested inside `[...]`,
/// `(...)`, or `{...}` never separate entries. Shared by parameter and
/// type-parameter extraction.
pub fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

const PARAM_PREFIXES: &[&str] = &[
    "implicit",
    "using",
    "given",
    "override",
    "final",
    "private",
    "protected",
    "val",
    "var",
];

/// The identifier before `:` in one parameter entry, after stripping
/// keyword prefixes. Entries whose name is empty or does not start with a
/// letter are skipped.
fn param_name(entry: &str) -> Option<String> {
    let mut head = entry.split(':').next().unwrap_or("").trim();
    loop {
        let before = head;
        for kw in PARAM_PREFIXES {
            if let Some(stripped) = head.strip_prefix(kw) {
                if stripped.starts_with(char::is_whitespace) {
                    head = stripped.trim_start();
                }
            }
        }
        if head == before {
            break;
        }
    }
    let name = head.split_whitespace().next().unwrap_or("");
    if name.starts_with(|c: char| c.is_alphabetic()) {
        Some(name.to_string())
    } else {
        None
    }
}

/// The leading identifier of one type-parameter entry; variance markers and
/// bound clauses are stripped.
fn tparam_name(entry: &str) -> Option<String> {
    let t = entry.trim().trim_start_matches(['+', '-']).trim_start();
    let ident: String = t
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if ident.is_empty() {
        None
    } else {
        Some(ident)
    }
}

/// Return-type text after the `:`, terminated by a top-level `=` (but not
/// `=>`) or `{`, or the end of the window.
fn capture_return_type(s: &str) -> Option<String> {
    let mut depth = 0i32;
    let mut end = s.len();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '{' if depth == 0 => {
                end = i;
                break;
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            '=' if depth == 0 => {
                if chars.peek().map(|(_, n)| *n) != Some('>') {
                    end = i;
                    break;
                }
            }
            _ => {}
        }
    }
    let t = s[..end].trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
