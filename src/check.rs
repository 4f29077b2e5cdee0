//! Validator — compares a comment's shallow tag lists against the
//! declaration signature and enumerates every mismatch. Pure and total:
//! malformed declarations are `Unknown` and produce nothing to check.

use crate::extract;
use crate::model::{CheckResult, CommentBlock, DeclKind, Declaration, Issue};
use crate::scanner;

/// Validate one comment against its declaration. All issues are enumerated;
/// nothing short-circuits.
pub fn validate(comment: &CommentBlock, declaration: &Declaration) -> Vec<Issue> {
    let mut issues = Vec::new();

    if matches!(
        declaration.kind,
        DeclKind::Def | DeclKind::Class | DeclKind::Trait
    ) {
        let missing_tparams = difference(&declaration.type_params, &comment.shallow_tparams);
        if !missing_tparams.is_empty() {
            issues.push(Issue::MissingTparam {
                names: missing_tparams,
            });
        }
        let unknown_tparams = difference(&comment.shallow_tparams, &declaration.type_params);
        if !unknown_tparams.is_empty() {
            issues.push(Issue::UnknownTparam {
                names: unknown_tparams,
            });
        }

        let missing_params = difference(&declaration.params, &comment.shallow_params);
        if !missing_params.is_empty() {
            issues.push(Issue::MissingParam {
                names: missing_params,
            });
        }
        let unknown_params = difference(&comment.shallow_params, &declaration.params);
        if !unknown_params.is_empty() {
            issues.push(Issue::UnknownParam {
                names: unknown_params,
            });
        }
    }

    if declaration.kind == DeclKind::Def {
        match declaration.return_type.as_deref().map(str::trim) {
            None => {}
            Some("Unit") => {
                if comment.has_return_tag {
                    issues.push(Issue::UnnecessaryReturn);
                }
            }
            Some(_) => {
                if !comment.has_return_tag && !comment.is_one_liner {
                    issues.push(Issue::MissingReturn);
                }
            }
        }
    }

    issues
}

/// Names in `left` with no counterpart in `right`, in `left` order.
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    left.iter()
        .filter(|name| !right.contains(name))
        .cloned()
        .collect()
}

/// Run the whole per-file pipeline: scan comment blocks, extract the
/// declaration following each, validate the pair.
pub fn check_source(source: &str) -> Vec<CheckResult> {
    scanner::scan(source)
        .into_iter()
        .map(|comment| {
            let chunk = extract::declaration_chunk(source, comment.end);
            let declaration = extract::extract(&chunk);
            let issues = validate(&comment, &declaration);
            CheckResult {
                comment,
                declaration,
                issues,
            }
        })
        .collect()
}
