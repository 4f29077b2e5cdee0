//! Plain-text reporter — one diagnostic per line, editor-friendly
//! `file:line:` prefixes.

use crate::render::{FileReport, Reporter};
use anyhow::Result;

pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, reports: &[FileReport]) -> Result<String> {
        let mut out = String::new();
        let mut total = 0usize;
        for report in reports {
            for result in &report.results {
                for issue in &result.issues {
                    total += 1;
                    out.push_str(&format!(
                        "{}:{}: {} {}: {}\n",
                        report.path,
                        result.comment.line_number,
                        result.declaration.kind,
                        result.declaration.name,
                        issue
                    ));
                }
            }
        }
        if total > 0 {
            out.push_str(&format!("{total} issue(s) found\n"));
        }
        Ok(out)
    }
}
