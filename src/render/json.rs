//! JSON reporter — structured output for tooling integration.

use crate::render::{FileReport, Reporter};
use anyhow::Result;
use serde_json::{json, Value};

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, reports: &[FileReport]) -> Result<String> {
        let files: Vec<Value> = reports
            .iter()
            .map(|report| {
                let declarations: Vec<Value> = report
                    .results
                    .iter()
                    .filter(|result| !result.issues.is_empty())
                    .map(|result| {
                        json!({
                            "line": result.comment.line_number,
                            "kind": result.declaration.kind,
                            "name": result.declaration.name,
                            "issues": result.issues,
                        })
                    })
                    .collect();
                json!({ "file": report.path, "declarations": declarations })
            })
            .collect();

        let mut out = serde_json::to_string_pretty(&json!({ "files": files }))?;
        out.push('\n');
        Ok(out)
    }
}
