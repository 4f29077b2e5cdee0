//! Reporter module — trait-based format dispatch.

pub mod json;
pub mod text;

use crate::model::CheckResult;
use anyhow::{anyhow, Result};

/// One checked file and its results.
pub struct FileReport {
    pub path: String,
    pub results: Vec<CheckResult>,
}

/// Trait for rendering check results into a specific output format.
pub trait Reporter {
    fn render(&self, reports: &[FileReport]) -> Result<String>;
}

/// Create a reporter for the given format name.
pub fn create_reporter(format: &str) -> Result<Box<dyn Reporter>> {
    match format {
        "text" => Ok(Box::new(text::TextReporter)),
        "json" => Ok(Box::new(json::JsonReporter)),
        _ => Err(anyhow!("unknown format: {}. Use text or json", format)),
    }
}
