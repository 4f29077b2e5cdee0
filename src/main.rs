//! scalint — check and fix Scaladoc signature tags against declarations.
//!
//! For every `/** ... */` block the tool compares the comment's
//! `@param`/`@tparam`/`@return` tags against the declaration that follows it
//! and reports mismatches. Supports two modes:
//!
//! - **stdin mode**: `scalint < Foo.scala`
//! - **file mode**: `scalint --fix src/**/*.scala`

mod check;
mod content;
mod extract;
mod fix;
mod model;
mod render;
mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use render::FileReport;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "scalint",
    about = "Check and fix Scaladoc @param/@tparam/@return tags against declaration signatures"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Rewrite files in place, inserting TODO FILL IN tags for missing
    /// documentation
    #[arg(long)]
    fix: bool,

    /// Report format: text (default), json
    #[arg(short = 'f', long, default_value = "text")]
    format: String,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.files.is_empty() {
        return stdin_mode(&cli);
    }

    file_mode(&cli)
}

/// stdin mode: read one source from stdin; print the report (check mode) or
/// the rewritten source (fix mode) to stdout.
fn stdin_mode(cli: &Cli) -> Result<ExitCode> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let results = check::check_source(&input);

    if cli.fix {
        let (fixed, n) = fix::apply_fixes(&input, &results);
        log::debug!("fixed {n} comment block(s) from stdin");
        print!("{fixed}");
        return Ok(ExitCode::SUCCESS);
    }

    let issues = count_issues(&results);
    let reporter = render::create_reporter(&cli.format)?;
    let reports = vec![FileReport {
        path: "<stdin>".to_string(),
        results,
    }];
    print!("{}", reporter.render(&reports)?);
    Ok(exit_for(issues))
}

/// file mode: process every matched file; rewrite in place (fix mode) or
/// collect one report across all files (check mode).
fn file_mode(cli: &Cli) -> Result<ExitCode> {
    // Resolve the reporter up front so a bad --format fails before any work.
    let reporter = render::create_reporter(&cli.format)?;
    let input_files = expand_globs(&cli.files)?;

    let mut reports = Vec::new();
    let mut issues = 0usize;
    for path in &input_files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("warning: skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let results = check::check_source(&content);

        if cli.fix {
            let (fixed, n) = fix::apply_fixes(&content, &results);
            if n > 0 {
                fs::write(path, &fixed)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("{}: fixed {} comment block(s)", path.display(), n);
            }
        } else {
            issues += count_issues(&results);
            reports.push(FileReport {
                path: path.to_string_lossy().to_string(),
                results,
            });
        }
    }

    if cli.fix {
        return Ok(ExitCode::SUCCESS);
    }

    print!("{}", reporter.render(&reports)?);
    Ok(exit_for(issues))
}

fn count_issues(results: &[model::CheckResult]) -> usize {
    results.iter().map(|r| r.issues.len()).sum()
}

/// Linter convention: status 1 when anything was found.
fn exit_for(issues: usize) -> ExitCode {
    if issues > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// File extensions recognized as source files.
const SUPPORTED_EXTENSIONS: &[&str] = &["scala", "sc"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // If it's a directory, scan for supported extensions (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        // Try as glob
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
