//! Newline-delimited pattern files

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// Read one pattern per line; blank lines are skipped
pub fn read_pattern_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pattern file '{}'", path.display()))?;

    let patterns = parse_patterns(&content);
    if patterns.is_empty() {
        bail!(
            "no patterns in '{}': specify at least one pattern to filter with",
            path.display()
        );
    }
    Ok(patterns)
}

pub fn parse_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
