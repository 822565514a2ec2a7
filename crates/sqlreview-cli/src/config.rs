//! Rule set loading from JSON or TOML files.

use anyhow::{bail, Context, Result};
use sqlreview_core::RuleSet;
use std::path::Path;

/// Load the rule set to review with.
///
/// Without a path the built-in policy is returned. The file format follows
/// the extension: `.toml` is parsed as TOML, `.json` as JSON.
pub fn load_rule_set(path: Option<&Path>) -> Result<RuleSet> {
    let Some(path) = path else {
        return Ok(RuleSet::builtin());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule set: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => parse_toml(&content)
            .with_context(|| format!("Invalid TOML rule set: {}", path.display())),
        Some("json") => parse_json(&content)
            .with_context(|| format!("Invalid JSON rule set: {}", path.display())),
        _ => bail!(
            "Unsupported rule set format: {} (expected .json or .toml)",
            path.display()
        ),
    }
}

fn parse_toml(content: &str) -> Result<RuleSet> {
    Ok(toml::from_str(content)?)
}

fn parse_json(content: &str) -> Result<RuleSet> {
    Ok(serde_json::from_str(content)?)
}
