//! JSON output formatting.

use anyhow::{Context, Result};

use super::FileReport;

/// Format the per-file reports as a JSON array.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(reports: &[FileReport], compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(reports)
    } else {
        serde_json::to_string_pretty(reports)
    };
    json.context("Failed to serialize review report")
}
