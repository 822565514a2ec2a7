//! Response types for the SQL review API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{Advice, Status, Summary};
use super::request::Dialect;

/// The result of reviewing a SQL script.
///
/// `advices` is the script-level report: statement results concatenated in
/// statement order, collapsed to a single success entry when nothing fired.
/// `statements` keeps the same findings grouped per statement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    /// Dialect the script was reviewed as
    pub dialect: Dialect,

    /// Per-statement results in source order
    pub statements: Vec<StatementReport>,

    /// Flat, ordered advice list for the whole script (never empty)
    pub advices: Vec<Advice>,

    /// False when the run was cancelled before every statement was checked
    pub complete: bool,

    /// Indices of statements that were never checked because of cancellation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_statements: Vec<usize>,

    /// Summary statistics
    pub summary: Summary,
}

impl ReviewReport {
    /// Most severe status in the report.
    pub fn highest_status(&self) -> Status {
        self.summary.highest_status.unwrap_or(Status::Success)
    }

    /// Returns true if the report holds only the synthetic success entry.
    pub fn is_clean(&self) -> bool {
        self.complete && self.advices.iter().all(Advice::is_ok)
    }
}

/// Review findings for a single statement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementReport {
    /// Zero-based statement index within the script
    pub index: usize,

    /// 1-based line where the statement starts
    pub line: usize,

    /// Statement text without the trailing delimiter
    pub text: String,

    /// Merged findings of every rule applied to the statement (never empty)
    pub advices: Vec<Advice>,
}
