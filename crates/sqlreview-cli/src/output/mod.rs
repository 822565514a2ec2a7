//! Output formatting modules.

pub mod json;
pub mod report;

pub use json::format_json;
pub use report::format_report;

use serde::Serialize;
use sqlreview_core::{ReviewReport, Status};

/// Review result for one input script.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub report: ReviewReport,
}

impl FileReport {
    /// True when the review did not finish, the script has a syntax error, or a
    /// finding is at or above `threshold`.
    pub fn fails_at(&self, threshold: Status) -> bool {
        !self.report.complete
            || self.report.summary.syntax_error_count > 0
            || self.report.highest_status() >= threshold
    }
}
