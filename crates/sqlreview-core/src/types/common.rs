//! Common types shared between request and response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::request::RuleLevel;

/// Outcome status of a single advice entry.
///
/// Variants are declared in ascending order of severity so that `Ord`
/// can be used to find the most severe status in a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Info,
    Warning,
    Error,
}

impl Status {
    /// Maps a configured rule level onto the status its findings carry.
    ///
    /// Returns `None` for [`RuleLevel::Disabled`]: a disabled rule never
    /// produces findings.
    pub const fn from_rule_level(level: RuleLevel) -> Option<Self> {
        match level {
            RuleLevel::Disabled => None,
            RuleLevel::Info => Some(Self::Info),
            RuleLevel::Warning => Some(Self::Warning),
            RuleLevel::Error => Some(Self::Error),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable numeric identifier of the condition an advice reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct AdviceCode(pub u32);

impl fmt::Display for AdviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Machine-readable advice codes.
pub mod advice_codes {
    use super::AdviceCode;

    pub const OK: AdviceCode = AdviceCode(0);
    pub const INTERNAL: AdviceCode = AdviceCode(1);
    pub const UNSUPPORTED: AdviceCode = AdviceCode(3);
    pub const REVIEW_INCOMPLETE: AdviceCode = AdviceCode(4);

    // Statement rules
    pub const STATEMENT_SYNTAX_ERROR: AdviceCode = AdviceCode(201);
    pub const STATEMENT_NO_WHERE: AdviceCode = AdviceCode(202);
    pub const STATEMENT_EXCEED_MAXIMUM_LIMIT_VALUE: AdviceCode = AdviceCode(222);

    // Naming rules
    pub const NAMING_TABLE_CONVENTION_MISMATCH: AdviceCode = AdviceCode(301);
    pub const NAMING_COLUMN_CONVENTION_MISMATCH: AdviceCode = AdviceCode(302);

    // Column rules
    pub const DISABLED_COLUMN_TYPE: AdviceCode = AdviceCode(411);

    // Table rules
    pub const TABLE_DROP_NAMING_CONVENTION_MISMATCH: AdviceCode = AdviceCode(603);
}

/// One structured review finding.
///
/// Serializes to the flat record `{status, code, title, content, line}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// Severity of the finding
    pub status: Status,

    /// Stable identifier of the violated condition
    pub code: AdviceCode,

    /// Short title, usually the rule type that produced the finding
    pub title: String,

    /// Human-readable message
    pub content: String,

    /// 1-based source line, 0 when not tied to a line
    #[serde(default)]
    pub line: usize,
}

impl Advice {
    pub fn new(
        status: Status,
        code: AdviceCode,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            title: title.into(),
            content: content.into(),
            line: 0,
        }
    }

    /// The synthetic "all clear" entry appended when no rule fired.
    pub fn ok() -> Self {
        Self::new(Status::Success, advice_codes::OK, "OK", "")
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Returns true if this is the synthetic success entry.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Success && self.code == advice_codes::OK
    }
}

/// Counts of advice entries by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdviceCount {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

/// Summary statistics for a review report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Number of statements found in the script
    pub statement_count: usize,

    /// Number of statements that failed to parse
    pub syntax_error_count: usize,

    /// Advice counts by severity (success entries are not counted)
    pub advice_count: AdviceCount,

    /// Most severe status across the whole report
    pub highest_status: Option<Status>,
}

impl Summary {
    /// Builds summary statistics from a flat advice list.
    pub fn from_advices(statement_count: usize, advices: &[Advice]) -> Self {
        let mut advice_count = AdviceCount::default();
        let mut syntax_error_count = 0;
        for advice in advices {
            match advice.status {
                Status::Error => advice_count.errors += 1,
                Status::Warning => advice_count.warnings += 1,
                Status::Info => advice_count.infos += 1,
                Status::Success => {}
            }
            if advice.code == advice_codes::STATEMENT_SYNTAX_ERROR {
                syntax_error_count += 1;
            }
        }

        Self {
            statement_count,
            syntax_error_count,
            advice_count,
            highest_status: advices.iter().map(|advice| advice.status).max(),
        }
    }

    /// Quick check: true if any error-level advice was produced.
    pub fn has_errors(&self) -> bool {
        self.advice_count.errors > 0
    }
}
