//! Error types for SQL parsing and review.
//!
//! # Error Handling Strategy
//!
//! Review outcomes fall into disjoint classes:
//!
//! - [`crate::types::Advice`]: lint findings and syntax errors. These are data, not
//!   errors. A statement that fails to parse yields a single error-status advice and
//!   does not stop the other statements of the script from being checked.
//!
//! - [`ConfigError`]: a rule payload that does not decode into the shape its advisor
//!   expects. Surfaced to the caller, never downgraded to an empty advice list.
//!
//! - [`AdvisorError::Internal`]: the engine malfunctioned (e.g. an advisor received a
//!   tree for another dialect). Never mapped onto a severity level.
//!
//! [`ReviewError`] wraps the last two with the rule and statement they occurred in.

use crate::review::ReviewState;
use crate::types::{Dialect, RuleType};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error encountered while parsing a statement.
///
/// Preserves structured information from the underlying parser including
/// position information when available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Position where the error occurred, if available.
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    pub dialect: Option<Dialect>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Missing required clause or keyword.
    MissingClause,
    /// Invalid or unexpected end of input.
    UnexpectedEof,
    /// Feature not supported by the current dialect.
    UnsupportedFeature,
    /// Lexer/tokenization error.
    LexerError,
}

impl ParseErrorKind {
    /// Title of the advice reporting an error of this kind.
    pub fn title(self) -> &'static str {
        match self {
            Self::SyntaxError => "Syntax error",
            Self::MissingClause => "Syntax error: missing clause",
            Self::UnexpectedEof => "Syntax error: unexpected end of statement",
            Self::UnsupportedFeature => "Syntax error: not supported by dialect",
            Self::LexerError => "Syntax error: invalid token",
        }
    }
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Line of the error within the parsed text, if the parser reported one.
    pub fn line(&self) -> Option<usize> {
        self.position.map(|pos| pos.line)
    }

    /// Parses position from the sqlparser message format
    /// ("Expected ..., found ... at Line: X, Column: Y").
    ///
    /// Coupled to the `sqlparser` message format; returns `None` when the
    /// expected pattern is not present.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let result = re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if result.is_none() && message.contains("Line") {
            trace!(
                "Failed to parse position from error message that appears to contain position info: {}",
                message
            );
        }

        result
    }

    fn infer_kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("unexpected end") || lower.contains("eof") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("expected") {
            ParseErrorKind::MissingClause
        } else if lower.contains("not supported") || lower.contains("unsupported") {
            ParseErrorKind::UnsupportedFeature
        } else if lower.contains("tokenizer") || lower.contains("unterminated") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);
        let kind = match err {
            sqlparser::parser::ParserError::TokenizerError(_) => ParseErrorKind::LexerError,
            _ => Self::infer_kind_from_message(&message),
        };

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}

/// A rule payload that does not fit the shape its advisor expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rule requires a payload but none was supplied")]
    MissingPayload,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid naming pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Failure of a single advisor invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Engine malfunction, e.g. a tree of the wrong dialect.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure while building the rule registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("advisor for rule {rule_type} is already registered for dialect {dialect}")]
    DuplicateAdvisor { dialect: Dialect, rule_type: RuleType },
}

/// Unrecoverable failure of a review run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// An advisor failed while checking a statement.
    #[error("rule {rule_type} failed on statement {statement_index}: {source}")]
    Rule {
        rule_type: RuleType,
        statement_index: usize,
        #[source]
        source: AdvisorError,
    },

    /// A rule payload failed validation before any statement was checked.
    #[error("rule {rule_type} is misconfigured: {source}")]
    Config {
        rule_type: RuleType,
        #[source]
        source: ConfigError,
    },

    /// The policy requires a rule the dialect has no advisor for.
    #[error("rule {rule_type} is not supported for dialect {dialect}")]
    UnsupportedRule { dialect: Dialect, rule_type: RuleType },

    /// No advisor at all is registered for the dialect.
    #[error("dialect {0} has no registered advisors")]
    UnsupportedDialect(Dialect),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The run attempted an illegal state change.
    #[error("illegal review state transition from {from:?} to {to:?}")]
    InvalidTransition { from: ReviewState, to: ReviewState },

    /// The worker pool could not be created.
    #[error("failed to start review workers: {0}")]
    WorkerPool(String),
}

impl ReviewError {
    /// Returns true if the failure is a configuration problem rather than an
    /// engine malfunction.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Rule { source, .. } => matches!(source, AdvisorError::Config(_)),
            Self::Config { .. } | Self::UnsupportedRule { .. } | Self::UnsupportedDialect(_) => {
                true
            }
            Self::Registry(_) | Self::InvalidTransition { .. } | Self::WorkerPool(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_from_message() {
        let msg = "Expected: end of statement, found: x at Line: 2, Column: 7";
        let pos = ParseError::parse_position_from_message(msg);
        assert_eq!(pos, Some(Position { line: 2, column: 7 }));
    }

    #[test]
    fn test_parse_position_no_position() {
        assert_eq!(
            ParseError::parse_position_from_message("Unexpected token"),
            None
        );
    }

    #[test]
    fn test_parse_position_reversed_order() {
        let msg = "Error at Column: 5, Line: 1";
        assert_eq!(ParseError::parse_position_from_message(msg), None);
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(
            ParseError::infer_kind_from_message("Unexpected EOF while parsing"),
            ParseErrorKind::UnexpectedEof
        );
        assert_eq!(
            ParseError::infer_kind_from_message("Expected: identifier, found: ;"),
            ParseErrorKind::MissingClause
        );
        assert_eq!(
            ParseError::infer_kind_from_message("DROP FUNCTION is not supported"),
            ParseErrorKind::UnsupportedFeature
        );
        assert_eq!(
            ParseError::infer_kind_from_message("garbage"),
            ParseErrorKind::SyntaxError
        );
    }

    #[test]
    fn test_tokenizer_failure_is_a_lexer_error() {
        let err = sqlparser::parser::Parser::parse_sql(
            &sqlparser::dialect::MySqlDialect {},
            "SELECT 'oops",
        )
        .unwrap_err();
        let err = ParseError::from(err);
        assert_eq!(err.kind, ParseErrorKind::LexerError);
        assert_eq!(err.kind.title(), "Syntax error: invalid token");
    }

    #[test]
    fn test_display_with_dialect_and_position() {
        let mut err = ParseError::new("bad input").with_dialect(Dialect::Mssql);
        err.position = Some(Position { line: 3, column: 1 });
        assert_eq!(
            err.to_string(),
            "Parse error (mssql) at line 3, column 1: bad input"
        );
    }

    #[test]
    fn test_review_error_classification() {
        let config = ReviewError::Rule {
            rule_type: RuleType::NAMING_TABLE,
            statement_index: 0,
            source: AdvisorError::Config(ConfigError::MissingPayload),
        };
        assert!(config.is_config_error());

        let internal = ReviewError::Rule {
            rule_type: RuleType::NAMING_TABLE,
            statement_index: 2,
            source: AdvisorError::Internal("tree mismatch".to_string()),
        };
        assert!(!internal.is_config_error());
        assert_eq!(
            internal.to_string(),
            "rule naming.table failed on statement 2: internal error: tree mismatch"
        );
    }
}
