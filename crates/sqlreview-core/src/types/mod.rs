//! Types for the SQL review API.
//!
//! This module defines the request and response types for the review engine.
//! The engine accepts a SQL script with a rule set and returns ordered,
//! structured findings that gate schema and data changes.

mod common;
mod request;
mod response;

// Re-export all public types
pub use common::{advice_codes, Advice, AdviceCode, AdviceCount, Status, Summary};
pub use request::{
    Dialect, ReviewOptions, ReviewRequest, RuleDefinition, RuleLevel, RuleSet, RuleType,
    UnsupportedRulePolicy,
};
pub use response::{ReviewReport, StatementReport};
