//! Advisor contract and shared machinery for rule implementations.
//!
//! An [`Advisor`] is bound to one dialect and one rule type. For each statement it
//! decodes the rule payload, walks the parse tree once with a fresh
//! [`Checker`](walk::Checker) and returns a never-empty advice list.

pub mod aggregate;
pub mod mssql;
pub mod mysql;
pub mod payload;
pub mod postgres;
pub mod registry;
pub mod rules;
pub mod walk;

use crate::error::AdvisorError;
use crate::normalize::IdentifierNormalizer;
use crate::parser::ParseTree;
use crate::types::{Advice, Dialect, RuleDefinition, Status};
use payload::PayloadShape;
use sqlparser::ast::{Ident, Statement};
use sqlparser::tokenizer::Span;
use walk::Checker;

/// Per-invocation input of an advisor.
pub struct Context<'a> {
    /// Parse tree of the statement under review
    pub tree: &'a ParseTree,
    pub rule: &'a RuleDefinition,
    /// Dialect of the review run
    pub dialect: Dialect,
    /// Zero-based index of the statement in the script
    pub statement_index: usize,
    /// 1-based script line where the statement starts
    pub statement_line: usize,
    pub current_database: Option<&'a str>,
    pub normalizer: &'a dyn IdentifierNormalizer,
}

impl Context<'_> {
    /// Returns the parsed statements, checking they came from `expected`'s grammar.
    pub fn statements_for(&self, expected: Dialect) -> Result<&[Statement], AdvisorError> {
        if self.tree.dialect != expected {
            return Err(AdvisorError::Internal(format!(
                "expected a {expected} parse tree, got a {} one",
                self.tree.dialect
            )));
        }
        Ok(&self.tree.statements)
    }

    /// Script line of a node, falling back to the statement line when the parser
    /// recorded no location.
    pub fn line_of_span(&self, span: Span) -> usize {
        match usize::try_from(span.start.line) {
            Ok(line) if line > 0 => self.statement_line + line - 1,
            _ => self.statement_line,
        }
    }

    pub fn line_of(&self, ident: &Ident) -> usize {
        self.line_of_span(ident.span)
    }

    pub fn normalize(&self, ident: &Ident) -> String {
        self.normalizer.normalize_ident(ident)
    }

    /// Severity for findings, or `None` when the rule is disabled.
    pub fn status(&self) -> Option<Status> {
        Status::from_rule_level(self.rule.level)
    }

    /// Advice title: the rule type name.
    pub fn title(&self) -> String {
        self.rule.rule_type.to_string()
    }
}

/// A rule implementation for one dialect.
pub trait Advisor: Send + Sync {
    /// Dialect whose parse trees this advisor understands.
    fn dialect(&self) -> Dialect;

    /// Payload shape the rule expects.
    fn payload_shape(&self) -> PayloadShape;

    /// Checks one statement. The returned list is never empty.
    fn check(&self, ctx: &Context<'_>, statement: &str) -> Result<Vec<Advice>, AdvisorError>;
}

/// Walks the context's tree with `checker` and applies the non-empty rule.
pub(crate) fn run_checker<C: Checker>(
    ctx: &Context<'_>,
    dialect: Dialect,
    mut checker: C,
) -> Result<Vec<Advice>, AdvisorError> {
    let statements = ctx.statements_for(dialect)?;
    walk::walk(statements, ctx, &mut checker);
    Ok(aggregate::ensure_non_empty(checker.into_findings().into_sorted()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::AdvisorError;
    use crate::normalize::DialectNormalizer;
    use crate::parser::{ParseFrontEnd, SqlParserFrontEnd};
    use crate::types::RuleDefinition;

    /// Parses `sql` and runs `advisor` as if the statement started on line 1.
    pub fn check(
        advisor: &dyn Advisor,
        rule: &RuleDefinition,
        sql: &str,
    ) -> Result<Vec<Advice>, AdvisorError> {
        check_at(advisor, rule, sql, 1)
    }

    pub fn check_at(
        advisor: &dyn Advisor,
        rule: &RuleDefinition,
        sql: &str,
        statement_line: usize,
    ) -> Result<Vec<Advice>, AdvisorError> {
        let dialect = advisor.dialect();
        let tree = SqlParserFrontEnd.parse(dialect, sql).expect("parse");
        let normalizer = DialectNormalizer::new(dialect);
        let ctx = Context {
            tree: &tree,
            rule,
            dialect,
            statement_index: 0,
            statement_line,
            current_database: None,
            normalizer: &normalizer,
        };
        advisor.check(&ctx, sql)
    }
}
