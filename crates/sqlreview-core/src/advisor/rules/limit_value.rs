//! `statement.maximum-limit-value`: LIMIT values must stay under a threshold.

use crate::advisor::payload::{NumberLimit, PayloadShape};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};
use sqlparser::ast::{Expr, LimitClause, Query, Value, ValueWithSpan};

pub struct MaximumLimitValueAdvisor {
    dialect: Dialect,
}

impl MaximumLimitValueAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for MaximumLimitValueAdvisor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::Number
    }

    fn check(&self, ctx: &Context<'_>, _statement: &str) -> Result<Vec<Advice>, AdvisorError> {
        let Some(status) = ctx.status() else {
            return Ok(vec![Advice::ok()]);
        };
        let limit = NumberLimit::decode(ctx.rule.payload.as_ref())?;

        run_checker(
            ctx,
            self.dialect,
            LimitChecker {
                status,
                title: ctx.title(),
                limit,
                findings: Findings::default(),
            },
        )
    }
}

struct LimitChecker {
    status: Status,
    title: String,
    limit: NumberLimit,
    findings: Findings,
}

fn limit_expr(query: &Query) -> Option<&Expr> {
    match query.limit_clause.as_ref()? {
        LimitClause::LimitOffset { limit, .. } => limit.as_ref(),
        LimitClause::OffsetCommaLimit { limit, .. } => Some(limit),
    }
}

/// Judges an integer literal against the limit. Literals too large for `i64` are
/// over any limit; fractional and exponent forms are not judged.
fn exceeds(limit: &NumberLimit, literal: &str) -> Option<bool> {
    if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(literal.parse::<i64>().map_or(true, |value| !limit.allows(value)))
}

impl Checker for LimitChecker {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Query]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let Node::Query(query) = node else {
            return;
        };
        // Only literal limits can be judged statically.
        let Some(Expr::Value(ValueWithSpan {
            value: Value::Number(number, _),
            span,
        })) = limit_expr(query)
        else {
            return;
        };
        if exceeds(&self.limit, number) != Some(true) {
            return;
        }
        self.findings.push(
            span.start,
            Advice::new(
                self.status,
                advice_codes::STATEMENT_EXCEED_MAXIMUM_LIMIT_VALUE,
                self.title.clone(),
                format!(
                    "The limit value {number} exceeds the maximum allowed value {}",
                    self.limit.max()
                ),
            )
            .with_line(ctx.line_of_span(*span)),
        );
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
