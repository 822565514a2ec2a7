//! `statement.where.require`: UPDATE and DELETE must carry a WHERE clause.

use crate::advisor::payload::{PayloadShape, RuleConfig};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};
use sqlparser::tokenizer::Location;

pub struct WhereRequirementAdvisor {
    dialect: Dialect,
}

impl WhereRequirementAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for WhereRequirementAdvisor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::None
    }

    fn check(&self, ctx: &Context<'_>, statement: &str) -> Result<Vec<Advice>, AdvisorError> {
        let Some(status) = ctx.status() else {
            return Ok(vec![Advice::ok()]);
        };
        RuleConfig::decode(self.payload_shape(), ctx.rule.payload.as_ref())?;

        run_checker(
            ctx,
            self.dialect,
            WhereChecker {
                status,
                title: ctx.title(),
                statement: statement.trim(),
                findings: Findings::default(),
            },
        )
    }
}

struct WhereChecker<'s> {
    status: Status,
    title: String,
    statement: &'s str,
    findings: Findings,
}

impl Checker for WhereChecker<'_> {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::Update, NodeKind::Delete]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let selection = match node {
            Node::Update { selection } | Node::Delete { selection } => selection,
            _ => return,
        };
        if selection.is_some() {
            return;
        }
        // The walk keeps no span for the statement itself.
        self.findings.push(
            Location { line: 0, column: 0 },
            Advice::new(
                self.status,
                advice_codes::STATEMENT_NO_WHERE,
                self.title.clone(),
                format!("\"{}\" requires WHERE clause", self.statement),
            )
            .with_line(ctx.statement_line),
        );
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
