//! `column.type-disallow-list`: new columns must not use a banned type.

use super::object_ident;
use crate::advisor::payload::{Matcher, PayloadShape, StringSet};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};

pub struct ColumnTypeDisallowListAdvisor {
    dialect: Dialect,
}

impl ColumnTypeDisallowListAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for ColumnTypeDisallowListAdvisor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::StringList
    }

    fn check(&self, ctx: &Context<'_>, _statement: &str) -> Result<Vec<Advice>, AdvisorError> {
        let Some(status) = ctx.status() else {
            return Ok(vec![Advice::ok()]);
        };
        let disallowed = StringSet::decode(ctx.rule.payload.as_ref())?;

        run_checker(
            ctx,
            self.dialect,
            TypeChecker {
                status,
                title: ctx.title(),
                disallowed,
                findings: Findings::default(),
            },
        )
    }
}

struct TypeChecker {
    status: Status,
    title: String,
    disallowed: StringSet,
    findings: Findings,
}

impl Checker for TypeChecker {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::ColumnDef]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let Node::ColumnDef { table, column } = node else {
            return;
        };
        let type_text = column.data_type.to_string().to_uppercase();
        // `VARCHAR(20)` is banned by either `VARCHAR(20)` or `VARCHAR`.
        let base = type_text.split('(').next().unwrap_or_default().trim();
        if !self.disallowed.matches(&type_text) && !self.disallowed.matches(base) {
            return;
        }

        let table = object_ident(table)
            .map(|ident| ctx.normalize(ident))
            .unwrap_or_default();
        let name = ctx.normalize(&column.name);
        self.findings.push(
            column.name.span.start,
            Advice::new(
                self.status,
                advice_codes::DISABLED_COLUMN_TYPE,
                self.title.clone(),
                format!("Disallow column type {type_text} but column \"{table}\".\"{name}\" is"),
            )
            .with_line(ctx.line_of(&column.name)),
        );
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
