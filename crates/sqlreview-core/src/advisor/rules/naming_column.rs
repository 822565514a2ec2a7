//! `naming.column`: columns of new tables must follow the naming format.

use super::object_ident;
use crate::advisor::payload::{Matcher, NamingFormat, PayloadShape};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};

pub struct ColumnNamingConventionAdvisor {
    dialect: Dialect,
}

impl ColumnNamingConventionAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for ColumnNamingConventionAdvisor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn payload_shape(&self) -> PayloadShape {
        PayloadShape::Naming
    }

    fn check(&self, ctx: &Context<'_>, _statement: &str) -> Result<Vec<Advice>, AdvisorError> {
        let Some(status) = ctx.status() else {
            return Ok(vec![Advice::ok()]);
        };
        let format = NamingFormat::decode(ctx.rule.payload.as_ref())?;

        run_checker(
            ctx,
            self.dialect,
            ColumnNamingChecker {
                status,
                title: ctx.title(),
                format,
                findings: Findings::default(),
            },
        )
    }
}

struct ColumnNamingChecker {
    status: Status,
    title: String,
    format: NamingFormat,
    findings: Findings,
}

impl Checker for ColumnNamingChecker {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::ColumnDef]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let Node::ColumnDef { table, column } = node else {
            return;
        };
        let table = object_ident(table)
            .map(|ident| ctx.normalize(ident))
            .unwrap_or_default();
        let name = ctx.normalize(&column.name);
        let line = ctx.line_of(&column.name);

        let mut contents = Vec::new();
        if !self.format.matches(&name) {
            contents.push(format!(
                "\"{table}\".\"{name}\" mismatches column naming convention, naming format should be {:?}",
                self.format.describe()
            ));
        }
        if self.format.exceeds_length(&name) {
            contents.push(format!(
                "\"{table}\".\"{name}\" mismatches column naming convention, its length should be within {} characters",
                self.format.max_length()
            ));
        }

        for content in contents {
            self.findings.push(
                column.name.span.start,
                Advice::new(
                    self.status,
                    advice_codes::NAMING_COLUMN_CONVENTION_MISMATCH,
                    self.title.clone(),
                    content,
                )
                .with_line(line),
            );
        }
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
