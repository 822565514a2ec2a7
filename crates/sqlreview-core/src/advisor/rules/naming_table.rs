//! `naming.table`: new tables must follow the naming format and length cap.

use super::object_ident;
use crate::advisor::payload::{Matcher, NamingFormat, PayloadShape};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};
use sqlparser::ast::Ident;

pub struct TableNamingConventionAdvisor {
    dialect: Dialect,
}

impl TableNamingConventionAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for TableNamingConventionAdvisor {
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
            TableNamingChecker {
                status,
                title: ctx.title(),
                format,
                findings: Findings::default(),
            },
        )
    }
}

struct TableNamingChecker {
    status: Status,
    title: String,
    format: NamingFormat,
    findings: Findings,
}

impl TableNamingChecker {
    fn push(&mut self, content: String, table: &Ident, ctx: &Context<'_>) {
        self.findings.push(
            table.span.start,
            Advice::new(
                self.status,
                advice_codes::NAMING_TABLE_CONVENTION_MISMATCH,
                self.title.clone(),
                content,
            )
            .with_line(ctx.line_of(table)),
        );
    }
}

impl Checker for TableNamingChecker {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::CreateTable]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let Node::CreateTable(create) = node else {
            return;
        };
        let Some(table) = object_ident(&create.name) else {
            return;
        };
        let name = ctx.normalize(table);

        if !self.format.matches(&name) {
            let content = format!(
                "\"{name}\" mismatches table naming convention, naming format should be {:?}",
                self.format.describe()
            );
            self.push(content, table, ctx);
        }
        if self.format.exceeds_length(&name) {
            let content = format!(
                "\"{name}\" mismatches table naming convention, its length should be within {} characters",
                self.format.max_length()
            );
            self.push(content, table, ctx);
        }
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
