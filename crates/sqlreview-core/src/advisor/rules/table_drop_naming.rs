//! `table.drop-naming-convention`: only tables matching a naming format may be dropped.
//!
//! Typical use is a "soft delete" convention where a table must first be renamed
//! (e.g. to `*_del`) before it can be dropped.

use super::object_ident;
use crate::advisor::payload::{Matcher, NamingFormat, PayloadShape};
use crate::advisor::walk::{Checker, Findings, Node, NodeKind};
use crate::advisor::{run_checker, Advisor, Context};
use crate::error::AdvisorError;
use crate::types::{advice_codes, Advice, Dialect, Status};

pub struct TableDropNamingConventionAdvisor {
    dialect: Dialect,
}

impl TableDropNamingConventionAdvisor {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Advisor for TableDropNamingConventionAdvisor {
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

        let checker = DropNamingChecker {
            status,
            title: ctx.title(),
            format,
            findings: Findings::default(),
        };
        run_checker(ctx, self.dialect, checker)
    }
}

struct DropNamingChecker {
    status: Status,
    title: String,
    format: NamingFormat,
    findings: Findings,
}

impl Checker for DropNamingChecker {
    fn interests(&self) -> &'static [NodeKind] {
        &[NodeKind::DropTable]
    }

    fn visit(&mut self, node: Node<'_>, ctx: &Context<'_>) {
        let Node::DropTable { names } = node else {
            return;
        };
        for name in names {
            let Some(table) = object_ident(name) else {
                continue;
            };
            let normalized = ctx.normalize(table);
            if self.format.matches(&normalized) {
                continue;
            }
            self.findings.push(
                table.span.start,
                Advice::new(
                    self.status,
                    advice_codes::TABLE_DROP_NAMING_CONVENTION_MISMATCH,
                    self.title.clone(),
                    format!(
                        "[{normalized}] mismatches drop table naming convention, naming format should be {:?}",
                        self.format.describe()
                    ),
                )
                .with_line(ctx.line_of(table)),
            );
        }
    }

    fn into_findings(self) -> Findings {
        self.findings
    }
}
