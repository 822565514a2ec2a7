//! Advisor implementations.
//!
//! Each advisor is dialect-agnostic in its logic and bound to a dialect when it is
//! registered; the tree it receives must come from that dialect's grammar.

mod column_type_disallow;
mod limit_value;
mod naming_column;
mod naming_table;
mod table_drop_naming;
mod where_require;

pub use column_type_disallow::ColumnTypeDisallowListAdvisor;
pub use limit_value::MaximumLimitValueAdvisor;
pub use naming_column::ColumnNamingConventionAdvisor;
pub use naming_table::TableNamingConventionAdvisor;
pub use table_drop_naming::TableDropNamingConventionAdvisor;
pub use where_require::WhereRequirementAdvisor;

use super::registry::RegistryBuilder;
use crate::error::RegistryError;
use crate::types::{Dialect, RuleType};
use sqlparser::ast::{Ident, ObjectName};
use std::sync::Arc;

/// The object's own name: the last part of a qualified name.
pub(crate) fn object_ident(name: &ObjectName) -> Option<&Ident> {
    name.0.last().and_then(|part| part.as_ident())
}

/// Registers the advisors every shipped dialect supports.
pub(crate) fn register_shared(
    builder: &mut RegistryBuilder,
    dialect: Dialect,
) -> Result<(), RegistryError> {
    builder
        .register(
            RuleType::TABLE_DROP_NAMING_CONVENTION,
            Arc::new(TableDropNamingConventionAdvisor::new(dialect)),
        )?
        .register(
            RuleType::NAMING_TABLE,
            Arc::new(TableNamingConventionAdvisor::new(dialect)),
        )?
        .register(
            RuleType::NAMING_COLUMN,
            Arc::new(ColumnNamingConventionAdvisor::new(dialect)),
        )?
        .register(
            RuleType::STATEMENT_WHERE_REQUIRE,
            Arc::new(WhereRequirementAdvisor::new(dialect)),
        )?
        .register(
            RuleType::COLUMN_TYPE_DISALLOW_LIST,
            Arc::new(ColumnTypeDisallowListAdvisor::new(dialect)),
        )?;
    Ok(())
}
