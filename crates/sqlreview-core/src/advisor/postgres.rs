//! PostgreSQL advisors.

use super::registry::RegistryBuilder;
use super::rules::{register_shared, MaximumLimitValueAdvisor};
use crate::error::RegistryError;
use crate::types::{Dialect, RuleType};
use std::sync::Arc;

const DIALECT: Dialect = Dialect::Postgres;

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    register_shared(builder, DIALECT)?;
    builder.register(
        RuleType::STATEMENT_MAXIMUM_LIMIT_VALUE,
        Arc::new(MaximumLimitValueAdvisor::new(DIALECT)),
    )?;
    Ok(())
}
