//! SQL Server (T-SQL) advisors.
//!
//! T-SQL has no `LIMIT`, so `statement.maximum-limit-value` is not registered.

use super::registry::RegistryBuilder;
use super::rules::register_shared;
use crate::error::RegistryError;
use crate::types::Dialect;

pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    register_shared(builder, Dialect::Mssql)
}
