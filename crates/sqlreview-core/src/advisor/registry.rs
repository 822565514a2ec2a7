//! Rule registry: (dialect, rule type) → advisor.
//!
//! Built once through [`RegistryBuilder`], then frozen. The frozen
//! [`RuleRegistry`] is read-only and shared freely across review workers.

use super::{mssql, mysql, postgres, Advisor};
use crate::error::RegistryError;
use crate::types::{Dialect, RuleType};
use std::collections::BTreeMap;
use std::sync::Arc;

type AdvisorMap = BTreeMap<(Dialect, RuleType), Arc<dyn Advisor>>;

/// Mutable registry used during initialization.
#[derive(Default)]
pub struct RegistryBuilder {
    advisors: AdvisorMap,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `advisor` for its dialect. A pair can be registered only once.
    pub fn register(
        &mut self,
        rule_type: RuleType,
        advisor: Arc<dyn Advisor>,
    ) -> Result<&mut Self, RegistryError> {
        let dialect = advisor.dialect();
        let key = (dialect, rule_type);
        if self.advisors.contains_key(&key) {
            let (dialect, rule_type) = key;
            return Err(RegistryError::DuplicateAdvisor { dialect, rule_type });
        }
        self.advisors.insert(key, advisor);
        Ok(self)
    }

    pub fn build(self) -> RuleRegistry {
        RuleRegistry {
            advisors: self.advisors,
        }
    }
}

/// Immutable snapshot of registered advisors.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    advisors: AdvisorMap,
}

impl RuleRegistry {
    /// Looks up the advisor for a pair; `None` means the rule is unsupported there.
    pub fn lookup(&self, dialect: Dialect, rule_type: &RuleType) -> Option<&Arc<dyn Advisor>> {
        self.advisors.get(&(dialect, rule_type.clone()))
    }

    /// Returns true if at least one advisor exists for `dialect`.
    pub fn supports_dialect(&self, dialect: Dialect) -> bool {
        self.advisors.keys().any(|(d, _)| *d == dialect)
    }

    /// Registered pairs in (dialect, rule type) order.
    pub fn entries(&self) -> impl Iterator<Item = (Dialect, &RuleType)> + '_ {
        self.advisors
            .keys()
            .map(|(dialect, rule_type)| (*dialect, rule_type))
    }

    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

/// Registers the advisors of every shipped dialect.
pub fn register_all() -> Result<RuleRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    mysql::register(&mut builder)?;
    postgres::register(&mut builder)?;
    mssql::register(&mut builder)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::rules::TableDropNamingConventionAdvisor;

    #[test]
    fn test_register_all_covers_shipped_dialects() {
        let registry = register_all().unwrap();
        for dialect in [Dialect::Mysql, Dialect::Postgres, Dialect::Mssql] {
            assert!(registry.supports_dialect(dialect));
            assert!(registry
                .lookup(dialect, &RuleType::TABLE_DROP_NAMING_CONVENTION)
                .is_some());
        }
        assert!(!registry.supports_dialect(Dialect::Sqlite));
    }

    #[test]
    fn test_lookup_missing_pair_is_none() {
        let registry = register_all().unwrap();
        assert!(registry
            .lookup(Dialect::Mssql, &RuleType::STATEMENT_MAXIMUM_LIMIT_VALUE)
            .is_none());
        assert!(registry
            .lookup(Dialect::Mysql, &RuleType::new("naming.index"))
            .is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = RegistryBuilder::new();
        let advisor = Arc::new(TableDropNamingConventionAdvisor::new(Dialect::Mssql));
        builder
            .register(RuleType::TABLE_DROP_NAMING_CONVENTION, advisor.clone())
            .unwrap();
        let err = builder
            .register(RuleType::TABLE_DROP_NAMING_CONVENTION, advisor)
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistryError::DuplicateAdvisor {
                dialect: Dialect::Mssql,
                rule_type: RuleType::TABLE_DROP_NAMING_CONVENTION,
            }
        );
    }

    #[test]
    fn test_entries_are_ordered() {
        let registry = register_all().unwrap();
        let entries: Vec<_> = registry.entries().collect();
        let mut sorted = entries.clone();
        sorted.sort();
        assert_eq!(entries, sorted);
        assert_eq!(registry.len(), 17);
    }
}
