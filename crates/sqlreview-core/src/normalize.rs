//! Identifier normalization per dialect.
//!
//! Rules compare identifiers after quote stripping and case folding so that
//! `[Orders]`, `"orders"` and `orders` are treated alike wherever the dialect
//! considers them equivalent.

use crate::types::Dialect;
use sqlparser::ast::Ident;

/// Case folding applied to identifiers of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationStrategy {
    /// Fold to lowercase (Postgres, Redshift)
    Lowercase,
    /// Fold to uppercase (Snowflake, ANSI)
    Uppercase,
    /// Keep the identifier as written
    Preserve,
}

impl Dialect {
    /// Get the normalization strategy for this dialect.
    pub const fn normalization_strategy(&self) -> NormalizationStrategy {
        match self {
            Dialect::Postgres | Dialect::Redshift => NormalizationStrategy::Lowercase,
            Dialect::Snowflake | Dialect::Ansi => NormalizationStrategy::Uppercase,
            Dialect::Bigquery
            | Dialect::Clickhouse
            | Dialect::Databricks
            | Dialect::Duckdb
            | Dialect::Generic
            | Dialect::Hive
            | Dialect::Mssql
            | Dialect::Mysql
            | Dialect::Sqlite => NormalizationStrategy::Preserve,
        }
    }

    /// Get the opening identifier quote characters for this dialect.
    pub const fn identifier_quotes(&self) -> &'static [char] {
        match self {
            Dialect::Bigquery | Dialect::Databricks | Dialect::Hive | Dialect::Mysql => &['`'],
            Dialect::Clickhouse => &['"', '`'],
            Dialect::Mssql => &['[', '"'],
            Dialect::Sqlite => &['"', '[', '`'],
            _ => &['"'],
        }
    }
}

/// Closing character for an opening identifier quote.
fn closing_quote(open: char) -> char {
    match open {
        '[' => ']',
        other => other,
    }
}

/// Maps a raw identifier to the canonical string rules compare against.
pub trait IdentifierNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;

    /// Normalizes a parsed identifier, honoring its original quoting.
    fn normalize_ident(&self, ident: &Ident) -> String {
        self.normalize(&ident.to_string())
    }
}

/// Normalizer driven by a dialect's quoting and case-folding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectNormalizer {
    dialect: Dialect,
}

impl DialectNormalizer {
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn unquote<'a>(&self, raw: &'a str) -> std::borrow::Cow<'a, str> {
        let mut chars = raw.chars();
        let Some(open) = chars.next() else {
            return raw.into();
        };
        if !self.dialect.identifier_quotes().contains(&open) {
            return raw.into();
        }

        let close = closing_quote(open);
        let inner_start = open.len_utf8();
        if raw.len() < inner_start + close.len_utf8() || !raw[inner_start..].ends_with(close) {
            return raw.into();
        }

        let inner = &raw[inner_start..raw.len() - close.len_utf8()];
        let doubled: String = [close, close].iter().collect();
        if inner.contains(&doubled) {
            inner.replace(&doubled, &close.to_string()).into()
        } else {
            inner.into()
        }
    }
}

impl IdentifierNormalizer for DialectNormalizer {
    fn normalize(&self, raw: &str) -> String {
        let unquoted = self.unquote(raw);
        match self.dialect.normalization_strategy() {
            NormalizationStrategy::Lowercase => unquoted.to_lowercase(),
            NormalizationStrategy::Uppercase => unquoted.to_uppercase(),
            NormalizationStrategy::Preserve => unquoted.into_owned(),
        }
    }
}
