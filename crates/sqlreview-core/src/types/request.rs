//! Request types for the SQL review API.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A request to review a SQL script against a rule set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// The SQL script to review (UTF-8 string, multi-statement supported)
    pub sql: String,

    /// SQL dialect of the script
    pub dialect: Dialect,

    /// Ordered rule definitions to apply
    pub rules: Vec<RuleDefinition>,

    /// Optional review options
    #[serde(default)]
    pub options: ReviewOptions,
}

/// SQL dialect for parsing and review.
///
/// Different dialects have different grammars and identifier normalization behavior.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            AnsiDialect, BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect,
            GenericDialect, HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
            RedshiftSqlDialect, SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::Ansi => Box::new(AnsiDialect {}),
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks => Box::new(DatabricksDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Mssql => Box::new(MsSqlDialect {}),
            Self::Mysql => Box::new(MySqlDialect {}),
            Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Ansi => "ansi",
            Self::Bigquery => "bigquery",
            Self::Clickhouse => "clickhouse",
            Self::Databricks => "databricks",
            Self::Duckdb => "duckdb",
            Self::Hive => "hive",
            Self::Mssql => "mssql",
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured severity of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    /// The rule is skipped entirely
    Disabled,
    Info,
    #[default]
    Warning,
    Error,
}

/// Identifier of a lint rule category, e.g. `table.drop-naming-convention`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RuleType(Cow<'static, str>);

impl RuleType {
    pub const TABLE_DROP_NAMING_CONVENTION: Self =
        Self(Cow::Borrowed("table.drop-naming-convention"));
    pub const NAMING_TABLE: Self = Self(Cow::Borrowed("naming.table"));
    pub const NAMING_COLUMN: Self = Self(Cow::Borrowed("naming.column"));
    pub const STATEMENT_WHERE_REQUIRE: Self = Self(Cow::Borrowed("statement.where.require"));
    pub const STATEMENT_MAXIMUM_LIMIT_VALUE: Self =
        Self(Cow::Borrowed("statement.maximum-limit-value"));
    pub const COLUMN_TYPE_DISALLOW_LIST: Self = Self(Cow::Borrowed("column.type-disallow-list"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single rule as supplied by the rule-set policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Rule category
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Configured severity (default: warning)
    #[serde(default)]
    pub level: RuleLevel,

    /// Restricts the rule to one dialect; applies to every dialect when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,

    /// Rule-specific configuration, decoded by the advisor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl RuleDefinition {
    pub fn new(rule_type: RuleType, level: RuleLevel) -> Self {
        Self {
            rule_type,
            level,
            dialect: None,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Returns true if the rule applies to `dialect` and is not disabled.
    pub fn is_active_for(&self, dialect: Dialect) -> bool {
        self.level != RuleLevel::Disabled && self.dialect.map_or(true, |d| d == dialect)
    }
}

/// An ordered collection of rule definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Default policy covering every shipped rule type at warning level.
    pub fn builtin() -> Self {
        use serde_json::json;

        let naming = json!({ "format": "^[a-z]+(_[a-z]+)*$", "maxLength": 64 });
        Self {
            rules: vec![
                RuleDefinition::new(RuleType::TABLE_DROP_NAMING_CONVENTION, RuleLevel::Warning)
                    .with_payload(json!({ "format": "_del$" })),
                RuleDefinition::new(RuleType::NAMING_TABLE, RuleLevel::Warning)
                    .with_payload(naming.clone()),
                RuleDefinition::new(RuleType::NAMING_COLUMN, RuleLevel::Warning)
                    .with_payload(naming),
                RuleDefinition::new(RuleType::STATEMENT_WHERE_REQUIRE, RuleLevel::Warning),
                RuleDefinition::new(RuleType::STATEMENT_MAXIMUM_LIMIT_VALUE, RuleLevel::Warning)
                    .with_payload(json!({ "number": 1000 })),
                RuleDefinition::new(RuleType::COLUMN_TYPE_DISALLOW_LIST, RuleLevel::Warning)
                    .with_payload(json!({ "list": ["JSON", "BLOB"] })),
            ],
        }
    }
}

/// What to do with a rule that has no advisor for the reviewed dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedRulePolicy {
    /// Ignore the rule (logged when tracing is enabled)
    #[default]
    Skip,
    /// Emit one `Unsupported` advice per rule at the head of the report
    Report,
    /// Fail the whole review
    Fail,
}

/// Options controlling a review run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOptions {
    /// Handling of rules without an advisor for the dialect
    #[serde(default)]
    pub unsupported_rules: UnsupportedRulePolicy,

    /// Upper bound on statements checked in parallel
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Wall-clock budget for the run in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Database the script runs against, passed to advisors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_database: Option<String>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            unsupported_rules: UnsupportedRulePolicy::default(),
            max_workers: default_max_workers(),
            timeout_ms: None,
            current_database: None,
        }
    }
}

fn default_max_workers() -> usize {
    4
}
