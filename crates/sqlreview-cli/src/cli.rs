//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use sqlreview_core::{Dialect, Status, UnsupportedRulePolicy};
use std::path::PathBuf;

/// sqlreview - review SQL changes against a rule policy
#[derive(Parser, Debug)]
#[command(name = "sqlreview")]
#[command(about = "Review SQL scripts against naming, safety and type rules", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files to review (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// SQL dialect of the scripts
    #[arg(short, long, value_enum)]
    pub dialect: DialectArg,

    /// Rule set file (.json or .toml); the built-in policy is used when omitted
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// How to handle rules with no advisor for the dialect
    #[arg(long, default_value = "skip", value_enum)]
    pub unsupported: UnsupportedArg,

    /// Maximum statements checked in parallel
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = 4)]
    pub jobs: usize,

    /// Stop reviewing after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Lowest finding severity that makes the run fail
    #[arg(long, default_value = "error", value_enum)]
    pub fail_on: FailOn,

    /// Database the scripts run against
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only print failing files
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
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

impl From<DialectArg> for Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => Dialect::Generic,
            DialectArg::Ansi => Dialect::Ansi,
            DialectArg::Bigquery => Dialect::Bigquery,
            DialectArg::Clickhouse => Dialect::Clickhouse,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Duckdb => Dialect::Duckdb,
            DialectArg::Hive => Dialect::Hive,
            DialectArg::Mssql => Dialect::Mssql,
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Table,
    /// JSON output
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnsupportedArg {
    /// Ignore rules the dialect has no advisor for
    Skip,
    /// Add a warning per unsupported rule to the report
    Report,
    /// Refuse to run
    Fail,
}

impl From<UnsupportedArg> for UnsupportedRulePolicy {
    fn from(arg: UnsupportedArg) -> Self {
        match arg {
            UnsupportedArg::Skip => UnsupportedRulePolicy::Skip,
            UnsupportedArg::Report => UnsupportedRulePolicy::Report,
            UnsupportedArg::Fail => UnsupportedRulePolicy::Fail,
        }
    }
}

/// Severity threshold for a failing exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    Error,
    Warning,
}

impl FailOn {
    pub fn threshold(self) -> Status {
        match self {
            FailOn::Error => Status::Error,
            FailOn::Warning => Status::Warning,
        }
    }
}
