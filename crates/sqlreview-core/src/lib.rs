pub mod advisor;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod review;
pub mod types;

// Re-export main types and functions
pub use advisor::registry::{register_all, RegistryBuilder, RuleRegistry};
pub use advisor::{Advisor, Context};
pub use error::{
    AdvisorError, ConfigError, ParseError, ParseErrorKind, RegistryError, ReviewError,
};
pub use normalize::{DialectNormalizer, IdentifierNormalizer};
pub use parser::{parse_sql_with_dialect, split_statements, ParseFrontEnd, ParseTree, SqlParserFrontEnd};
pub use review::{review, CancellationToken, ReviewState, Reviewer};

pub use types::{
    advice_codes,
    // Request types
    Dialect,
    ReviewOptions,
    ReviewRequest,
    RuleDefinition,
    RuleLevel,
    RuleSet,
    RuleType,
    UnsupportedRulePolicy,
    // Response types
    Advice,
    AdviceCode,
    AdviceCount,
    ReviewReport,
    StatementReport,
    Status,
    Summary,
};
