//! Review orchestration: split, parse, check and aggregate a script.

use crate::advisor::aggregate;
use crate::advisor::payload::RuleConfig;
use crate::advisor::registry::{register_all, RuleRegistry};
use crate::advisor::{Advisor, Context};
use crate::error::{ParseError, ReviewError};
use crate::normalize::DialectNormalizer;
use crate::parser::{split_statements, ParseFrontEnd, ParseTree, SqlParserFrontEnd, StatementSource};
use crate::types::{
    advice_codes, Advice, ReviewReport, ReviewRequest, RuleDefinition, StatementReport,
    Status, Summary, UnsupportedRulePolicy,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
#[cfg(feature = "tracing")]
use tracing::{debug, info, info_span, warn};

/// Shared flag used to stop a running review.
///
/// Clones observe the same flag. Statements already being checked finish;
/// statements not yet started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a single review run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Init,
    Parsing,
    PerStatementChecking,
    Aggregating,
    Done,
    Failed,
}

impl ReviewState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the run may move from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Done | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Init, Self::Parsing)
            | (Self::Parsing, Self::PerStatementChecking)
            | (Self::PerStatementChecking, Self::Aggregating)
            | (Self::Aggregating, Self::Done) => true,
            _ => false,
        }
    }

    /// Moves to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: Self) -> Result<(), ReviewError> {
        if !self.can_transition_to(next) {
            return Err(ReviewError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        #[cfg(feature = "tracing")]
        debug!(from = ?*self, to = ?next, "review state");
        *self = next;
        Ok(())
    }
}

/// Cancellation token combined with the optional deadline of a run.
struct Stop<'a> {
    token: &'a CancellationToken,
    deadline: Option<Instant>,
}

impl Stop<'_> {
    fn is_raised(&self) -> bool {
        if self.token.is_cancelled() {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.token.cancel();
                true
            }
            _ => false,
        }
    }
}

/// An active rule paired with the advisor that implements it.
struct ResolvedRule<'r> {
    rule: &'r RuleDefinition,
    advisor: &'r Arc<dyn Advisor>,
}

enum StatementOutcome {
    Checked(Vec<Advice>),
    Skipped,
}

/// Drives review runs against an immutable rule registry.
#[derive(Clone)]
pub struct Reviewer {
    registry: Arc<RuleRegistry>,
    front_end: Arc<dyn ParseFrontEnd>,
}

impl Reviewer {
    pub fn new(registry: RuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            front_end: Arc::new(SqlParserFrontEnd),
        }
    }

    /// Reviewer over every shipped advisor.
    pub fn builtin() -> Result<Self, ReviewError> {
        Ok(Self::new(register_all()?))
    }

    pub fn with_front_end(mut self, front_end: Arc<dyn ParseFrontEnd>) -> Self {
        self.front_end = front_end;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn review(&self, request: &ReviewRequest) -> Result<ReviewReport, ReviewError> {
        self.review_with_cancellation(request, &CancellationToken::new())
    }

    /// Reviews `request`, stopping early once `token` is cancelled or the
    /// request's timeout elapses. An early stop yields an incomplete report.
    pub fn review_with_cancellation(
        &self,
        request: &ReviewRequest,
        token: &CancellationToken,
    ) -> Result<ReviewReport, ReviewError> {
        #[cfg(feature = "tracing")]
        let _span = info_span!("review", dialect = %request.dialect, rules = request.rules.len())
            .entered();

        let mut state = ReviewState::Init;
        match self.run(request, token, &mut state) {
            Ok(report) => Ok(report),
            Err(err) => {
                #[cfg(feature = "tracing")]
                warn!(error = %err, "review failed");
                state.advance(ReviewState::Failed)?;
                Err(err)
            }
        }
    }

    fn run(
        &self,
        request: &ReviewRequest,
        token: &CancellationToken,
        state: &mut ReviewState,
    ) -> Result<ReviewReport, ReviewError> {
        let dialect = request.dialect;
        let options = &request.options;
        let stop = Stop {
            token,
            deadline: options
                .timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        };

        let (resolved, unsupported) = self.resolve_rules(request)?;

        state.advance(ReviewState::Parsing)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_workers.max(1))
            .build()
            .map_err(|err| ReviewError::WorkerPool(err.to_string()))?;

        let sources = split_statements(&request.sql, dialect);
        let parsed: Vec<Option<Result<ParseTree, ParseError>>> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| {
                    if stop.is_raised() {
                        None
                    } else {
                        Some(self.front_end.parse(dialect, source.text))
                    }
                })
                .collect()
        });

        state.advance(ReviewState::PerStatementChecking)?;
        let normalizer = DialectNormalizer::new(dialect);
        let outcomes: Vec<Result<StatementOutcome, ReviewError>> = pool.install(|| {
            sources
                .par_iter()
                .zip(parsed.par_iter())
                .map(|(source, parsed)| match parsed {
                    Some(_) if stop.is_raised() => Ok(StatementOutcome::Skipped),
                    None => Ok(StatementOutcome::Skipped),
                    Some(Err(err)) => Ok(StatementOutcome::Checked(vec![syntax_error_advice(
                        source, err,
                    )])),
                    Some(Ok(tree)) => self
                        .check_statement(request, source, tree, &resolved, &normalizer)
                        .map(StatementOutcome::Checked),
                })
                .collect()
        });

        state.advance(ReviewState::Aggregating)?;
        let mut statements = Vec::with_capacity(sources.len());
        let mut skipped_statements = Vec::new();
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome? {
                StatementOutcome::Checked(advices) => statements.push(StatementReport {
                    index: source.index,
                    line: source.line,
                    text: source.text.to_string(),
                    advices,
                }),
                StatementOutcome::Skipped => skipped_statements.push(source.index),
            }
        }

        let complete = skipped_statements.is_empty();
        let advices = if complete {
            aggregate::merge(
                std::iter::once(unsupported)
                    .chain(statements.iter().map(|statement| statement.advices.clone())),
            )
        } else {
            #[cfg(feature = "tracing")]
            warn!(
                skipped = skipped_statements.len(),
                "review cancelled before every statement was checked"
            );
            let mut findings: Vec<Advice> = unsupported
                .into_iter()
                .chain(statements.iter().flat_map(|s| s.advices.iter().cloned()))
                .filter(|advice| !advice.is_ok())
                .collect();
            findings.push(Advice::new(
                Status::Warning,
                advice_codes::REVIEW_INCOMPLETE,
                "Review incomplete",
                format!(
                    "Review stopped before checking {} of {} statements",
                    skipped_statements.len(),
                    sources.len()
                ),
            ));
            findings
        };

        let summary = Summary::from_advices(sources.len(), &advices);
        state.advance(ReviewState::Done)?;

        Ok(ReviewReport {
            dialect,
            statements,
            advices,
            complete,
            skipped_statements,
            summary,
        })
    }

    /// Selects the advisors for the active rules and applies the unsupported-rule
    /// policy. Returns the resolved rules and any `Unsupported` advice to report.
    fn resolve_rules<'r>(
        &'r self,
        request: &'r ReviewRequest,
    ) -> Result<(Vec<ResolvedRule<'r>>, Vec<Advice>), ReviewError> {
        let dialect = request.dialect;
        let policy = request.options.unsupported_rules;
        let active: Vec<&RuleDefinition> = request
            .rules
            .iter()
            .filter(|rule| rule.is_active_for(dialect))
            .collect();

        if policy == UnsupportedRulePolicy::Fail
            && !active.is_empty()
            && !self.registry.supports_dialect(dialect)
        {
            return Err(ReviewError::UnsupportedDialect(dialect));
        }

        let mut resolved = Vec::with_capacity(active.len());
        let mut unsupported = Vec::new();
        for rule in active {
            match self.registry.lookup(dialect, &rule.rule_type) {
                Some(advisor) => {
                    RuleConfig::decode(advisor.payload_shape(), rule.payload.as_ref()).map_err(
                        |source| ReviewError::Config {
                            rule_type: rule.rule_type.clone(),
                            source,
                        },
                    )?;
                    resolved.push(ResolvedRule { rule, advisor });
                }
                None => match policy {
                    UnsupportedRulePolicy::Skip => {
                        #[cfg(feature = "tracing")]
                        info!(rule = %rule.rule_type, %dialect, "skipping unsupported rule");
                    }
                    UnsupportedRulePolicy::Report => unsupported.push(Advice::new(
                        Status::Warning,
                        advice_codes::UNSUPPORTED,
                        rule.rule_type.to_string(),
                        format!("rule {} is not supported for dialect {dialect}", rule.rule_type),
                    )),
                    UnsupportedRulePolicy::Fail => {
                        return Err(ReviewError::UnsupportedRule {
                            dialect,
                            rule_type: rule.rule_type.clone(),
                        })
                    }
                },
            }
        }
        Ok((resolved, unsupported))
    }

    fn check_statement(
        &self,
        request: &ReviewRequest,
        source: &StatementSource<'_>,
        tree: &ParseTree,
        resolved: &[ResolvedRule<'_>],
        normalizer: &DialectNormalizer,
    ) -> Result<Vec<Advice>, ReviewError> {
        #[cfg(feature = "tracing")]
        debug!(index = source.index, line = source.line, "checking statement");

        let mut per_rule = Vec::with_capacity(resolved.len());
        for ResolvedRule { rule, advisor } in resolved {
            let ctx = Context {
                tree,
                rule,
                dialect: request.dialect,
                statement_index: source.index,
                statement_line: source.line,
                current_database: request.options.current_database.as_deref(),
                normalizer,
            };
            let advices = advisor
                .check(&ctx, source.text)
                .map_err(|source_err| ReviewError::Rule {
                    rule_type: rule.rule_type.clone(),
                    statement_index: source.index,
                    source: source_err,
                })?;
            per_rule.push(advices);
        }
        Ok(aggregate::merge(per_rule))
    }
}

fn syntax_error_advice(source: &StatementSource<'_>, err: &ParseError) -> Advice {
    let line = err
        .line()
        .filter(|line| *line > 0)
        .map_or(source.line, |line| source.line + line - 1);
    Advice::new(
        Status::Error,
        advice_codes::STATEMENT_SYNTAX_ERROR,
        err.kind.title(),
        err.message.clone(),
    )
    .with_line(line)
}

/// Reviews a request with every shipped advisor.
pub fn review(request: &ReviewRequest) -> Result<ReviewReport, ReviewError> {
    Reviewer::builtin()?.review(request)
}
