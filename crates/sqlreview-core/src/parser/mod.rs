//! Parse front-end: statement splitting and dialect-tagged parse trees.
//!
//! The grammars themselves come from `sqlparser`. This module only decides how a
//! script is cut into statements and how parse failures are reported, so that a
//! malformed statement never prevents its neighbours from being reviewed.

use std::ops::Range;

use crate::error::ParseError;
use crate::types::Dialect;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect as SqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};

/// Parsed statement(s) tagged with the dialect whose grammar produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree {
    pub dialect: Dialect,
    pub statements: Vec<Statement>,
}

/// Turns statement text into a parse tree for a given dialect.
pub trait ParseFrontEnd: Send + Sync {
    fn parse(&self, dialect: Dialect, sql: &str) -> Result<ParseTree, ParseError>;
}

/// Front-end backed by `sqlparser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlParserFrontEnd;

impl ParseFrontEnd for SqlParserFrontEnd {
    fn parse(&self, dialect: Dialect, sql: &str) -> Result<ParseTree, ParseError> {
        let statements = parse_sql_with_dialect(sql, dialect)?;
        Ok(ParseTree {
            dialect,
            statements,
        })
    }
}

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    match Parser::parse_sql(sqlparser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(primary_err) => {
            // Generic frequently fails on Postgres-only operators (`::`, `->>`).
            if matches!(dialect, Dialect::Generic) && looks_like_postgres_syntax(sql) {
                let postgres = PostgreSqlDialect {};
                if let Ok(statements) = Parser::parse_sql(&postgres, sql) {
                    return Ok(statements);
                }
            }
            Err(ParseError::from(primary_err).with_dialect(dialect))
        }
    }
}

fn looks_like_postgres_syntax(sql: &str) -> bool {
    sql.contains("::") || sql.contains("->")
}

/// One statement of a script, located in the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementSource<'a> {
    /// Zero-based index in the script
    pub index: usize,
    /// Statement text without the trailing `;`
    pub text: &'a str,
    /// Byte range of `text` within the script
    pub range: Range<usize>,
    /// 1-based line of the first significant token
    pub line: usize,
}

/// Splits a script into statements on top-level `;` delimiters.
///
/// A `;` inside a procedural block does not end the statement. Blocks are
/// `BEGIN ... END` in a routine or trigger body (`CREATE PROCEDURE p AS BEGIN
/// ... END`), a T-SQL batch `BEGIN ... END` or `IF ... BEGIN ... END`, and any
/// `CASE ... END` nested in those. `BEGIN` that starts a transaction (`BEGIN;`,
/// `BEGIN TRANSACTION`, `BEGIN WORK`) opens no block.
///
/// Chunks holding only whitespace or comments are dropped. When the script
/// cannot be tokenized, the text up to the last clean `;` before the failure is
/// split as usual and the remainder becomes a single chunk, so the failure is
/// reported by the parser against that chunk alone.
pub fn split_statements(sql: &str, dialect: Dialect) -> Vec<StatementSource<'_>> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    let index = LineIndex::new(sql);
    let err = match Tokenizer::new(sqlparser_dialect.as_ref(), sql).tokenize_with_location() {
        Ok(tokens) => return split_tokens(sql, &index, &tokens),
        Err(err) => err,
    };

    let limit = index.offset(err.location).unwrap_or(sql.len());
    let (mut statements, rest) = match clean_prefix(sqlparser_dialect.as_ref(), sql, limit) {
        Some((cut, tokens)) => (split_tokens(sql, &index, &tokens), cut),
        None => (Vec::new(), 0),
    };
    statements.extend(tail_chunk(sql, rest, statements.len()));
    statements
}

/// Finds the longest prefix of `sql[..limit]` that tokenizes and ends with `;`.
fn clean_prefix(
    dialect: &dyn SqlDialect,
    sql: &str,
    limit: usize,
) -> Option<(usize, Vec<TokenWithSpan>)> {
    sql[..limit].rmatch_indices(';').find_map(|(at, _)| {
        let cut = at + 1;
        let tokens = Tokenizer::new(dialect, &sql[..cut])
            .tokenize_with_location()
            .ok()?;
        let last = tokens
            .iter()
            .rev()
            .find(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))?;
        (last.token == Token::SemiColon).then_some((cut, tokens))
    })
}

fn split_tokens<'a>(
    sql: &'a str,
    index: &LineIndex<'_>,
    tokens: &[TokenWithSpan],
) -> Vec<StatementSource<'a>> {
    let significant: Vec<&TokenWithSpan> = tokens
        .iter()
        .filter(|t| !matches!(t.token, Token::Whitespace(_) | Token::EOF))
        .collect();

    let mut statements = Vec::new();
    let mut start: Option<Location> = None;
    let mut end: Option<Location> = None;
    let mut blocks = Blocks::default();

    for (i, token) in significant.iter().enumerate() {
        if token.token == Token::SemiColon && blocks.depth == 0 {
            push_chunk(&mut statements, sql, index, start.take(), end.take());
            blocks = Blocks::default();
            continue;
        }
        let next = significant.get(i + 1).map(|t| &t.token);
        blocks.advance(&token.token, start.is_none(), next);
        if start.is_none() {
            start = Some(token.span.start);
        }
        end = Some(token.span.end);
    }
    push_chunk(&mut statements, sql, index, start, end);

    statements
}

fn push_chunk<'a>(
    statements: &mut Vec<StatementSource<'a>>,
    sql: &'a str,
    index: &LineIndex<'_>,
    start: Option<Location>,
    end: Option<Location>,
) {
    let (Some(start), Some(end)) = (start, end) else {
        return;
    };
    let (Some(from), Some(to)) = (index.offset(start), index.offset(end)) else {
        return;
    };
    if from >= to {
        return;
    }
    statements.push(StatementSource {
        index: statements.len(),
        text: &sql[from..to],
        range: from..to,
        line: start.line as usize,
    });
}

/// `sql[from..]` as one trimmed chunk, or `None` when only whitespace is left.
fn tail_chunk(sql: &str, from: usize, index: usize) -> Option<StatementSource<'_>> {
    let rest = &sql[from..];
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = from + (rest.len() - rest.trim_start().len());
    let end = start + trimmed.len();
    Some(StatementSource {
        index,
        text: trimmed,
        range: start..end,
        line: 1 + sql[..start].matches('\n').count(),
    })
}

/// Procedural block nesting within the statement being split.
#[derive(Debug, Default)]
struct Blocks {
    depth: usize,
    /// First word of the statement, uppercased
    leading: String,
    /// The statement defines a routine or trigger
    routine: bool,
}

impl Blocks {
    fn advance(&mut self, token: &Token, leading: bool, next: Option<&Token>) {
        let Some(word) = bare_word(token) else {
            return;
        };
        if leading {
            self.leading = word.clone();
        }
        match word.as_str() {
            "PROCEDURE" | "PROC" | "FUNCTION" | "TRIGGER" | "EVENT"
                if matches!(self.leading.as_str(), "CREATE" | "ALTER") =>
            {
                self.routine = true
            }
            "BEGIN" if self.opens_block(leading) && !starts_transaction(next) => self.depth += 1,
            "CASE" if self.depth > 0 => self.depth += 1,
            "END" if self.depth > 0 && !closes_uncounted(next) => self.depth -= 1,
            _ => {}
        }
    }

    fn opens_block(&self, leading: bool) -> bool {
        self.depth > 0 || self.routine || leading || matches!(self.leading.as_str(), "IF" | "WHILE")
    }
}

/// Unquoted word, uppercased.
fn bare_word(token: &Token) -> Option<String> {
    match token {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_ascii_uppercase()),
        _ => None,
    }
}

fn starts_transaction(next: Option<&Token>) -> bool {
    match next {
        None | Some(Token::SemiColon) => true,
        Some(token) => bare_word(token).is_some_and(|word| {
            matches!(
                word.as_str(),
                "TRANSACTION"
                    | "TRAN"
                    | "WORK"
                    | "ISOLATION"
                    | "READ"
                    | "DEFERRED"
                    | "IMMEDIATE"
                    | "EXCLUSIVE"
                    | "DISTRIBUTED"
            )
        }),
    }
}

/// `END IF`, `END LOOP` and friends close blocks whose opener is not counted.
fn closes_uncounted(next: Option<&Token>) -> bool {
    next.and_then(bare_word)
        .is_some_and(|word| matches!(word.as_str(), "IF" | "LOOP" | "WHILE" | "REPEAT" | "FOR"))
}

/// Converts tokenizer locations (1-based line, 1-based character column)
/// into byte offsets.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    fn offset(&self, location: Location) -> Option<usize> {
        let line = usize::try_from(location.line).ok()?;
        let column = usize::try_from(location.column).ok()?;
        if line == 0 || column == 0 {
            return None;
        }

        let line_start = *self.line_starts.get(line - 1)?;
        let line_end = self
            .line_starts
            .get(line)
            .map_or(self.source.len(), |next| next - 1);
        let line_slice = &self.source[line_start..line_end];

        // Columns count characters, so walk char boundaries.
        match line_slice.char_indices().nth(column - 1) {
            Some((rel_offset, _)) => Some(line_start + rel_offset),
            None if column - 1 == line_slice.chars().count() => Some(line_end),
            None => None,
        }
    }
}
