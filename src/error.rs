//! Error types for the query engine.
//!
//! Each stage of the pipeline — lexing, parsing, resolving table/CTE
//! references, and evaluating expressions — reports through its own
//! discriminant so callers (and tests) can tell a syntax mistake from a
//! runtime type error. [`EngineError`] unifies them for the public API.

use thiserror::Error;

/// Errors produced while turning source text into tokens.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("stray '-' not followed by a digit")]
    StrayMinus,
}

/// Errors produced while building the query tree from a token stream.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    #[error("HAVING clause requires a GROUP BY clause")]
    HavingWithoutGroupBy,
    #[error("RECURSIVE is not supported")]
    RecursiveNotSupported,
    #[error("LIMIT must be non-negative")]
    NegativeLimit,
    #[error("OFFSET must be non-negative")]
    NegativeOffset,
    #[error("subquery must project exactly one column")]
    SubqueryNotSingleColumn,
    #[error("unexpected trailing tokens after query")]
    TrailingTokens,
    #[error("duplicate CTE name in same WITH clause: {0}")]
    DuplicateCte(String),
    #[error("expression nested too deeply (limit is {limit})")]
    ExpressionTooDeep { limit: usize },
    #[error("query exceeds the token count limit of {limit}")]
    TokenLimitExceeded { limit: usize },
}

/// Errors produced while resolving a query's `FROM` source.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ResolveError {
    #[error("duplicate CTE name in same WITH clause: {0}")]
    DuplicateCte(String),
    #[error("forward CTE reference: {0}")]
    ForwardCteReference(String),
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

/// Errors produced while evaluating a resolved query tree against rows.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("column name collision in JOIN: '{0}' exists in both tables")]
    ColumnCollision(String),
    #[error("unsupported join type: {0}")]
    UnsupportedJoin(String),
    #[error("scalar subquery returned more than one row")]
    ScalarSubqueryMultipleRows,
    #[error("scalar subquery returned more than one column")]
    ScalarSubqueryMultipleColumns,
    #[error("IN subquery must return exactly one column")]
    InSubqueryNotSingleColumn,
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("function {name} expects between {min} and {max} arguments, got {got}")]
    ArityMismatch {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("type mismatch in comparison: {0}")]
    TypeMismatch(String),
    #[error("column not found: {0}")]
    UnknownColumn(String),
}

/// Top-level error returned by the public API, unifying every layer plus
/// whatever the reader capability reports.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("reader error: {0}")]
    Reader(#[from] anyhow::Error),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type EvalResult<T> = Result<T, EngineError>;
