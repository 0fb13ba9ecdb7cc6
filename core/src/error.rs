//! Typed errors for boolean query parsing.

use thiserror::Error;

/// A malformed boolean query. Always recoverable: the caller reports it and
/// asks for the next query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// An operator without the operand it needs, e.g. `and cat` or `not`.
    #[error("operator '{operator}' is missing its {side} operand")]
    MissingOperand { operator: &'static str, side: &'static str },

    /// No tokens where an expression must start; see `parse_tokens`.
    #[error("unexpected end of query")]
    UnexpectedEnd,

    #[error("unclosed '(' at token {position}")]
    UnclosedParen { position: usize },

    #[error("unexpected ')' at token {position}")]
    UnexpectedCloseParen { position: usize },

    #[error("empty parentheses at token {position}")]
    EmptyGroup { position: usize },

    /// Tokens left over after a complete expression was parsed.
    #[error("unexpected input after expression: '{residual}'")]
    TrailingInput { residual: String },

    #[error("query nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}
