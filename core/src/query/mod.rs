//! Boolean retrieval over the inverted index.
//!
//! Queries combine terms with `and`, `or`, `not` and parentheses. Precedence
//! from tightest to loosest is NOT, AND, OR; chains of the same operator are
//! left-associative.

pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::evaluate;
pub use parser::{parse, parse_tokens, Expr};

use crate::error::QueryError;
use crate::{InvertedIndex, PostingSet};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Upper bound on nested `(` groups plus `not` operators in one query.
    pub max_nesting_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BooleanEngine {
    config: QueryConfig,
}

impl BooleanEngine {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig { &self.config }

    pub fn evaluate(&self, query: &str, index: &InvertedIndex) -> Result<PostingSet, QueryError> {
        match parse(query, &self.config)? {
            Some(expr) => {
                tracing::debug!(%expr, "parsed boolean query");
                Ok(evaluate(&expr, index))
            }
            None => Ok(PostingSet::new()),
        }
    }
}

/// Evaluate `query` with the default [`QueryConfig`].
pub fn evaluate_boolean(query: &str, index: &InvertedIndex) -> Result<PostingSet, QueryError> {
    BooleanEngine::default().evaluate(query, index)
}
