//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid requests to the matching core.
/// Malformed trees are not reported here: topology is a precondition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown similarity kind: {0} (expected \"cosine\" or \"euclidean\")")]
    UnknownSimilarity(String),

    #[error("unknown cost policy: {0} (expected \"negate\" or \"max_shift\")")]
    UnknownCostPolicy(String),

    #[error("unknown feature encoding: {0}")]
    UnknownEncoding(String),

    #[error("unknown node type code: {0}")]
    UnknownNodeType(u8),

    #[error("ragged matrix: row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("feature dimension mismatch: {left} vs {right}")]
    FeatureDimensionMismatch { left: usize, right: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
