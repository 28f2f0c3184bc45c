//! Pairwise similarity between feature vectors and conversion to costs.
//!
//! Both metrics follow "higher is more similar"; costs are derived so that
//! lower is better for the assignment solver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::matrix::Matrix;

/// Similarity metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityKind {
    /// `a·b / (|a||b|)`, 0 when either vector is zero
    #[default]
    Cosine,
    /// `-|a - b|`
    Euclidean,
}

impl SimilarityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
        }
    }

    pub fn similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::Euclidean => euclidean_similarity(a, b),
        }
    }
}

impl FromStr for SimilarityKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            other => Err(DomainError::UnknownSimilarity(other.to_string())),
        }
    }
}

impl fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How similarities become costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostPolicy {
    /// `cost = -similarity`
    #[default]
    Negate,
    /// `cost = max(similarity) - similarity`, minimum cost becomes 0
    MaxShift,
}

impl FromStr for CostPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negate" => Ok(Self::Negate),
            "max_shift" => Ok(Self::MaxShift),
            other => Err(DomainError::UnknownCostPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for CostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Negate => "negate",
            Self::MaxShift => "max_shift",
        })
    }
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0, 0.0, 0.0), |(dot, na, nb), (&x, &y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub fn euclidean_similarity(a: &[f64], b: &[f64]) -> f64 {
    let sum_sq: f64 = a.iter().zip(b).map(|(&x, &y)| (x - y) * (x - y)).sum();
    -sum_sq.sqrt()
}

/// `n x m` similarity of every row of `a` against every row of `b`.
#[instrument(level = "debug", skip(a, b), fields(rows = a.len(), cols = b.len()))]
pub fn similarity_matrix(
    a: &[Vec<f64>],
    b: &[Vec<f64>],
    kind: SimilarityKind,
) -> DomainResult<Matrix<f64>> {
    check_dimensions(a, b)?;
    Ok(Matrix::from_fn(a.len(), b.len(), |i, j| {
        kind.similarity(&a[i], &b[j])
    }))
}

/// Cost matrix for the solver.
pub fn cost_matrix(similarity: &Matrix<f64>, policy: CostPolicy) -> Matrix<f64> {
    match policy {
        CostPolicy::Negate => similarity.map(|s| -s),
        CostPolicy::MaxShift => {
            let max = similarity.values().fold(f64::NEG_INFINITY, f64::max);
            similarity.map(|s| max - s)
        }
    }
}

fn check_dimensions(a: &[Vec<f64>], b: &[Vec<f64>]) -> DomainResult<()> {
    let Some(width) = a.first().or(b.first()).map(Vec::len) else {
        return Ok(());
    };
    if let Some(other) = a.iter().chain(b).map(Vec::len).find(|&len| len != width) {
        return Err(DomainError::FeatureDimensionMismatch {
            left: width,
            right: other,
        });
    }
    Ok(())
}
