//! Node correspondence between two snapshots of a tree.
//!
//! Pipeline: embed both trees, build feature vectors, compare every pair of
//! nodes, turn similarities into costs and solve the assignment.

use tracing::{debug, instrument};

use crate::domain::assignment::{self, Assignment};
use crate::domain::embedding::embed;
use crate::domain::error::DomainResult;
use crate::domain::features::{feature_vectors, FeatureConfig};
use crate::domain::matrix::Matrix;
use crate::domain::similarity::{cost_matrix, similarity_matrix, CostPolicy, SimilarityKind};
use crate::domain::tree::Tree;

/// Knobs of a single match call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub similarity: SimilarityKind,
    pub cost_policy: CostPolicy,
    pub features: FeatureConfig,
}

impl MatchOptions {
    pub fn new(similarity: SimilarityKind) -> Self {
        Self {
            similarity,
            ..Self::default()
        }
    }
}

/// Full result of a match, matrices kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub assignment: Assignment<f64>,
    pub similarity: Matrix<f64>,
    pub cost: Matrix<f64>,
}

/// Index in `b` for every node of `a`, None where `a` has surplus nodes.
pub fn match_trees(a: &Tree, b: &Tree, similarity: SimilarityKind) -> DomainResult<Vec<Option<usize>>> {
    let outcome = match_trees_with(a, b, &MatchOptions::new(similarity))?;
    Ok(outcome.assignment.rows)
}

/// Like [`match_trees`] with the metric given by name.
///
/// An unknown name fails before any work is done.
pub fn match_trees_by_name(a: &Tree, b: &Tree, similarity: &str) -> DomainResult<Vec<Option<usize>>> {
    let kind = similarity.parse::<SimilarityKind>()?;
    match_trees(a, b, kind)
}

/// Run the whole pipeline. The inputs are not modified.
#[instrument(level = "debug", skip(a, b), fields(a = a.len(), b = b.len()))]
pub fn match_trees_with(a: &Tree, b: &Tree, options: &MatchOptions) -> DomainResult<MatchOutcome> {
    let mut a = a.clone();
    let mut b = b.clone();
    embed(&mut a);
    embed(&mut b);

    let features_a = feature_vectors(&a, &options.features);
    let features_b = feature_vectors(&b, &options.features);

    let similarity = similarity_matrix(&features_a, &features_b, options.similarity)?;
    debug!("similarity matrix ({}):\n{}", options.similarity, similarity);

    let cost = cost_matrix(&similarity, options.cost_policy);
    debug!("cost matrix ({}):\n{}", options.cost_policy, cost);

    let assignment = assignment::solve(&cost);
    for (row, col) in assignment.rows.iter().enumerate() {
        debug!("match {} -> {}", row, col.map_or(-1, |c| c as i64));
    }
    Ok(MatchOutcome {
        assignment,
        similarity,
        cost,
    })
}
