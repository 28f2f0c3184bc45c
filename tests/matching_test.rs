//! End-to-end tests for tree matching.

mod common;

use std::collections::HashSet;

use rstest::rstest;

use common::{jittered, star, two_branch_tree};
use treematch::domain::{
    match_trees, match_trees_by_name, match_trees_with, AngleEncoding, CostPolicy, DomainError,
    FeatureConfig, MatchOptions, SimilarityKind, Tree, TypeEncoding,
};
use treematch::util::testing;

fn identity(n: usize) -> Vec<Option<usize>> {
    (0..n).map(Some).collect()
}

#[test]
fn given_star_and_small_jitter_when_matching_euclidean_then_identity() {
    testing::init_test_setup();
    // Arrange: children at 30 and 150 degrees, jitter below 10% of edge length
    let a = star(&[30.0, 150.0], 1.0);
    let b = jittered(&a, 0.05, 1);

    // Act
    let result = match_trees(&a, &b, SimilarityKind::Euclidean).unwrap();

    // Assert
    assert_eq!(result, identity(3));
}

#[rstest]
#[case(SimilarityKind::Cosine, CostPolicy::Negate)]
#[case(SimilarityKind::Cosine, CostPolicy::MaxShift)]
#[case(SimilarityKind::Euclidean, CostPolicy::Negate)]
#[case(SimilarityKind::Euclidean, CostPolicy::MaxShift)]
fn given_jittered_snapshot_when_matching_then_every_node_finds_itself(
    #[case] similarity: SimilarityKind,
    #[case] cost_policy: CostPolicy,
    #[values(1, 2, 3, 4, 5)] seed: u64,
) {
    let a = two_branch_tree();
    let b = jittered(&a, 0.2, seed);
    let options = MatchOptions {
        similarity,
        cost_policy,
        ..MatchOptions::default()
    };

    let outcome = match_trees_with(&a, &b, &options).unwrap();

    assert_eq!(outcome.assignment.rows, identity(6));
}

#[test]
fn given_richer_encodings_when_matching_then_identity_still_found() {
    let a = two_branch_tree();
    let b = jittered(&a, 0.2, 3);
    let options = MatchOptions {
        features: FeatureConfig {
            angle: AngleEncoding::SinCos,
            node_type: TypeEncoding::OneHot,
        },
        ..MatchOptions::new(SimilarityKind::Cosine)
    };

    let outcome = match_trees_with(&a, &b, &options).unwrap();

    assert_eq!(outcome.assignment.rows, identity(6));
    assert_eq!(outcome.similarity.rows(), 6);
    assert_eq!(outcome.cost.cols(), 6);
}

#[test]
fn given_larger_first_tree_when_matching_then_surplus_nodes_unmatched() {
    // Arrange: 6 nodes against 3 nodes
    let a = two_branch_tree();
    let b = star(&[56.3, 123.7], 3.6);

    // Act
    let result = match_trees(&a, &b, SimilarityKind::Euclidean).unwrap();

    // Assert
    assert_eq!(result.len(), 6);
    let matched: Vec<usize> = result.iter().flatten().copied().collect();
    assert_eq!(matched.len(), 3);
    assert_eq!(matched.iter().copied().collect::<HashSet<_>>().len(), 3);
    assert_eq!(result, vec![Some(0), Some(1), Some(2), None, None, None]);
}

#[test]
fn given_smaller_first_tree_when_matching_then_every_node_matched() {
    let a = star(&[56.3, 123.7], 3.6);
    let b = two_branch_tree();

    let result = match_trees(&a, &b, SimilarityKind::Euclidean).unwrap();

    assert_eq!(result, identity(3));
}

#[rstest]
#[case(SimilarityKind::Cosine)]
#[case(SimilarityKind::Euclidean)]
fn given_inputs_when_matching_then_trees_are_not_modified(#[case] kind: SimilarityKind) {
    let a = two_branch_tree();
    let b = jittered(&a, 0.2, 9);
    let (a_before, b_before) = (a.clone(), b.clone());

    match_trees(&a, &b, kind).unwrap();

    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}

#[test]
fn given_unknown_similarity_name_when_matching_then_error() {
    let a = two_branch_tree();

    let err = match_trees_by_name(&a, &a, "manhattan").unwrap_err();

    assert_eq!(err, DomainError::UnknownSimilarity("manhattan".into()));
}

#[test]
fn given_known_similarity_name_when_matching_then_same_as_typed_call() {
    let a = two_branch_tree();
    let b = jittered(&a, 0.2, 2);

    assert_eq!(
        match_trees_by_name(&a, &b, "cosine").unwrap(),
        match_trees(&a, &b, SimilarityKind::Cosine).unwrap()
    );
}

#[test]
fn given_empty_tree_when_matching_then_empty_or_unmatched() {
    let a = two_branch_tree();
    let empty = Tree::new();

    assert!(match_trees(&empty, &a, SimilarityKind::Cosine).unwrap().is_empty());
    assert_eq!(
        match_trees(&a, &empty, SimilarityKind::Cosine).unwrap(),
        vec![None; 6]
    );
}
