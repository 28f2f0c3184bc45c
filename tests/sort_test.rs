//! Integration tests for canonical child ordering.

mod common;

use rstest::rstest;

use common::{star, tree_from, two_branch_tree};
use treematch::domain::sort::edge_angle;
use treematch::domain::{sort_tree, NodeType, Point};

#[test]
fn given_children_in_arbitrary_order_when_sorting_then_ordered_by_edge_angle() {
    // Arrange: children stored left before right
    let tree = two_branch_tree();

    // Act
    let sorted = sort_tree(&tree);

    // Assert: right branch (56 deg) now precedes left branch (124 deg)
    assert_eq!(sorted.permutation, vec![0, 2, 1, 5, 4, 3]);
    assert_eq!(sorted.tree.nodes[0].children, vec![1, 2]);
    assert_eq!(sorted.tree.nodes[1].position, Point::new(2.0, 3.0));
    assert_eq!(sorted.tree.nodes[1].children, vec![3]);
    assert_eq!(sorted.tree.nodes[2].children, vec![4, 5]);
    assert_eq!(sorted.tree.nodes[5].parent, Some(2));
}

#[test]
fn given_sorted_tree_when_sorting_again_then_identity_permutation() {
    let once = sort_tree(&two_branch_tree()).tree;

    let twice = sort_tree(&once);

    assert_eq!(twice.permutation, (0..once.len()).collect::<Vec<_>>());
    assert_eq!(twice.tree, once);
}

#[test]
fn given_sorted_tree_when_inverting_permutation_then_maps_back() {
    let sorted = sort_tree(&two_branch_tree());

    let inverse = sorted.sorted_indices(6);

    for (original, s) in inverse.iter().enumerate() {
        let s = s.expect("every node kept");
        assert_eq!(sorted.original_index(s), Some(original));
    }
}

#[test]
fn given_timestamped_tree_when_sorting_then_timestamp_is_kept() {
    let mut tree = star(&[10.0, 20.0], 1.0);
    tree.timestamp = Some(99);

    assert_eq!(sort_tree(&tree).tree.timestamp, Some(99));
}

#[test]
fn given_child_straight_below_when_sorting_then_it_comes_first() {
    let tree = tree_from(&[
        (None, (0.0, 0.0), NodeType::Root),
        (Some(0), (-1.0, 0.0), NodeType::Primary),
        (Some(0), (0.0, -1.0), NodeType::Primary),
        (Some(0), (1.0, 0.0), NodeType::Primary),
    ]);

    let sorted = sort_tree(&tree);

    assert_eq!(sorted.permutation, vec![0, 2, 3, 1]);
}

#[rstest]
#[case((1.0, 0.0), 0.0)]
#[case((0.0, 1.0), 90.0)]
#[case((-1.0, 0.0), 180.0)]
#[case((0.0, -1.0), -90.0)]
#[case((-1.0, -1.0), 225.0)]
#[case((1.0, -1.0), -45.0)]
fn given_direction_when_measuring_edge_angle_then_folded_into_range(
    #[case] to: (f64, f64),
    #[case] expected: f64,
) {
    let angle = edge_angle(Point::ORIGIN, Point::new(to.0, to.1));

    assert!((angle - expected).abs() < 1e-9, "{angle} != {expected}");
    assert!((-90.0..=270.0).contains(&angle));
}
