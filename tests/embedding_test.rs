//! Integration tests for the topology-preserving embedding.

mod common;

use rstest::rstest;

use common::{star, two_branch_tree};
use treematch::domain::embed;

#[test]
fn given_two_branch_tree_when_embedding_then_radius_equals_depth() {
    // Arrange
    let mut tree = two_branch_tree();

    // Act
    embed(&mut tree);

    // Assert
    let radii: Vec<f64> = tree.nodes.iter().map(|n| n.embedding.radius).collect();
    assert_eq!(radii, vec![0.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
}

#[test]
fn given_two_branch_tree_when_embedding_then_child_sectors_nest_in_parent() {
    let mut tree = two_branch_tree();

    embed(&mut tree);

    for (idx, node) in tree.nodes.iter().enumerate() {
        let Some(parent) = node.parent else {
            continue;
        };
        let p = tree.nodes[parent].embedding;
        let e = node.embedding;
        assert!(
            p.angle_min <= e.angle_min && e.angle_max <= p.angle_max,
            "node {idx} sector [{}, {}] escapes parent [{}, {}]",
            e.angle_min,
            e.angle_max,
            p.angle_min,
            p.angle_max
        );
        assert_eq!(e.radius, p.radius + 1.0);
    }
}

#[test]
fn given_two_branch_tree_when_embedding_then_sectors_split_in_child_order() {
    let mut tree = two_branch_tree();

    embed(&mut tree);

    let sector = |i: usize| {
        let e = tree.nodes[i].embedding;
        (e.angle_min, e.angle_max, e.angle)
    };
    assert_eq!(sector(0), (0.0, 360.0, 180.0));
    assert_eq!(sector(1), (0.0, 180.0, 90.0));
    assert_eq!(sector(2), (180.0, 360.0, 270.0));
    // leaves collapse to their angle
    assert_eq!(sector(3), (45.0, 45.0, 45.0));
    assert_eq!(sector(4), (135.0, 135.0, 135.0));
    assert_eq!(sector(5), (270.0, 270.0, 270.0));
}

#[test]
fn given_embedded_tree_when_embedding_again_then_result_is_unchanged() {
    let mut tree = two_branch_tree();
    embed(&mut tree);
    let first = tree.clone();

    embed(&mut tree);

    assert_eq!(tree, first);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn given_star_when_embedding_then_positions_lie_on_unit_circle(#[case] children: usize) {
    let angles: Vec<f64> = (0..children).map(|i| i as f64 * 10.0).collect();
    let mut tree = star(&angles, 5.0);

    embed(&mut tree);

    let step = 360.0 / children as f64;
    for (i, node) in tree.nodes.iter().enumerate().skip(1) {
        let e = node.embedding;
        assert!((e.position.norm() - 1.0).abs() < 1e-12);
        assert!((e.angle - step * (i as f64 - 0.5)).abs() < 1e-9);
    }
}

#[test]
fn given_original_positions_when_embedding_then_they_are_ignored() {
    // Same topology, very different geometry
    let mut a = star(&[0.0, 90.0], 1.0);
    let mut b = star(&[200.0, 10.0], 40.0);

    embed(&mut a);
    embed(&mut b);

    let embeddings = |t: &treematch::domain::Tree| -> Vec<_> {
        t.nodes.iter().map(|n| n.embedding).collect()
    };
    assert_eq!(embeddings(&a), embeddings(&b));
}
