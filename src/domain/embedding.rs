//! Topology-preserving embedding (TPE).
//!
//! Radial layout where depth sets the radius and every child receives an
//! equal slice of its parent's angular sector, so sector nesting mirrors
//! ancestry. Levels are breadth-first index depth.

use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::domain::tree::{Embedding, Point, Tree};

/// Full circle in degrees; the root sector is `[0, FULL_TURN)`.
pub const FULL_TURN: f64 = 360.0;

/// Write an [`Embedding`] into every node reachable from the root.
///
/// Leaves end with a degenerate sector `angle_min == angle_max == angle`.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn embed(tree: &mut Tree) {
    let Some(root) = tree.root() else {
        return;
    };

    tree.nodes[root].embedding = sector_embedding(0.0, FULL_TURN, 0.0);

    let mut queue = VecDeque::from([root]);
    while let Some(idx) = queue.pop_front() {
        let parent = tree.nodes[idx].embedding;
        let children = tree.nodes[idx].children.clone();
        if children.is_empty() {
            let leaf = &mut tree.nodes[idx].embedding;
            leaf.angle_min = leaf.angle;
            leaf.angle_max = leaf.angle;
            continue;
        }

        let range = parent.angle_max - parent.angle_min;
        let k = children.len() as f64;
        for (i, &child) in children.iter().enumerate() {
            let i = i as f64;
            let min = parent.angle_min + range * i / k;
            let max = parent.angle_min + range * (i + 1.0) / k;
            tree.nodes[child].embedding = sector_embedding(min, max, parent.radius + 1.0);
            queue.push_back(child);
        }
    }

    for (idx, node) in tree.nodes.iter().enumerate() {
        let e = &node.embedding;
        debug!(
            node = idx,
            x = e.position.x,
            y = e.position.y,
            radius = e.radius,
            angle = e.angle,
            sector = ?(e.angle_min, e.angle_max),
            "tpe"
        );
    }
}

/// Embedding at the midpoint of `[min, max)` on the circle of `radius`.
fn sector_embedding(min: f64, max: f64, radius: f64) -> Embedding {
    let angle = (min + max) / 2.0;
    Embedding {
        position: Point::from_polar_degrees(radius, angle),
        radius,
        angle,
        angle_min: min,
        angle_max: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::{NodeType, TreeNode};

    #[test]
    fn test_root_only_tree() {
        let mut tree = Tree::new();
        tree.push_node(TreeNode::at(Point::new(3.0, 4.0), NodeType::Root), None);
        embed(&mut tree);
        let e = tree.nodes[0].embedding;
        assert_eq!(e.radius, 0.0);
        assert_eq!(e.angle, 180.0);
        assert_eq!((e.angle_min, e.angle_max), (180.0, 180.0));
        assert!(e.position.norm() < 1e-12);
    }

    #[test]
    fn test_children_split_sector_in_order() {
        let mut tree = Tree::new();
        let root = tree.push_node(TreeNode::default(), None);
        for _ in 0..4 {
            tree.push_node(TreeNode::default(), Some(root));
        }
        embed(&mut tree);
        let angles: Vec<f64> = tree.nodes[1..].iter().map(|n| n.embedding.angle).collect();
        assert_eq!(angles, vec![45.0, 135.0, 225.0, 315.0]);
        let e = tree.nodes[2].embedding;
        assert!((e.position.x - (-1.0 / 2f64.sqrt())).abs() < 1e-12);
        assert!((e.position.y - (1.0 / 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_empty_tree_is_untouched() {
        let mut tree = Tree::new();
        embed(&mut tree);
        assert!(tree.is_empty());
    }
}
