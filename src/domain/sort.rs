//! Canonical child ordering.
//!
//! Rebuilds a tree breadth-first with the children of every node ordered by
//! the direction from parent to child, so independently captured snapshots
//! get comparable indices.

use std::collections::VecDeque;

use tracing::{instrument, trace};

use crate::domain::tree::{Point, Tree};

/// A reordered tree plus the mapping back to the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedTree {
    pub tree: Tree,
    /// `permutation[sorted] = original`
    pub permutation: Vec<usize>,
}

impl SortedTree {
    pub fn original_index(&self, sorted: usize) -> Option<usize> {
        self.permutation.get(sorted).copied()
    }

    /// Inverse permutation: `original -> sorted`, None for dropped nodes.
    pub fn sorted_indices(&self, original_len: usize) -> Vec<Option<usize>> {
        let mut inverse = vec![None; original_len];
        for (sorted, &original) in self.permutation.iter().enumerate() {
            if let Some(slot) = inverse.get_mut(original) {
                *slot = Some(sorted);
            }
        }
        inverse
    }
}

/// Direction from `from` to `to` in degrees, folded into `[-90, 270]`.
///
/// The fold puts "straight down" at the start of the order, so a fan of
/// children pointing up reads left to right.
pub fn edge_angle(from: Point, to: Point) -> f64 {
    let mut angle = (to.y - from.y).atan2(to.x - from.x).to_degrees();
    if angle < -90.0 {
        angle += 360.0;
    }
    if angle > 270.0 {
        angle -= 360.0;
    }
    angle
}

/// Reorder children by ascending [`edge_angle`] and renumber breadth-first.
///
/// Ties keep their stored order. Nodes unreachable from the root are dropped.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn sort_tree(tree: &Tree) -> SortedTree {
    let mut sorted = Tree {
        timestamp: tree.timestamp,
        nodes: Vec::with_capacity(tree.len()),
    };
    let mut permutation = Vec::with_capacity(tree.len());
    let Some(root) = tree.root() else {
        return SortedTree {
            tree: sorted,
            permutation,
        };
    };

    let mut new_root = tree.nodes[root].clone();
    new_root.parent = None;
    new_root.children.clear();
    sorted.nodes.push(new_root);
    permutation.push(root);

    // (original index, sorted index)
    let mut queue = VecDeque::from([(root, 0usize)]);
    while let Some((original, new_idx)) = queue.pop_front() {
        let node = &tree.nodes[original];
        let mut children: Vec<(usize, f64)> = node
            .children
            .iter()
            .map(|&c| (c, edge_angle(node.position, tree.nodes[c].position)))
            .collect();
        children.sort_by(|a, b| a.1.total_cmp(&b.1));
        trace!(node = original, ?children, "sorted children");

        for (child, _) in children {
            let mut new_child = tree.nodes[child].clone();
            new_child.parent = Some(new_idx);
            new_child.children.clear();
            let child_idx = sorted.nodes.len();
            sorted.nodes.push(new_child);
            sorted.nodes[new_idx].children.push(child_idx);
            permutation.push(child);
            queue.push_back((child, child_idx));
        }
    }

    SortedTree {
        tree: sorted,
        permutation,
    }
}
