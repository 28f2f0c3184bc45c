//! Shared fixtures: hand-built trees and deterministic noise.
#![allow(dead_code)]

use treematch::domain::{Matrix, NodeType, Point, Tree, TreeNode};

/// Linear congruential generator; reproducible stand-in for a random source.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-amplitude, amplitude)`.
    pub fn symmetric(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * amplitude
    }

    pub fn below(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }
}

/// Build a tree from `(parent, (x, y), type)` rows in index order.
///
/// Parents must precede their children.
pub fn tree_from(rows: &[(Option<usize>, (f64, f64), NodeType)]) -> Tree {
    let mut tree = Tree::new();
    for &(parent, (x, y), node_type) in rows {
        tree.push_node(TreeNode::at(Point::new(x, y), node_type), parent);
    }
    tree
}

/// Root at the origin with one primary child per angle (degrees) at `radius`.
pub fn star(angles_deg: &[f64], radius: f64) -> Tree {
    let mut tree = Tree::new();
    let root = tree.push_node(TreeNode::at(Point::ORIGIN, NodeType::Root), None);
    for &angle in angles_deg {
        tree.push_node(
            TreeNode::at(Point::from_polar_degrees(radius, angle), NodeType::Primary),
            Some(root),
        );
    }
    tree
}

/// Root, two primaries, and a secondary branch under each primary.
///
/// ```text
///        0
///      /   \
///     1     2
///    / \     \
///   3   4     5
/// ```
pub fn two_branch_tree() -> Tree {
    tree_from(&[
        (None, (0.0, 0.0), NodeType::Root),
        (Some(0), (-2.0, 3.0), NodeType::Primary),
        (Some(0), (2.0, 3.0), NodeType::Primary),
        (Some(1), (-3.0, 6.0), NodeType::Secondary),
        (Some(1), (-1.0, 6.0), NodeType::Secondary),
        (Some(2), (2.5, 6.0), NodeType::Secondary),
    ])
}

/// Copy of `tree` with every position moved by up to `amplitude` per axis.
pub fn jittered(tree: &Tree, amplitude: f64, seed: u64) -> Tree {
    let mut rng = Lcg::new(seed);
    let mut out = tree.clone();
    for node in &mut out.nodes {
        node.position = Point::new(
            node.position.x + rng.symmetric(amplitude),
            node.position.y + rng.symmetric(amplitude),
        );
        node.refresh_polar();
    }
    out
}

/// `rows x cols` matrix with integer-valued entries in `[0, max)`.
pub fn random_costs(rng: &mut Lcg, rows: usize, cols: usize, max: usize) -> Matrix<f64> {
    Matrix::from_fn(rows, cols, |_, _| rng.below(max) as f64)
}

/// Minimum total over all injective row->column (or column->row) maps.
pub fn brute_force_min(costs: &Matrix<f64>) -> f64 {
    let (rows, cols) = (costs.rows(), costs.cols());
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    let transposed = rows > cols;
    let (small, large) = if transposed { (cols, rows) } else { (rows, cols) };
    let cell = |s: usize, l: usize| {
        if transposed {
            costs[(l, s)]
        } else {
            costs[(s, l)]
        }
    };

    fn search(
        s: usize,
        small: usize,
        used: &mut Vec<bool>,
        acc: f64,
        best: &mut f64,
        cell: &dyn Fn(usize, usize) -> f64,
    ) {
        if s == small {
            *best = best.min(acc);
            return;
        }
        for l in 0..used.len() {
            if !used[l] {
                used[l] = true;
                search(s + 1, small, used, acc + cell(s, l), best, cell);
                used[l] = false;
            }
        }
    }

    let mut best = f64::INFINITY;
    search(0, small, &mut vec![false; large], 0.0, &mut best, &cell);
    best
}
