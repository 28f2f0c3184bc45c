//! Node correspondence between snapshots of a topology tree.
//!
//! A topology tree is a rooted tree of 2-D positions (a root, primary and
//! secondary nodes). Two snapshots of the same structure, captured at
//! different times, are matched by
//! 1. a topology-preserving radial embedding of each tree,
//! 2. per-node feature vectors normalized within each tree,
//! 3. a similarity matrix (cosine or euclidean) turned into costs,
//! 4. an optimal rectangular assignment (shortest augmenting path).
//!
//! ```
//! use treematch::domain::{match_trees, NodeType, Point, SimilarityKind, Tree, TreeNode};
//!
//! let mut tree = Tree::new();
//! let root = tree.push_node(TreeNode::at(Point::ORIGIN, NodeType::Root), None);
//! tree.push_node(TreeNode::at(Point::new(1.0, 0.0), NodeType::Primary), Some(root));
//!
//! let assignment = match_trees(&tree, &tree, SimilarityKind::Euclidean).unwrap();
//! assert_eq!(assignment, vec![Some(0), Some(1)]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    embed, match_trees, match_trees_by_name, match_trees_with, solve, sort_tree, Assignment,
    DomainError, MatchOptions, SimilarityKind, Tree,
};
