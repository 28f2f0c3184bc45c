//! Domain layer: tree model and the matching core
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod assignment;
pub mod display;
pub mod embedding;
pub mod error;
pub mod features;
pub mod matching;
pub mod matrix;
pub mod similarity;
pub mod sort;
pub mod tree;

pub use assignment::{solve, Assignment, CostValue};
pub use display::TreeDisplay;
pub use embedding::embed;
pub use error::{DomainError, DomainResult};
pub use features::{feature_vectors, AngleEncoding, FeatureConfig, TypeEncoding};
pub use matching::{match_trees, match_trees_by_name, match_trees_with, MatchOptions, MatchOutcome};
pub use matrix::Matrix;
pub use similarity::{cost_matrix, similarity_matrix, CostPolicy, SimilarityKind};
pub use sort::{sort_tree, SortedTree};
pub use tree::{Embedding, NodeType, Point, Tree, TreeNode};
