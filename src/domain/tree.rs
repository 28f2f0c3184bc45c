//! Index-addressed topology tree.
//!
//! Nodes live in a flat `Vec` and refer to each other only by index, so a
//! tree can be cloned, reordered and serialized without any shared ownership.

use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt;

use tracing::instrument;

use crate::domain::error::DomainError;

/// Cartesian point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at `radius` along `angle_deg` (degrees, counterclockwise from +x).
    pub fn from_polar_degrees(radius: f64, angle_deg: f64) -> Self {
        let rad = angle_deg * PI / 180.0;
        Self {
            x: radius * rad.cos(),
            y: radius * rad.sin(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Node classification; `Root` is reserved for the tree root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    #[default]
    Root,
    Primary,
    Secondary,
}

impl NodeType {
    pub fn code(self) -> u8 {
        match self {
            NodeType::Root => 0,
            NodeType::Primary => 1,
            NodeType::Secondary => 2,
        }
    }
}

impl TryFrom<u8> for NodeType {
    type Error = DomainError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(NodeType::Root),
            1 => Ok(NodeType::Primary),
            2 => Ok(NodeType::Secondary),
            other => Err(DomainError::UnknownNodeType(other)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Topology-preserving layout of a node, written by the embedder.
///
/// Angles are in degrees; the sector `[angle_min, angle_max]` nests inside
/// the parent's sector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Embedding {
    pub position: Point,
    pub radius: f64,
    pub angle: f64,
    pub angle_min: f64,
    pub angle_max: f64,
}

/// One position of the topology tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    /// Original position
    pub position: Point,
    /// Distance of `position` from the origin
    pub offset: f64,
    /// `atan2(y, x)` of `position` in radians, 0 at the origin
    pub angle: f64,
    pub node_type: NodeType,
    /// Index of the parent node, None for the root
    pub parent: Option<usize>,
    /// Indices of child nodes, in order
    pub children: Vec<usize>,
    pub embedding: Embedding,
}

impl TreeNode {
    /// Node at `position` with polar fields derived from it.
    pub fn at(position: Point, node_type: NodeType) -> Self {
        let mut node = Self {
            position,
            node_type,
            ..Self::default()
        };
        node.refresh_polar();
        node
    }

    /// Recompute `offset` and `angle` from `position`.
    pub fn refresh_polar(&mut self) {
        self.offset = self.position.norm();
        self.angle = if self.offset > 0.0 {
            self.position.y.atan2(self.position.x)
        } else {
            0.0
        };
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flat, index-addressed tree with an optional capture timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub timestamp: Option<u64>,
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> Option<&TreeNode> {
        self.nodes.get(idx)
    }

    /// Append `node` under `parent` and return its index.
    ///
    /// The parent's `children` list is extended; with `parent = None` the
    /// node becomes a root.
    pub fn push_node(&mut self, mut node: TreeNode, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        node.parent = parent;
        node.children.clear();
        self.nodes.push(node);
        if let Some(parent_idx) = parent {
            if let Some(parent) = self.nodes.get_mut(parent_idx) {
                parent.children.push(idx);
            }
        }
        idx
    }

    /// Index of the root: node 0 unless it has a parent, then the first
    /// parentless node.
    pub fn root(&self) -> Option<usize> {
        match self.nodes.first() {
            None => None,
            Some(first) if first.parent.is_none() => Some(0),
            Some(_) => self.nodes.iter().position(|n| n.parent.is_none()),
        }
    }

    /// Breadth-first traversal from the root, children in stored order.
    pub fn iter_bfs(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(self)
    }

    /// Number of levels; 0 for an empty tree.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let Some(root) = self.root() else {
            return 0;
        };
        let mut max_depth = 0;
        let mut queue = VecDeque::from([(root, 1usize)]);
        while let Some((idx, depth)) = queue.pop_front() {
            max_depth = max_depth.max(depth);
            for &child in &self.nodes[idx].children {
                queue.push_back((child, depth + 1));
            }
        }
        max_depth
    }

    /// Leaf indices in breadth-first order.
    pub fn leaf_nodes(&self) -> Vec<usize> {
        self.iter_bfs()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Recompute polar attributes of every node from its position.
    pub fn refresh_polar(&mut self) {
        self.nodes.iter_mut().for_each(TreeNode::refresh_polar);
    }

    /// Convert from the vehicle frame (x forward, y left) to the display
    /// frame (x right, y forward).
    pub fn rotate_to_display_frame(&mut self) {
        for node in &mut self.nodes {
            let Point { x, y } = node.position;
            node.position = Point::new(-y, x);
            node.refresh_polar();
        }
    }
}

/// Breadth-first iterator over `(index, node)` pairs.
pub struct BreadthFirst<'a> {
    tree: &'a Tree,
    queue: VecDeque<usize>,
}

impl<'a> BreadthFirst<'a> {
    fn new(tree: &'a Tree) -> Self {
        let queue = tree.root().into_iter().collect();
        Self { tree, queue }
    }
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.queue.pop_front()?;
        let node = self.tree.nodes.get(idx)?;
        self.queue.extend(node.children.iter().copied());
        Some((idx, node))
    }
}
