//! Per-node feature vectors combining the embedding with raw attributes.
//!
//! Every scale-dependent attribute is min-max normalized within its own tree,
//! so two snapshots of different extent remain comparable.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::tree::{NodeType, Tree};

/// Value used when a normalized attribute has no spread.
pub const DEGENERATE_NORM: f64 = 0.5;

/// Encoding of the original polar angle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleEncoding {
    /// `angle / 2π`, one column
    #[default]
    Fraction,
    /// `sin(angle), cos(angle)`, two columns
    SinCos,
}

/// Encoding of the node type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeEncoding {
    /// Type code as a number, one column
    #[default]
    Scalar,
    /// One-hot over the three types, three columns
    OneHot,
}

impl FromStr for AngleEncoding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fraction" => Ok(Self::Fraction),
            "sin_cos" => Ok(Self::SinCos),
            other => Err(DomainError::UnknownEncoding(other.to_string())),
        }
    }
}

impl FromStr for TypeEncoding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "one_hot" => Ok(Self::OneHot),
            other => Err(DomainError::UnknownEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for AngleEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fraction => "fraction",
            Self::SinCos => "sin_cos",
        })
    }
}

impl fmt::Display for TypeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::OneHot => "one_hot",
        })
    }
}

/// Feature layout; both trees of a comparison must share one config.
///
/// Columns, in order:
/// `[emb_x, emb_y, norm_radius, sin(emb_angle), cos(emb_angle),
///   norm_x, norm_y, norm_offset, <angle>, <type>]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub angle: AngleEncoding,
    pub node_type: TypeEncoding,
}

impl FeatureConfig {
    const FIXED_COLUMNS: usize = 8;

    pub fn dimension(&self) -> usize {
        let angle = match self.angle {
            AngleEncoding::Fraction => 1,
            AngleEncoding::SinCos => 2,
        };
        let node_type = match self.node_type {
            TypeEncoding::Scalar => 1,
            TypeEncoding::OneHot => 3,
        };
        Self::FIXED_COLUMNS + angle + node_type
    }
}

/// Min-max scaler over one attribute of one tree.
#[derive(Debug, Clone, Copy)]
struct MinMax {
    min: f64,
    max: f64,
}

impl MinMax {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        match values.minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => Self { min: 0.0, max: 0.0 },
            MinMaxResult::OneElement(v) => Self { min: v, max: v },
            MinMaxResult::MinMax(min, max) => Self { min, max },
        }
    }

    fn scale(&self, v: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            DEGENERATE_NORM
        } else {
            (v - self.min) / range
        }
    }
}

/// Build one feature vector per node, in node order.
///
/// Expects the tree to be embedded already.
#[instrument(level = "debug", skip(tree), fields(nodes = tree.len()))]
pub fn feature_vectors(tree: &Tree, config: &FeatureConfig) -> Vec<Vec<f64>> {
    let radius = MinMax::over(tree.nodes.iter().map(|n| n.embedding.radius));
    let pos_x = MinMax::over(tree.nodes.iter().map(|n| n.position.x));
    let pos_y = MinMax::over(tree.nodes.iter().map(|n| n.position.y));
    let offset_max = tree.nodes.iter().map(|n| n.offset).fold(0.0, f64::max);

    let features: Vec<Vec<f64>> = tree
        .nodes
        .iter()
        .map(|node| {
            let e = &node.embedding;
            let emb_angle = e.angle.to_radians();
            let mut v = Vec::with_capacity(config.dimension());
            v.extend([
                e.position.x,
                e.position.y,
                radius.scale(e.radius),
                emb_angle.sin(),
                emb_angle.cos(),
                pos_x.scale(node.position.x),
                pos_y.scale(node.position.y),
                if offset_max == 0.0 {
                    0.0
                } else {
                    node.offset / offset_max
                },
            ]);
            match config.angle {
                AngleEncoding::Fraction => v.push(node.angle / (2.0 * PI)),
                AngleEncoding::SinCos => v.extend([node.angle.sin(), node.angle.cos()]),
            }
            match config.node_type {
                TypeEncoding::Scalar => v.push(f64::from(node.node_type.code())),
                TypeEncoding::OneHot => v.extend(one_hot(node.node_type)),
            }
            v
        })
        .collect();

    for (idx, v) in features.iter().enumerate() {
        debug!(node = idx, features = ?v, "feature vector");
    }
    features
}

fn one_hot(node_type: NodeType) -> [f64; 3] {
    let mut out = [0.0; 3];
    out[usize::from(node_type.code())] = 1.0;
    out
}
