//! Tree exchange format (JSON)
//!
//! A file holds one of:
//! - a sequence of frames: `[{"timestamp": 17, "nodes": [...]}, ...]`
//! - a single frame: `{"timestamp": 17, "nodes": [...]}`
//! - a bare node list: `[{"position": {...}, ...}, ...]`
//!
//! Node record: `position.x`, `position.y`, `offset`, `angle` (radians),
//! `type` (0, 1, 2), `children` (indices) and `parent` (index, -1 for the root).
//! The flat `posX`/`posY` pair is accepted in place of `position` on load.
//! Files are validated on load; the matching core assumes well-formed trees.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{NodeType, Point, Tree, TreeNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionRecord>,
    #[serde(rename = "posX", default, skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,
    #[serde(rename = "posY", default, skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,
    pub offset: f64,
    pub angle: f64,
    #[serde(rename = "type")]
    pub node_type: u8,
    #[serde(default)]
    pub children: Vec<usize>,
    pub parent: i64,
}

impl NodeRecord {
    fn point(&self) -> Result<Point, String> {
        match (&self.position, self.pos_x, self.pos_y) {
            (Some(p), None, None) => Ok(Point::new(p.x, p.y)),
            (None, Some(x), Some(y)) => Ok(Point::new(x, y)),
            (Some(_), _, _) => Err("both `position` and `posX`/`posY` given".to_string()),
            _ => Err("missing field `position` (or `posX` and `posY`)".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    pub nodes: Vec<NodeRecord>,
}

impl From<&Tree> for TreeRecord {
    fn from(tree: &Tree) -> Self {
        let nodes = tree
            .nodes
            .iter()
            .map(|n| NodeRecord {
                position: Some(PositionRecord {
                    x: n.position.x,
                    y: n.position.y,
                }),
                pos_x: None,
                pos_y: None,
                offset: n.offset,
                angle: n.angle,
                node_type: n.node_type.code(),
                children: n.children.clone(),
                parent: n.parent.map_or(-1, |p| p as i64),
            })
            .collect();
        Self {
            timestamp: tree.timestamp,
            nodes,
        }
    }
}

impl TryFrom<TreeRecord> for Tree {
    type Error = String;

    fn try_from(record: TreeRecord) -> Result<Self, Self::Error> {
        let len = record.nodes.len();
        let mut nodes = Vec::with_capacity(len);
        for (idx, r) in record.nodes.into_iter().enumerate() {
            let node_type =
                NodeType::try_from(r.node_type).map_err(|e| format!("node {idx}: {e}"))?;
            let parent = match r.parent {
                -1 => None,
                p if p >= 0 && (p as usize) < len => Some(p as usize),
                p => return Err(format!("node {idx}: parent index {p} out of range")),
            };
            if let Some(&c) = r.children.iter().find(|&&c| c >= len) {
                return Err(format!("node {idx}: child index {c} out of range"));
            }
            let position = r.point().map_err(|e| format!("node {idx}: {e}"))?;
            nodes.push(TreeNode {
                position,
                offset: r.offset,
                angle: r.angle,
                node_type,
                parent,
                children: r.children,
                ..TreeNode::default()
            });
        }
        let tree = Tree {
            timestamp: record.timestamp,
            nodes,
        };
        validate_topology(&tree)?;
        Ok(tree)
    }
}

/// Single root, consistent parent/children links, everything reachable.
fn validate_topology(tree: &Tree) -> Result<(), String> {
    if tree.is_empty() {
        return Ok(());
    }
    let roots: Vec<usize> = (0..tree.len())
        .filter(|&i| tree.nodes[i].parent.is_none())
        .collect();
    if roots.len() != 1 {
        return Err(format!("expected exactly one root, found {}", roots.len()));
    }

    for (idx, node) in tree.nodes.iter().enumerate() {
        if let Some(p) = node.parent {
            if !tree.nodes[p].children.contains(&idx) {
                return Err(format!("node {idx}: parent {p} does not list it as a child"));
            }
        }
        for &c in &node.children {
            if tree.nodes[c].parent != Some(idx) {
                return Err(format!("node {idx}: child {c} names a different parent"));
            }
        }
    }

    let mut seen = vec![false; tree.len()];
    let mut queue = VecDeque::from([roots[0]]);
    while let Some(idx) = queue.pop_front() {
        if std::mem::replace(&mut seen[idx], true) {
            return Err(format!("node {idx} is reachable twice"));
        }
        queue.extend(tree.nodes[idx].children.iter().copied());
    }
    if let Some(idx) = seen.iter().position(|s| !s) {
        return Err(format!("node {idx} is not reachable from the root"));
    }
    Ok(())
}

/// Deserialize node records one by one so errors name the node.
fn node_records(values: Vec<Value>) -> Result<Vec<NodeRecord>, String> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, v)| serde_json::from_value(v).map_err(|e| format!("node {idx}: {e}")))
        .collect()
}

fn frame_record(value: Value) -> Result<TreeRecord, String> {
    let Value::Object(mut map) = value else {
        return Err("expected a frame object".to_string());
    };
    let timestamp = match map.remove("timestamp") {
        None | Some(Value::Null) => None,
        Some(v) => Some(serde_json::from_value(v).map_err(|e| format!("timestamp: {e}"))?),
    };
    let nodes = match map.remove("nodes") {
        Some(Value::Array(values)) => node_records(values)?,
        Some(_) => return Err("field `nodes` is not an array".to_string()),
        None => return Err("missing field `nodes`".to_string()),
    };
    Ok(TreeRecord { timestamp, nodes })
}

/// Parse the JSON `content` of `path` into frames.
///
/// An object is one frame. An array is a frame sequence when its first
/// element has `nodes`, otherwise a bare node list.
#[instrument(level = "debug", skip(content))]
pub fn parse_frames(content: &str, path: &Path) -> ApplicationResult<Vec<Tree>> {
    let invalid = |message: String| ApplicationError::InvalidTreeFile {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let records: Vec<TreeRecord> = match value {
        Value::Array(items) if items.is_empty() => Vec::new(),
        Value::Array(items) if items[0].get("nodes").is_some() => items
            .into_iter()
            .enumerate()
            .map(|(k, v)| frame_record(v).map_err(|m| invalid(format!("frame {k}: {m}"))))
            .collect::<ApplicationResult<_>>()?,
        Value::Array(items) => vec![TreeRecord {
            timestamp: None,
            nodes: node_records(items).map_err(|m| invalid(format!("frame 0: {m}")))?,
        }],
        value @ Value::Object(_) => {
            vec![frame_record(value).map_err(|m| invalid(format!("frame 0: {m}")))?]
        }
        _ => {
            return Err(invalid(
                "expected a frame, a list of frames or a list of nodes".to_string(),
            ))
        }
    };

    let frames = records
        .into_iter()
        .enumerate()
        .map(|(k, r)| Tree::try_from(r).map_err(|m| invalid(format!("frame {k}: {m}"))))
        .collect::<ApplicationResult<Vec<_>>>()?;
    debug!("parsed {} frames", frames.len());
    Ok(frames)
}

/// Render frames as a pretty-printed JSON sequence (4-space indent).
pub fn render_frames(frames: &[Tree]) -> ApplicationResult<String> {
    let records: Vec<TreeRecord> = frames.iter().map(TreeRecord::from).collect();
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records
        .serialize(&mut ser)
        .map_err(|e| ApplicationError::OperationFailed {
            context: "serialize trees".to_string(),
            source: Box::new(e),
        })?;
    String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
        context: "serialize trees".to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_NODES: &str = r#"[
        {"position": {"x": 0.0, "y": 0.0}, "offset": 0.0, "angle": 0.0, "type": 0, "children": [1], "parent": -1},
        {"position": {"x": 3.0, "y": 4.0}, "offset": 5.0, "angle": 0.927, "type": 1, "children": [], "parent": 0}
    ]"#;

    #[test]
    fn test_bare_node_list_is_one_frame() {
        let frames = parse_frames(TWO_NODES, Path::new("t.json")).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].timestamp, None);
        assert_eq!(frames[0].nodes[1].parent, Some(0));
        assert_eq!(frames[0].nodes[1].node_type, NodeType::Primary);
    }

    #[test]
    fn test_single_frame_keeps_timestamp() {
        let content = format!(r#"{{"timestamp": 42, "nodes": {TWO_NODES}}}"#);
        let frames = parse_frames(&content, Path::new("t.json")).unwrap();
        assert_eq!(frames[0].timestamp, Some(42));
    }

    #[test]
    fn test_flat_position_fields_are_accepted() {
        let content = r#"[
            {"posX": 0.0, "posY": 0.0, "offset": 0.0, "angle": 0.0, "type": 0, "children": [1], "parent": -1},
            {"posX": 3.0, "posY": 4.0, "offset": 5.0, "angle": 0.927, "type": 1, "children": [], "parent": 0}
        ]"#;
        let frames = parse_frames(content, Path::new("t.json")).unwrap();
        assert_eq!(frames[0].nodes[1].position, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_missing_position_names_the_node() {
        let content = TWO_NODES.replace(r#""position": {"x": 3.0, "y": 4.0}, "#, "");
        let err = parse_frames(&content, Path::new("t.json")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("frame 0: node 1"), "{message}");
        assert!(message.contains("`position`"), "{message}");
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let err = parse_frames("17", Path::new("t.json")).unwrap_err();
        assert!(err.to_string().contains("expected a frame"), "{err}");
    }

    #[test]
    fn test_inconsistent_links_are_rejected() {
        let content = TWO_NODES.replace(r#""children": [1]"#, r#""children": []"#);
        let err = parse_frames(&content, Path::new("t.json")).unwrap_err();
        assert!(err.to_string().contains("does not list it as a child"), "{err}");
    }

    #[test]
    fn test_two_roots_are_rejected() {
        let content = TWO_NODES
            .replace(r#""children": [1]"#, r#""children": []"#)
            .replace(r#""parent": 0"#, r#""parent": -1"#);
        let err = parse_frames(&content, Path::new("t.json")).unwrap_err();
        assert!(err.to_string().contains("exactly one root"), "{err}");
    }
}
