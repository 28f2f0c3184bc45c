/*
termtree rendering of a topology tree, one line per node:
`#<index> type=<code> pos=(x, y)`
 */
use termtree::Tree as TermTree;

use crate::domain::tree::Tree;

pub trait TreeDisplay {
    fn to_tree_string(&self) -> TermTree<String>;
}

impl TreeDisplay for Tree {
    /// Children are built before their parent by walking the BFS order
    /// backwards, so depth costs no call stack here.
    fn to_tree_string(&self) -> TermTree<String> {
        let Some(root) = self.root() else {
            return TermTree::new("Empty tree".to_string());
        };

        let order: Vec<usize> = self.iter_bfs().map(|(idx, _)| idx).collect();
        let mut built: Vec<Option<TermTree<String>>> = (0..self.len()).map(|_| None).collect();
        for &idx in order.iter().rev() {
            let node = &self.nodes[idx];
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[idx] = Some(
                TermTree::new(format!(
                    "#{} type={} pos={}",
                    idx, node.node_type, node.position
                ))
                .with_leaves(leaves),
            );
        }

        built[root]
            .take()
            .unwrap_or_else(|| TermTree::new("Empty tree".to_string()))
    }
}
