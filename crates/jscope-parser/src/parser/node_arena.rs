//! NodeArena creation methods.

use super::base::NodeIndex;
use super::node::{Node, NodeArena, NodeData, NodeKind};

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Create an arena with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node. Parent links are filled in by [`NodeArena::link_parents`].
    pub fn add_node(&mut self, kind: NodeKind, pos: u32, end: u32, data: NodeData) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            pos,
            end,
            parent: NodeIndex::NONE,
            data,
        });
        idx
    }

    /// Replace a node's kind and payload, keeping its range.
    ///
    /// Used when the parser learns late that an expression was really a type
    /// (e.g. the qualifier of `Outer.this`). Former children become orphans
    /// that no tree walk reaches.
    pub fn replace_node(&mut self, idx: NodeIndex, kind: NodeKind, data: NodeData) {
        if let Some(node) = self.nodes.get_mut(idx.0 as usize) {
            node.kind = kind;
            node.data = data;
        }
    }

    /// Point every reachable child at its parent, starting from `root`.
    pub fn link_parents(&mut self, root: NodeIndex) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            for child in self.children(idx) {
                if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                    node.parent = idx;
                }
                stack.push(child);
            }
        }
    }
}
