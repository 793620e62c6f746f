//! Editor graph container.

use serde::{Deserialize, Serialize};

use super::{EditorEdge, EditorNode, NodeId};

/// Nodes and edges as the editor canvas holds them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorGraph {
    /// Canvas nodes in display order.
    #[serde(default)]
    pub nodes: Vec<EditorNode>,
    /// Canvas edges in display order.
    #[serde(default)]
    pub edges: Vec<EditorEdge>,
}

impl EditorGraph {
    /// Creates a graph from its parts.
    pub fn new(nodes: Vec<EditorNode>, edges: Vec<EditorEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Returns whether the graph has neither nodes nor edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&EditorNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Returns edges whose endpoints do not both reference existing nodes.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &EditorEdge> {
        self.edges
            .iter()
            .filter(|edge| self.node(&edge.source).is_none() || self.node(&edge.target).is_none())
    }
}
