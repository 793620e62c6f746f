//! Connection rules for editor edges.
//!
//! The baseline rule is that trigger nodes never receive incoming edges. A
//! connection to a node that does not exist is not rejected here; dangling
//! edges are a separate concern (see [`EditorGraph::dangling_edges`]).
//!
//! [`EditorGraph::dangling_edges`]: crate::editor::EditorGraph::dangling_edges

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TRACING_TARGET_CONNECTIVITY;
use crate::editor::{EdgeId, EditorEdge, EditorNode, NodeId};

/// A prospective edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Handle on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Handle on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Creates a connection without handles.
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Sets both handles.
    pub fn with_handles(
        mut self,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
        self
    }

    /// Deterministic edge id for this connection:
    /// `edge-{source}{sourceHandle}-{target}{targetHandle}`.
    pub fn edge_id(&self) -> EdgeId {
        EdgeId::new(format!(
            "edge-{}{}-{}{}",
            self.source,
            self.source_handle.as_deref().unwrap_or_default(),
            self.target,
            self.target_handle.as_deref().unwrap_or_default(),
        ))
    }

    /// Returns whether an existing edge already joins the same handles.
    pub fn matches(&self, edge: &EditorEdge) -> bool {
        edge.source == self.source
            && edge.target == self.target
            && edge.source_handle == self.source_handle
            && edge.target_handle == self.target_handle
    }

    /// Builds the editor edge for this connection.
    pub fn to_edge(&self) -> EditorEdge {
        let mut edge = EditorEdge::new(self.edge_id(), self.source.clone(), self.target.clone());
        edge.source_handle = self.source_handle.clone();
        edge.target_handle = self.target_handle.clone();
        edge
    }
}

/// Reasons a connection is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The target is a trigger node.
    #[error("trigger nodes cannot have incoming edges (target `{target}`)")]
    TargetIsTrigger { target: NodeId },
    /// Source and target are the same node.
    #[error("node `{node}` cannot connect to itself")]
    SelfLoop { node: NodeId },
    /// An identical edge already exists.
    #[error("nodes `{from}` and `{to}` are already connected")]
    Duplicate { from: NodeId, to: NodeId },
}

impl From<ConnectionError> for flowdeck_core::Error {
    fn from(error: ConnectionError) -> Self {
        let message = error.to_string();
        Self::invalid_connection().with_message(message).with_source(error)
    }
}

/// Returns `false` when the target exists and is a trigger, `true` otherwise.
pub fn is_valid_connection(connection: &Connection, nodes: &[EditorNode]) -> bool {
    !nodes
        .iter()
        .find(|node| node.id == connection.target)
        .is_some_and(|node| node.kind.is_trigger())
}

/// Configurable connection rules.
///
/// The default only enforces the trigger rule; self-loop and duplicate checks
/// are opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRules {
    /// Reject edges whose source and target are the same node.
    #[serde(default)]
    pub reject_self_loops: bool,
    /// Reject edges that repeat an existing connection.
    #[serde(default)]
    pub reject_duplicates: bool,
}

impl ConnectionRules {
    /// Rules that also reject self-loops and duplicates.
    pub const fn strict() -> Self {
        Self {
            reject_self_loops: true,
            reject_duplicates: true,
        }
    }

    /// Checks a connection against the current graph.
    pub fn check(
        &self,
        connection: &Connection,
        nodes: &[EditorNode],
        edges: &[EditorEdge],
    ) -> Result<(), ConnectionError> {
        let result = self.evaluate(connection, nodes, edges);

        if let Err(error) = &result {
            tracing::warn!(
                target: TRACING_TARGET_CONNECTIVITY,
                source_node = %connection.source,
                target_node = %connection.target,
                reason = %error,
                "rejected connection",
            );
        }

        result
    }

    fn evaluate(
        &self,
        connection: &Connection,
        nodes: &[EditorNode],
        edges: &[EditorEdge],
    ) -> Result<(), ConnectionError> {
        if !is_valid_connection(connection, nodes) {
            return Err(ConnectionError::TargetIsTrigger {
                target: connection.target.clone(),
            });
        }

        if self.reject_self_loops && connection.source == connection.target {
            return Err(ConnectionError::SelfLoop {
                node: connection.source.clone(),
            });
        }

        if self.reject_duplicates && edges.iter().any(|edge| connection.matches(edge)) {
            return Err(ConnectionError::Duplicate {
                from: connection.source.clone(),
                to: connection.target.clone(),
            });
        }

        Ok(())
    }
}
