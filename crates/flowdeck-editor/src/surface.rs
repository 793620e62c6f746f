//! Canvas interaction handling.
//!
//! The surface keeps its own copy of nodes and edges so that high-frequency
//! changes (dragging, selection highlights) do not mark the workflow dirty.
//! Only structural changes and finished drags are written back to the
//! [`WorkflowState`].

use std::collections::HashSet;

use flowdeck_core::{Error, Result};
use flowdeck_graph::connectivity::{Connection, ConnectionRules};
use flowdeck_graph::editor::{
    EdgeId, EditorEdge, EditorNode, NodeData, NodeId, NodeKind, Position,
};
use flowdeck_graph::{DEFAULT_ID_PREFIX, generate_id};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_SURFACE;
use crate::state::WorkflowState;

/// A change to canvas nodes reported by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// The node moved; `dragging` is `false` once the drag has ended.
    Position {
        id: NodeId,
        position: Option<Position>,
        dragging: bool,
    },
    /// The node's selection highlight changed.
    Select { id: NodeId, selected: bool },
    /// The node was removed.
    Remove { id: NodeId },
    /// A node was added.
    Add { node: EditorNode },
}

impl NodeChange {
    fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Remove { .. } | Self::Add { .. } | Self::Position { dragging: false, .. }
        )
    }
}

/// A change to canvas edges reported by the view.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    /// The edge's selection highlight changed.
    Select { id: EdgeId, selected: bool },
    /// The edge was removed.
    Remove { id: EdgeId },
    /// An edge was added.
    Add { edge: EditorEdge },
}

impl EdgeChange {
    fn is_structural(&self) -> bool {
        matches!(self, Self::Remove { .. } | Self::Add { .. })
    }
}

/// Payload the palette attaches to a dragged node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    /// Structural type, e.g. `"activity"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Catalog name of the node.
    pub node_name: String,
}

impl DropPayload {
    /// Serializes the payload as carried by a drag operation.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Headless editor canvas.
#[derive(Debug, Clone, Default)]
pub struct EditorSurface {
    nodes: Vec<EditorNode>,
    edges: Vec<EditorEdge>,
    selected_nodes: HashSet<NodeId>,
    selected_edges: HashSet<EdgeId>,
    synced_revision: Option<u64>,
    rules: ConnectionRules,
}

impl EditorSurface {
    /// Creates a surface that enforces the default connection rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface with custom connection rules.
    pub fn with_rules(rules: ConnectionRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[EditorNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EditorEdge] {
        &self.edges
    }

    /// Whether the node is highlighted on the canvas.
    pub fn is_node_selected(&self, id: &NodeId) -> bool {
        self.selected_nodes.contains(id)
    }

    /// Whether the edge is highlighted on the canvas.
    pub fn is_edge_selected(&self, id: &EdgeId) -> bool {
        self.selected_edges.contains(id)
    }

    /// Re-reads nodes and edges from the state when it changed since the last sync.
    ///
    /// Returns whether anything was copied.
    pub fn sync(&mut self, state: &WorkflowState) -> bool {
        if self.synced_revision == Some(state.revision()) {
            return false;
        }

        self.nodes = state.nodes().to_vec();
        self.edges = state.edges().to_vec();
        self.selected_nodes.retain(|id| state.node(id).is_some());
        let edges = &self.edges;
        self.selected_edges
            .retain(|id| edges.iter().any(|edge| &edge.id == id));
        self.synced_revision = Some(state.revision());
        true
    }

    /// Applies node changes locally, writing the nodes back on structural changes.
    pub fn on_nodes_change(&mut self, state: &mut WorkflowState, changes: Vec<NodeChange>) {
        let structural = changes.iter().any(NodeChange::is_structural);
        let mut edges_removed = false;

        for change in changes {
            edges_removed |= self.apply_node_change(change);
        }

        if structural {
            tracing::trace!(target: TRACING_TARGET_SURFACE, nodes = self.nodes.len(), "syncing nodes");
            state.set_nodes(self.nodes.clone());
            if edges_removed {
                state.set_edges(self.edges.clone());
            }
            self.synced_revision = Some(state.revision());
        }
    }

    /// Applies one node change; returns whether edges were removed with it.
    fn apply_node_change(&mut self, change: NodeChange) -> bool {
        match change {
            NodeChange::Position {
                id,
                position: Some(position),
                ..
            } => {
                if let Some(node) = self.nodes.iter_mut().find(|node| node.id == id) {
                    node.position = position;
                }
                false
            }
            NodeChange::Position { position: None, .. } => false,
            NodeChange::Select { id, selected } => {
                if selected {
                    self.selected_nodes.insert(id);
                } else {
                    self.selected_nodes.remove(&id);
                }
                false
            }
            NodeChange::Remove { id } => {
                self.nodes.retain(|node| node.id != id);
                self.selected_nodes.remove(&id);

                let before = self.edges.len();
                self.edges.retain(|edge| !edge.touches(&id));
                let edges = &self.edges;
                self.selected_edges
                    .retain(|edge_id| edges.iter().any(|edge| &edge.id == edge_id));

                tracing::debug!(
                    target: TRACING_TARGET_SURFACE,
                    node_id = %id,
                    removed_edges = before - self.edges.len(),
                    "removed node from canvas",
                );
                before != self.edges.len()
            }
            NodeChange::Add { node } => {
                self.nodes.push(node);
                false
            }
        }
    }

    /// Applies edge changes locally, writing the edges back on add or remove.
    pub fn on_edges_change(&mut self, state: &mut WorkflowState, changes: Vec<EdgeChange>) {
        let structural = changes.iter().any(EdgeChange::is_structural);

        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if selected {
                        self.selected_edges.insert(id);
                    } else {
                        self.selected_edges.remove(&id);
                    }
                }
                EdgeChange::Remove { id } => {
                    self.edges.retain(|edge| edge.id != id);
                    self.selected_edges.remove(&id);
                }
                EdgeChange::Add { edge } => self.edges.push(edge),
            }
        }

        if structural {
            state.set_edges(self.edges.clone());
            self.synced_revision = Some(state.revision());
        }
    }

    /// Connects two nodes.
    ///
    /// Rejected connections leave everything untouched. A connection that
    /// repeats an existing one is accepted but adds nothing, yielding `None`.
    pub fn on_connect(
        &mut self,
        state: &mut WorkflowState,
        connection: Connection,
    ) -> Result<Option<EdgeId>> {
        self.rules.check(&connection, &self.nodes, &self.edges)?;

        if self.edges.iter().any(|edge| connection.matches(edge)) {
            tracing::debug!(
                target: TRACING_TARGET_SURFACE,
                source_node = %connection.source,
                target_node = %connection.target,
                "connection already exists",
            );
            return Ok(None);
        }

        let edge = connection.to_edge();
        let id = edge.id.clone();
        self.edges.push(edge);
        state.set_edges(self.edges.clone());
        self.synced_revision = Some(state.revision());

        Ok(Some(id))
    }

    /// Selects the clicked node.
    pub fn on_node_click(&mut self, state: &mut WorkflowState, id: NodeId) {
        state.select_node(Some(id));
    }

    /// Clears the selection.
    pub fn on_pane_click(&mut self, state: &mut WorkflowState) {
        state.select_node(None);
    }

    /// Adds a node for a palette drop at a canvas position.
    ///
    /// An empty payload is ignored; an unreadable one is an input error.
    pub fn on_drop(
        &mut self,
        state: &mut WorkflowState,
        payload: &str,
        position: Position,
    ) -> Result<Option<NodeId>> {
        if payload.is_empty() {
            return Ok(None);
        }

        let DropPayload {
            node_type,
            node_name,
        } = serde_json::from_str(payload).map_err(|error| {
            Error::invalid_input()
                .with_message(format!("unreadable drop payload: {error}"))
                .with_source(error)
        })?;

        let id = NodeId::new(generate_id(DEFAULT_ID_PREFIX));
        let node = EditorNode::new(
            id.clone(),
            NodeKind::from_type_name(&node_type),
            position,
            NodeData::new(node_name, node_type),
        );

        tracing::debug!(
            target: TRACING_TARGET_SURFACE,
            node_id = %id,
            kind = %node.kind,
            "dropped node onto canvas",
        );

        state.add_node(node);
        self.sync(state);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use flowdeck_core::ErrorKind;
    use flowdeck_graph::editor::EditorGraph;

    use super::*;

    fn node(id: &str, kind: NodeKind) -> EditorNode {
        EditorNode::new(id, kind, Position::default(), NodeData::new(id, kind.as_str()))
    }

    fn setup() -> (WorkflowState, EditorSurface) {
        let mut state = WorkflowState::default();
        state.load(EditorGraph::new(
            vec![
                node("t1", NodeKind::Trigger),
                node("a1", NodeKind::Activity),
                node("a2", NodeKind::Activity),
            ],
            vec![EditorEdge::new("e1", "t1", "a1")],
        ));
        let mut surface = EditorSurface::new();
        assert!(surface.sync(&state));
        (state, surface)
    }

    #[test]
    fn test_dragging_stays_local_until_drop() {
        let (mut state, mut surface) = setup();

        surface.on_nodes_change(
            &mut state,
            vec![NodeChange::Position {
                id: "a1".into(),
                position: Some(Position::new(10.0, 20.0)),
                dragging: true,
            }],
        );
        assert!(!state.has_unsaved_changes());
        assert_eq!(state.node(&"a1".into()).unwrap().position, Position::default());
        assert_eq!(surface.nodes()[1].position, Position::new(10.0, 20.0));

        surface.on_nodes_change(
            &mut state,
            vec![NodeChange::Position {
                id: "a1".into(),
                position: Some(Position::new(30.0, 40.0)),
                dragging: false,
            }],
        );
        assert!(state.has_unsaved_changes());
        assert_eq!(state.node(&"a1".into()).unwrap().position, Position::new(30.0, 40.0));
    }

    #[test]
    fn test_selection_changes_never_dirty() {
        let (mut state, mut surface) = setup();

        surface.on_nodes_change(
            &mut state,
            vec![NodeChange::Select { id: "a1".into(), selected: true }],
        );
        surface.on_edges_change(
            &mut state,
            vec![EdgeChange::Select { id: "e1".into(), selected: true }],
        );

        assert!(!state.has_unsaved_changes());
        assert!(surface.is_node_selected(&"a1".into()));
        assert!(surface.is_edge_selected(&"e1".into()));
    }

    #[test]
    fn test_remove_changes_sync() {
        let (mut state, mut surface) = setup();

        surface.on_edges_change(&mut state, vec![EdgeChange::Remove { id: "e1".into() }]);
        assert!(state.edges().is_empty());
        assert!(state.has_unsaved_changes());

        surface.on_nodes_change(&mut state, vec![NodeChange::Remove { id: "a2".into() }]);
        assert_eq!(state.nodes().len(), 2);
    }

    #[test]
    fn test_remove_node_drops_its_edges() {
        let (mut state, mut surface) = setup();
        surface
            .on_connect(&mut state, Connection::new("a1", "a2"))
            .unwrap();
        surface.on_edges_change(
            &mut state,
            vec![EdgeChange::Select { id: "e1".into(), selected: true }],
        );

        surface.on_nodes_change(&mut state, vec![NodeChange::Remove { id: "a1".into() }]);

        let ids: Vec<_> = state.nodes().iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, ["t1", "a2"]);
        assert!(state.edges().is_empty());
        assert!(surface.edges().is_empty());
        assert!(!surface.is_edge_selected(&"e1".into()));
        assert!(!surface.sync(&state));
    }

    #[test]
    fn test_connect_rejects_trigger_target() {
        let (mut state, mut surface) = setup();

        let error = surface
            .on_connect(&mut state, Connection::new("a1", "t1"))
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidConnection);
        assert_eq!(state.edges().len(), 1);
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_connect_adds_marked_edge_once() {
        let (mut state, mut surface) = setup();

        let id = surface
            .on_connect(&mut state, Connection::new("a1", "a2"))
            .unwrap();
        assert_eq!(id.as_ref().map(EdgeId::as_str), Some("edge-a1-a2"));

        let edge = state.edges().last().unwrap();
        assert_eq!(edge.source, "a1");
        assert!(edge.marker_end.is_some());
        assert!(state.has_unsaved_changes());

        let again = surface
            .on_connect(&mut state, Connection::new("a1", "a2"))
            .unwrap();
        assert!(again.is_none());
        assert_eq!(state.edges().len(), 2);
    }

    #[test]
    fn test_clicks_drive_selection() {
        let (mut state, mut surface) = setup();

        surface.on_node_click(&mut state, "a2".into());
        assert_eq!(state.selected_node_id().map(NodeId::as_str), Some("a2"));

        surface.on_pane_click(&mut state);
        assert!(state.selected_node_id().is_none());
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_drop_adds_node() {
        let (mut state, mut surface) = setup();
        let payload = DropPayload {
            node_type: "controller".into(),
            node_name: "if_else".into(),
        };

        let id = surface
            .on_drop(&mut state, &payload.encode(), Position::new(5.0, 6.0))
            .unwrap()
            .unwrap();

        let node = state.node(&id).unwrap();
        assert!(id.as_str().starts_with("node_"));
        assert_eq!(node.kind, NodeKind::Controller);
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert_eq!(node.data.label.as_deref(), Some("if_else"));
        assert_eq!(node.data.node_type.as_deref(), Some("controller"));
        assert!(node.data.params.is_empty());
        assert_eq!(surface.nodes().len(), 4);
    }

    #[test]
    fn test_drop_ignores_empty_and_rejects_garbage() {
        let (mut state, mut surface) = setup();

        assert_eq!(surface.on_drop(&mut state, "", Position::default()).unwrap(), None);
        let error = surface
            .on_drop(&mut state, "{not json", Position::default())
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(state.nodes().len(), 3);
    }

    #[test]
    fn test_sync_follows_state_changes() {
        let (mut state, mut surface) = setup();
        assert!(!surface.sync(&state));

        state.delete_node(&"a1".into());
        assert!(surface.sync(&state));
        assert_eq!(surface.nodes().len(), 2);
        assert!(surface.edges().is_empty());
    }
}
