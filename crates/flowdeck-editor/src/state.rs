//! Client-side workflow state.
//!
//! [`WorkflowState`] is the single source of truth the editor views read from.
//! It tracks two independent dirty flags: `has_unsaved_changes` for the graph
//! and `properties_panel_dirty` for an in-progress parameter edit. A whole-graph
//! save is only allowed while the panel flag is clear.

use flowdeck_graph::editor::{EdgeId, EditorEdge, EditorGraph, EditorNode, NodeId, NodeUpdate};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_STATE;

/// Workflow loaded when nothing else is configured.
pub const DEFAULT_WORKFLOW_ID: &str = "twflow_7c671147ef";

/// Graph, selection and dirty flags of the open workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    nodes: Vec<EditorNode>,
    edges: Vec<EditorEdge>,
    selected_node_id: Option<NodeId>,
    workflow_id: String,
    has_unsaved_changes: bool,
    properties_panel_dirty: bool,
    /// Bumped on every change of `nodes` or `edges`.
    #[serde(skip)]
    revision: u64,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_ID)
    }
}

impl WorkflowState {
    /// Creates an empty state for the given workflow.
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            selected_node_id: None,
            workflow_id: workflow_id.into(),
            has_unsaved_changes: false,
            properties_panel_dirty: false,
            revision: 0,
        }
    }

    pub fn nodes(&self) -> &[EditorNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EditorEdge] {
        &self.edges
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.selected_node_id.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn properties_panel_dirty(&self) -> bool {
        self.properties_panel_dirty
    }

    /// Monotonic counter of graph changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&EditorNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Returns the selected node, if the selection points at an existing node.
    pub fn selected_node(&self) -> Option<&EditorNode> {
        self.selected_node_id.as_ref().and_then(|id| self.node(id))
    }

    /// Returns a copy of the graph.
    pub fn graph(&self) -> EditorGraph {
        EditorGraph::new(self.nodes.clone(), self.edges.clone())
    }

    /// Whether a whole-graph save is allowed right now.
    pub fn can_save(&self) -> bool {
        !self.properties_panel_dirty
    }

    /// Header status line.
    pub fn status_text(&self) -> &'static str {
        if self.has_unsaved_changes {
            "Unsaved changes"
        } else {
            "All changes saved"
        }
    }

    /// Replaces the graph wholesale and clears the unsaved flag.
    ///
    /// Selection and the properties panel flag are left alone.
    pub fn load(&mut self, graph: EditorGraph) {
        tracing::debug!(
            target: TRACING_TARGET_STATE,
            workflow_id = %self.workflow_id,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "loaded workflow graph",
        );

        self.nodes = graph.nodes;
        self.edges = graph.edges;
        self.has_unsaved_changes = false;
        self.revision += 1;
    }

    /// Switches to another workflow, clearing graph and selection.
    pub fn open(&mut self, workflow_id: impl Into<String>) {
        self.workflow_id = workflow_id.into();
        self.selected_node_id = None;
        self.load(EditorGraph::default());
    }

    /// Replaces every node.
    pub fn set_nodes(&mut self, nodes: Vec<EditorNode>) {
        self.nodes = nodes;
        self.touch();
    }

    /// Replaces every edge.
    pub fn set_edges(&mut self, edges: Vec<EditorEdge>) {
        self.edges = edges;
        self.touch();
    }

    /// Appends a node.
    pub fn add_node(&mut self, node: EditorNode) {
        tracing::debug!(target: TRACING_TARGET_STATE, node_id = %node.id, kind = %node.kind, "added node");
        self.nodes.push(node);
        self.touch();
    }

    /// Appends an edge.
    pub fn add_edge(&mut self, edge: EditorEdge) {
        tracing::debug!(target: TRACING_TARGET_STATE, edge_id = %edge.id, "added edge");
        self.edges.push(edge);
        self.touch();
    }

    /// Shallow-merges an update into the node with the same id.
    ///
    /// Returns `false`, and changes nothing, when no such node exists.
    pub fn update_node(&mut self, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|node| node.id == update.id) else {
            tracing::debug!(target: TRACING_TARGET_STATE, node_id = %update.id, "update for unknown node ignored");
            return false;
        };

        node.apply(update);
        self.touch();
        true
    }

    /// Removes a node together with every edge touching it.
    pub fn delete_node(&mut self, id: &NodeId) {
        self.nodes.retain(|node| &node.id != id);

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));

        if self.selected_node_id.as_ref() == Some(id) {
            self.selected_node_id = None;
        }

        tracing::debug!(
            target: TRACING_TARGET_STATE,
            node_id = %id,
            removed_edges = before - self.edges.len(),
            "deleted node",
        );
        self.touch();
    }

    /// Removes an edge by id.
    pub fn delete_edge(&mut self, id: &EdgeId) {
        self.edges.retain(|edge| &edge.id != id);
        self.touch();
    }

    /// Changes the selection. Dirty flags are not affected.
    pub fn select_node(&mut self, id: Option<NodeId>) {
        self.selected_node_id = id;
    }

    /// Clears the unsaved flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.has_unsaved_changes = false;
    }

    /// Sets the properties panel flag.
    pub fn set_properties_panel_dirty(&mut self, dirty: bool) {
        self.properties_panel_dirty = dirty;
    }

    fn touch(&mut self) {
        self.has_unsaved_changes = true;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use flowdeck_graph::editor::{NodeData, NodeKind, Position};
    use serde_json::json;

    use super::*;

    fn node(id: &str, kind: NodeKind) -> EditorNode {
        EditorNode::new(id, kind, Position::default(), NodeData::new(id, kind.as_str()))
    }

    fn loaded() -> WorkflowState {
        let mut state = WorkflowState::default();
        state.load(EditorGraph::new(
            vec![
                node("n1", NodeKind::Activity),
                node("n2", NodeKind::Activity),
                node("n3", NodeKind::Trigger),
            ],
            vec![
                EditorEdge::new("e1", "n1", "n2"),
                EditorEdge::new("e2", "n3", "n1"),
                EditorEdge::new("e3", "n3", "n2"),
            ],
        ));
        state
    }

    #[test]
    fn test_initial_state() {
        let state = WorkflowState::default();
        assert_eq!(state.workflow_id(), "twflow_7c671147ef");
        assert!(state.nodes().is_empty());
        assert!(state.selected_node_id().is_none());
        assert!(!state.has_unsaved_changes());
        assert!(!state.properties_panel_dirty());
        assert_eq!(state.status_text(), "All changes saved");
    }

    #[test]
    fn test_load_clears_unsaved_but_not_panel_flag() {
        let mut state = WorkflowState::default();
        state.add_node(node("n1", NodeKind::Activity));
        state.set_properties_panel_dirty(true);
        assert!(state.has_unsaved_changes());

        state.load(EditorGraph::default());
        assert!(!state.has_unsaved_changes());
        assert!(state.properties_panel_dirty());
    }

    #[test]
    fn test_structural_edits_set_unsaved() {
        let mut state = loaded();
        state.add_edge(EditorEdge::new("e4", "n1", "n1"));
        assert!(state.has_unsaved_changes());
        assert_eq!(state.status_text(), "Unsaved changes");

        state.mark_saved();
        state.set_edges(Vec::new());
        assert!(state.has_unsaved_changes());

        state.mark_saved();
        state.set_nodes(Vec::new());
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_delete_node_cascades_edges_and_selection() {
        let mut state = loaded();
        state.select_node(Some("n1".into()));

        state.delete_node(&"n1".into());

        assert!(state.node(&"n1".into()).is_none());
        let remaining: Vec<_> = state.edges().iter().map(|edge| edge.id.as_str()).collect();
        assert_eq!(remaining, ["e3"]);
        assert!(state.selected_node_id().is_none());
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_delete_node_keeps_other_selection() {
        let mut state = loaded();
        state.select_node(Some("n2".into()));
        state.delete_node(&"n1".into());
        assert_eq!(state.selected_node_id().map(NodeId::as_str), Some("n2"));
    }

    #[test]
    fn test_update_node() {
        let mut state = loaded();
        let mut data = state.node(&"n2".into()).unwrap().data.clone();
        data.params.insert("url".into(), json!("https://example.com"));

        assert!(state.update_node(NodeUpdate::new("n2").with_data(data)));
        assert_eq!(state.node(&"n2".into()).unwrap().data.params["url"], "https://example.com");
        assert!(state.has_unsaved_changes());
    }

    #[test]
    fn test_update_unknown_node_is_noop() {
        let mut state = loaded();
        let before = state.clone();
        assert!(!state.update_node(NodeUpdate::new("ghost").with_position(Position::new(1.0, 1.0))));
        assert_eq!(state, before);
        assert!(!state.has_unsaved_changes());
    }

    #[test]
    fn test_selection_does_not_dirty() {
        let mut state = loaded();
        state.select_node(Some("n2".into()));
        assert_eq!(state.selected_node().unwrap().id, "n2");
        state.select_node(None);
        assert!(!state.has_unsaved_changes());
        assert!(!state.properties_panel_dirty());
    }

    #[test]
    fn test_delete_edge_and_mark_saved() {
        let mut state = loaded();
        state.delete_edge(&"e1".into());
        assert_eq!(state.edges().len(), 2);
        assert!(state.has_unsaved_changes());

        state.set_properties_panel_dirty(true);
        state.mark_saved();
        assert!(!state.has_unsaved_changes());
        assert!(state.properties_panel_dirty());
    }

    #[test]
    fn test_save_gate_follows_panel_flag() {
        let mut state = loaded();
        assert!(state.can_save());
        state.set_properties_panel_dirty(true);
        assert!(!state.can_save());
        state.set_properties_panel_dirty(false);
        assert!(state.can_save());
    }

    #[test]
    fn test_revision_tracks_graph_changes() {
        let mut state = loaded();
        let revision = state.revision();
        state.select_node(Some("n1".into()));
        state.set_properties_panel_dirty(true);
        assert_eq!(state.revision(), revision);

        state.delete_edge(&"e1".into());
        assert!(state.revision() > revision);
    }
}
