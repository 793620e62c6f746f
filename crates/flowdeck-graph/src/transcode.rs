//! Conversion between the wire definition and the editor graph.
//!
//! [`to_editor_shape`] never fails: a missing document or definition yields an
//! empty graph, and unusable elements are dropped. [`DefinitionShape`] lets
//! callers tell those cases apart when they want to report them.

use crate::TRACING_TARGET;
use crate::editor::{
    DEFAULT_EDGE_TYPE, EditorEdge, EditorGraph, EditorNode, MarkerEnd, NodeData, NodeKind,
    Position,
};
use crate::wire::{
    UpdateEdge, UpdateNode, WireEdge, WireNode, WorkflowDefinition, WorkflowDocument,
    WorkflowUpdate,
};

/// X coordinate of the first grid column.
pub const GRID_ORIGIN_X: f64 = 200.0;
/// Y coordinate of the first grid row.
pub const GRID_ORIGIN_Y: f64 = 100.0;
/// Horizontal distance between grid columns.
pub const GRID_COLUMN_WIDTH: f64 = 350.0;
/// Vertical distance between grid rows.
pub const GRID_ROW_HEIGHT: f64 = 200.0;
/// Number of columns before the grid wraps.
pub const GRID_COLUMNS: usize = 3;

/// Default position of the `index`-th node of a definition.
pub fn grid_position(index: usize) -> Position {
    let column = (index % GRID_COLUMNS) as f64;
    let row = (index / GRID_COLUMNS) as f64;
    Position::new(
        GRID_ORIGIN_X + column * GRID_COLUMN_WIDTH,
        GRID_ORIGIN_Y + row * GRID_ROW_HEIGHT,
    )
}

/// How a workflow document stores its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionShape {
    /// No usable `definition` payload.
    Missing,
    /// Nodes stored as an array.
    Array,
    /// Nodes stored keyed by id.
    Keyed,
}

impl DefinitionShape {
    /// Classifies a document.
    pub fn of(document: Option<&WorkflowDocument>) -> Self {
        match document.and_then(|document| document.definition.as_ref()) {
            None => Self::Missing,
            Some(definition) if definition.nodes.is_keyed() => Self::Keyed,
            Some(_) => Self::Array,
        }
    }
}

/// Converts a workflow document into the editor graph.
pub fn to_editor_shape(document: &WorkflowDocument) -> EditorGraph {
    match document.definition.as_ref() {
        Some(definition) => definition_to_editor_shape(definition),
        None => {
            tracing::debug!(
                target: TRACING_TARGET,
                "workflow has no definition, loading an empty graph",
            );
            EditorGraph::default()
        }
    }
}

/// Converts a definition payload into the editor graph.
pub fn definition_to_editor_shape(definition: &WorkflowDefinition) -> EditorGraph {
    let nodes: Vec<_> = definition
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| editor_node(index, node))
        .collect();

    let edges: Vec<_> = definition.edges.iter().filter_map(editor_edge).collect();

    tracing::debug!(
        target: TRACING_TARGET,
        nodes = nodes.len(),
        edges = edges.len(),
        dropped_edges = definition.edges.len() - edges.len(),
        keyed = definition.nodes.is_keyed(),
        "converted definition to editor graph",
    );

    EditorGraph::new(nodes, edges)
}

fn editor_node(index: usize, node: &WireNode) -> Option<EditorNode> {
    let Some(id) = node.id() else {
        tracing::warn!(
            target: TRACING_TARGET,
            index,
            "dropping definition node without a node id",
        );
        return None;
    };

    let data = NodeData {
        label: node.node_name.clone(),
        node_name: node.display_name().map(str::to_owned),
        node_type: node.node_type.clone(),
        params: node.resolved_params(),
    };

    Some(EditorNode::new(
        id,
        NodeKind::from_type_name(node.node_type.as_deref().unwrap_or_default()),
        node.position.unwrap_or_else(|| grid_position(index)),
        data,
    ))
}

fn editor_edge(edge: &WireEdge) -> Option<EditorEdge> {
    let (Some(id), Some(source), Some(target)) = (edge.id(), edge.source(), edge.target()) else {
        tracing::debug!(
            target: TRACING_TARGET,
            edge_id = edge.id(),
            "dropping definition edge without id, source or target",
        );
        return None;
    };

    let mut editor = EditorEdge::new(id, source, target);
    editor.edge_type = edge.kind().unwrap_or(DEFAULT_EDGE_TYPE).to_owned();
    editor.marker_end = Some(MarkerEnd::arrow_closed());
    Some(editor)
}

/// Converts the editor graph into the canonical update body.
///
/// Node types fall back to the structural kind; edges missing an id or an
/// endpoint are left out. Positions and markers are not part of the wire shape.
pub fn to_wire_shape(
    nodes: &[EditorNode],
    edges: &[EditorEdge],
    workflow_name: impl Into<String>,
) -> WorkflowUpdate {
    let nodes = nodes
        .iter()
        .map(|node| UpdateNode {
            node_id: node.id.clone(),
            node_type: node
                .data
                .node_type
                .as_deref()
                .filter(|node_type| !node_type.is_empty())
                .unwrap_or(node.kind.as_str())
                .to_owned(),
            node_name: node.data.node_name.clone(),
            params: node.data.params.clone(),
        })
        .collect();

    let edges = edges
        .iter()
        .filter(|edge| {
            !edge.id.as_str().is_empty()
                && !edge.source.as_str().is_empty()
                && !edge.target.as_str().is_empty()
        })
        .map(|edge| UpdateEdge {
            edge_id: edge.id.clone(),
            source_node_id: edge.source.clone(),
            target_node_id: edge.target.clone(),
            edge_type: if edge.edge_type.is_empty() {
                DEFAULT_EDGE_TYPE.to_owned()
            } else {
                edge.edge_type.clone()
            },
        })
        .collect();

    WorkflowUpdate {
        workflow_name: workflow_name.into(),
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn document(value: Value) -> WorkflowDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_grid_positions_for_four_nodes() {
        let graph = to_editor_shape(&document(json!({
            "definition": {
                "nodes": [
                    { "nodeId": "a", "nodeType": "trigger" },
                    { "nodeId": "b", "nodeType": "activity" },
                    { "nodeId": "c", "nodeType": "activity" },
                    { "nodeId": "d", "nodeType": "controller" }
                ]
            }
        })));

        let positions: Vec<_> = graph
            .nodes
            .iter()
            .map(|node| (node.position.x, node.position.y))
            .collect();
        assert_eq!(
            positions,
            [(200.0, 100.0), (550.0, 100.0), (900.0, 100.0), (200.0, 300.0)]
        );
    }

    #[test]
    fn test_stored_position_wins_over_grid() {
        let graph = to_editor_shape(&document(json!({
            "definition": {
                "nodes": [{ "nodeId": "a", "position": { "x": 12.5, "y": -4.0 } }]
            }
        })));
        assert_eq!(graph.nodes[0].position, Position::new(12.5, -4.0));
    }

    #[test]
    fn test_node_fields_resolve() {
        let graph = to_editor_shape(&document(json!({
            "definition": {
                "nodes": [{
                    "nodeId": "a1",
                    "nodeType": "Activity",
                    "nodeName": "Send welcome mail",
                    "activityName": "send_email",
                    "nodeParams": { "params": { "to": "ops@example.com" } }
                }, {
                    "nodeId": "x1",
                    "nodeType": "webhook"
                }]
            }
        })));

        let node = &graph.nodes[0];
        assert_eq!(node.kind, NodeKind::Activity);
        assert_eq!(node.data.label.as_deref(), Some("Send welcome mail"));
        assert_eq!(node.node_name(), Some("send_email"));
        assert_eq!(node.data.node_type.as_deref(), Some("Activity"));
        assert_eq!(node.data.params["to"], "ops@example.com");

        assert_eq!(graph.nodes[1].kind, NodeKind::Default);
        assert!(graph.nodes[1].data.params.is_empty());
    }

    #[test]
    fn test_keyed_and_array_nodes_are_equivalent() {
        let nodes = [
            json!({ "nodeId": "t1", "nodeType": "trigger", "params": { "cron": "* * * * *" } }),
            json!({ "nodeId": "a1", "nodeType": "activity", "params": { "url": "https://x" } }),
        ];

        let array = to_editor_shape(&document(json!({
            "definition": { "nodes": nodes.clone() }
        })));
        let keyed = to_editor_shape(&document(json!({
            "definition": { "nodes": { "t1": nodes[0].clone(), "a1": nodes[1].clone() } }
        })));

        let summary = |graph: &EditorGraph| -> Vec<(String, Value)> {
            graph
                .nodes
                .iter()
                .map(|node| (node.id.to_string(), Value::Object(node.data.params.clone())))
                .collect()
        };
        assert_eq!(summary(&array), summary(&keyed));
    }

    #[test]
    fn test_edges_resolve_both_naming_variants() {
        let graph = to_editor_shape(&document(json!({
            "definition": {
                "nodes": [{ "nodeId": "a" }, { "nodeId": "b" }],
                "edges": [
                    { "edgeId": "e1", "sourceNodeId": "a", "targetNodeId": "b" },
                    { "edgeName": "e2", "fromNodeId": "b", "toNodeId": "a", "edgeType": "loop" },
                    { "edgeName": "e3" },
                    { "edgeId": "e4", "sourceNodeId": "a" }
                ]
            }
        })));

        let ids: Vec<_> = graph.edges.iter().map(|edge| edge.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
        assert_eq!(graph.edges[0].edge_type, "default");
        assert_eq!(graph.edges[1].edge_type, "loop");
        assert!(graph.edges.iter().all(|edge| edge.marker_end == Some(MarkerEnd::arrow_closed())));
    }

    #[test]
    fn test_missing_definition_is_empty_graph() {
        let missing = document(json!({ "workflowId": "wf_1" }));
        assert!(to_editor_shape(&missing).is_empty());
        assert_eq!(DefinitionShape::of(Some(&missing)), DefinitionShape::Missing);
        assert_eq!(DefinitionShape::of(None), DefinitionShape::Missing);

        let keyed = document(json!({ "definition": { "nodes": {} } }));
        assert_eq!(DefinitionShape::of(Some(&keyed)), DefinitionShape::Keyed);
    }

    #[test]
    fn test_nodes_without_id_keep_grid_slots() {
        let graph = to_editor_shape(&document(json!({
            "definition": { "nodes": [{ "nodeName": "orphan" }, { "nodeId": "b" }] }
        })));
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].position, grid_position(1));
    }

    #[test]
    fn test_mistyped_node_keeps_its_slot() {
        let graph = to_editor_shape(&document(json!({
            "definition": {
                "nodes": [
                    { "nodeId": "a", "nodeName": 5, "position": { "x": 1 } },
                    "garbage",
                    { "nodeId": "c" }
                ]
            }
        })));

        let ids: Vec<_> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(graph.nodes[0].position, grid_position(0));
        assert_eq!(graph.nodes[0].node_name(), None);
        assert_eq!(graph.nodes[1].position, grid_position(2));
        assert_eq!(graph.nodes[1].position, Position::new(900.0, 100.0));
    }

    #[test]
    fn test_to_wire_shape_falls_back_to_kind() {
        let nodes = vec![
            EditorNode::new("t1", NodeKind::Trigger, Position::default(), NodeData::default()),
            EditorNode::new(
                "a1",
                NodeKind::Activity,
                Position::default(),
                NodeData::new("http", "Activity"),
            ),
        ];
        let mut unnamed = EditorEdge::new("", "t1", "a1");
        unnamed.edge_type.clear();
        let mut untyped = EditorEdge::new("e1", "t1", "a1");
        untyped.edge_type.clear();

        let update = to_wire_shape(&nodes, &[unnamed, untyped], "Workflow");

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "workflowName": "Workflow",
                "nodes": [
                    { "nodeId": "t1", "nodeType": "trigger", "params": {} },
                    { "nodeId": "a1", "nodeType": "Activity", "nodeName": "http", "params": {} }
                ],
                "edges": [
                    { "edgeId": "e1", "sourceNodeId": "t1", "targetNodeId": "a1", "edgeType": "default" }
                ]
            })
        );
    }

    #[test]
    fn test_canonical_round_trip() {
        let definition = json!({
            "nodes": [
                { "nodeId": "t1", "nodeType": "trigger", "nodeName": "cron", "params": { "every": "5m" } },
                { "nodeId": "a1", "nodeType": "activity", "nodeName": "http", "params": { "url": "https://x", "retries": 3 } }
            ],
            "edges": [
                { "edgeId": "e1", "sourceNodeId": "t1", "targetNodeId": "a1", "edgeType": "default" }
            ]
        });

        let graph = to_editor_shape(&document(json!({ "definition": definition.clone() })));
        let update = to_wire_shape(&graph.nodes, &graph.edges, "Workflow");

        let mut expected = definition;
        expected["workflowName"] = json!("Workflow");
        let actual = serde_json::to_value(&update).unwrap();
        assert_eq!(actual.as_object().unwrap().len(), 3);
        assert_eq!(actual["nodes"], expected["nodes"]);
        assert_eq!(actual["edges"], expected["edges"]);
        assert_eq!(actual["workflowName"], "Workflow");
    }
}
