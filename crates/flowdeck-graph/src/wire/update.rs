//! Body of the workflow update request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::editor::{EdgeId, NodeId};

/// Default workflow name sent on save.
pub const DEFAULT_WORKFLOW_NAME: &str = "Workflow";

/// Canonical wire shape written back to the service.
///
/// Always uses the array form and the canonical field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpdate {
    pub workflow_name: String,
    pub nodes: Vec<UpdateNode>,
    pub edges: Vec<UpdateEdge>,
}

/// A node in a [`WorkflowUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNode {
    pub node_id: NodeId,
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// An edge in a [`WorkflowUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEdge {
    pub edge_id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub edge_type: String,
}
