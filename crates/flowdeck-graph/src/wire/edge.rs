//! Service-side edge records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::{lenient, non_empty};

/// An edge as stored in a workflow definition.
///
/// Both the canonical (`edgeId`, `sourceNodeId`, `targetNodeId`) and the legacy
/// (`edgeName`, `fromNodeId`, `toNodeId`) field names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEdge {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_node_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_node_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_node_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub to_node_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub edge_type: Option<String>,
    /// Fields this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireEdge {
    /// Edge id: `edgeId`, then `edgeName`.
    pub fn id(&self) -> Option<&str> {
        non_empty(&self.edge_id).or_else(|| non_empty(&self.edge_name))
    }

    /// Source node id: `sourceNodeId`, then `fromNodeId`.
    pub fn source(&self) -> Option<&str> {
        non_empty(&self.source_node_id).or_else(|| non_empty(&self.from_node_id))
    }

    /// Target node id: `targetNodeId`, then `toNodeId`.
    pub fn target(&self) -> Option<&str> {
        non_empty(&self.target_node_id).or_else(|| non_empty(&self.to_node_id))
    }

    /// Edge type, if set and non-empty.
    pub fn kind(&self) -> Option<&str> {
        non_empty(&self.edge_type)
    }
}
