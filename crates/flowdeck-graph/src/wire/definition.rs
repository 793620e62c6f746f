//! Workflow documents and their definition payload.

use flowdeck_core::{Error, Result};
use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{WireEdge, WireNode};
use crate::TRACING_TARGET;

/// A workflow as returned by the service.
///
/// Everything but the `definition` payload is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Graph payload; `None` when missing or not an object.
    #[serde(
        default,
        deserialize_with = "lenient_definition",
        skip_serializing_if = "Option::is_none"
    )]
    pub definition: Option<WorkflowDefinition>,
    /// Workflow metadata (id, name, timestamps).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowDocument {
    /// Wraps a definition into a document.
    pub fn new(definition: WorkflowDefinition) -> Self {
        Self {
            definition: Some(definition),
            extra: Map::new(),
        }
    }

    /// Returns the workflow name, if the service sent one.
    pub fn name(&self) -> Option<&str> {
        self.extra.get("workflowName").and_then(Value::as_str)
    }

    /// Returns the definition, or a malformed definition error when it is missing.
    pub fn check(&self) -> Result<&WorkflowDefinition> {
        self.definition
            .as_ref()
            .ok_or_else(|| Error::malformed_definition("workflow has no definition payload"))
    }
}

/// The graph payload of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Nodes, either as an array or keyed by node id.
    #[serde(default)]
    pub nodes: NodeSet,
    /// Edges; anything but an array reads as empty.
    #[serde(default, deserialize_with = "lenient_edges")]
    pub edges: Vec<WireEdge>,
    /// Fields this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Node collection of a definition, in either storage form.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSet {
    /// `nodes: [ {..}, {..} ]`
    List(Vec<WireNode>),
    /// `nodes: { "n1": {..}, "n2": {..} }`, in document order.
    Keyed(Vec<(String, WireNode)>),
}

impl Default for NodeSet {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl NodeSet {
    /// Reads a node collection out of an arbitrary value.
    ///
    /// Every element keeps its place in the sequence, so grid slots do not
    /// shift; elements that are not node objects read as empty nodes. Values
    /// that are neither arrays nor objects read as an empty list.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(parse_node).collect()),
            Value::Object(map) => Self::Keyed(
                map.into_iter()
                    .map(|(key, item)| (key, parse_node(item)))
                    .collect(),
            ),
            Value::Null => Self::default(),
            other => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    found = value_kind(&other),
                    "definition nodes are neither an array nor an object, reading as empty",
                );
                Self::default()
            }
        }
    }

    /// Iterates nodes in sequence order regardless of storage form.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &WireNode> + '_> {
        match self {
            Self::List(nodes) => Box::new(nodes.iter()),
            Self::Keyed(entries) => Box::new(entries.iter().map(|(_, node)| node)),
        }
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        match self {
            Self::List(nodes) => nodes.len(),
            Self::Keyed(entries) => entries.len(),
        }
    }

    /// Returns whether there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether nodes are stored keyed by id.
    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::Keyed(_))
    }
}

impl From<Vec<WireNode>> for NodeSet {
    fn from(nodes: Vec<WireNode>) -> Self {
        Self::List(nodes)
    }
}

impl Serialize for NodeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::List(nodes) => {
                let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
                for node in nodes {
                    seq.serialize_element(node)?;
                }
                seq.end()
            }
            Self::Keyed(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, node) in entries {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for NodeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn parse_node(value: Value) -> WireNode {
    if !value.is_object() {
        tracing::warn!(
            target: TRACING_TARGET,
            found = value_kind(&value),
            "definition node is not an object, reading as empty",
        );
        return WireNode::default();
    }

    serde_json::from_value(value)
        .inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "unreadable definition node, reading as empty",
            );
        })
        .unwrap_or_default()
}

fn parse_edge(value: Value) -> Option<WireEdge> {
    if !value.is_object() {
        tracing::warn!(
            target: TRACING_TARGET,
            found = value_kind(&value),
            "skipping definition edge that is not an object",
        );
        return None;
    }

    serde_json::from_value(value)
        .inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "skipping unreadable definition edge",
            );
        })
        .ok()
}

fn lenient_edges<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<WireEdge>, D::Error> {
    let edges = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(parse_edge).collect(),
        _ => Vec::new(),
    };
    Ok(edges)
}

fn lenient_definition<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<WorkflowDefinition>, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map(Some).map_err(D::Error::custom),
        Value::Null => Ok(None),
        other => {
            tracing::warn!(
                target: TRACING_TARGET,
                found = value_kind(&other),
                "workflow definition is not an object, reading as missing",
            );
            Ok(None)
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use flowdeck_core::ErrorKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_keyed_nodes_keep_document_order() {
        let definition: WorkflowDefinition = serde_json::from_value(json!({
            "nodes": {
                "zeta": { "nodeId": "zeta" },
                "alpha": { "nodeId": "alpha" }
            }
        }))
        .unwrap();

        assert!(definition.nodes.is_keyed());
        let ids: Vec<_> = definition.nodes.iter().filter_map(WireNode::id).collect();
        assert_eq!(ids, ["zeta", "alpha"]);
    }

    #[test]
    fn test_malformed_nodes_keep_their_place() {
        let definition: WorkflowDefinition = serde_json::from_value(json!({
            "nodes": [{ "nodeId": "n1" }, 42, null, { "nodeId": 7 }, { "nodeId": "n2", "nodeName": 5 }],
            "edges": [{ "edgeId": "e1" }, "e2"]
        }))
        .unwrap();

        assert_eq!(definition.nodes.len(), 5);
        let ids: Vec<_> = definition.nodes.iter().map(WireNode::id).collect();
        assert_eq!(ids, [Some("n1"), None, None, None, Some("n2")]);
        assert_eq!(definition.edges.len(), 1);
    }

    #[test]
    fn test_non_collection_fields_read_as_empty() {
        let definition: WorkflowDefinition =
            serde_json::from_value(json!({ "nodes": "oops", "edges": { "e1": {} } })).unwrap();
        assert!(definition.nodes.is_empty());
        assert!(definition.edges.is_empty());
    }

    #[test]
    fn test_missing_definition_is_malformed() {
        let document: WorkflowDocument =
            serde_json::from_value(json!({ "workflowId": "wf_1", "workflowName": "Demo" })).unwrap();
        assert_eq!(document.name(), Some("Demo"));
        assert_eq!(document.check().unwrap_err().kind(), ErrorKind::MalformedDefinition);

        let document: WorkflowDocument =
            serde_json::from_value(json!({ "definition": "not an object" })).unwrap();
        assert!(document.definition.is_none());
    }

    #[test]
    fn test_keyed_nodes_serialize_back_to_map() {
        let value = json!({
            "nodes": { "n1": { "nodeId": "n1", "nodeType": "trigger" } },
            "edges": []
        });
        let definition: WorkflowDefinition = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&definition).unwrap(), value);
    }
}
