//! Service-side node records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::TRACING_TARGET;
use crate::editor::Position;

/// A node as stored in a workflow definition.
///
/// Every field is optional because the service has produced several shapes over
/// time; resolution rules live on the accessor methods. A field of the wrong
/// type reads as missing instead of failing the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    /// Node identifier.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_id: Option<String>,
    /// Service-side node type, e.g. `"trigger"`.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<String>,
    /// Node name.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_name: Option<String>,
    /// Catalog name of an activity node, preferred over `node_name`.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_name: Option<String>,
    /// Nested parameter container, `{ "params": { .. } }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_params: Option<Value>,
    /// Flat parameter map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Stored canvas position.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Position>,
    /// Fields this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireNode {
    /// Returns the node id, treating an empty string as missing.
    pub fn id(&self) -> Option<&str> {
        non_empty(&self.node_id)
    }

    /// Returns the catalog name: `activityName`, falling back to `nodeName`.
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.activity_name).or_else(|| non_empty(&self.node_name))
    }

    /// Returns the parameter map: `nodeParams.params`, then `params`, then empty.
    pub fn resolved_params(&self) -> Map<String, Value> {
        let nested = self
            .node_params
            .as_ref()
            .and_then(|container| container.get("params"))
            .and_then(Value::as_object);
        let flat = self.params.as_ref().and_then(Value::as_object);

        nested.or(flat).cloned().unwrap_or_default()
    }
}

/// Reads an optional field, treating a value of the wrong type as missing.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    let parsed = serde_json::from_value(value)
        .inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "ignoring definition field of the wrong type",
            );
        })
        .ok();
    Ok(parsed)
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
