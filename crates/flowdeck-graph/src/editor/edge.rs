//! Canvas edge types.

use derive_builder::Builder;
use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};

use super::NodeId;

/// Edge type used when neither side specifies one.
pub const DEFAULT_EDGE_TYPE: &str = "default";

/// Unique identifier of an edge on the canvas.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Creates an edge id from any string.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for EdgeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EdgeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EdgeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Arrow head drawn at the target end of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerEnd {
    /// Marker shape name.
    #[serde(rename = "type")]
    pub kind: String,
}

impl MarkerEnd {
    /// The closed arrow every editor edge carries.
    pub fn arrow_closed() -> Self {
        Self {
            kind: "arrowclosed".to_owned(),
        }
    }
}

impl Default for MarkerEnd {
    fn default() -> Self {
        Self::arrow_closed()
    }
}

/// A directed edge on the editor canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(
    name = "EdgeBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct EditorEdge {
    /// Edge identifier.
    pub id: EdgeId,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Edge type, `"default"` unless the service says otherwise.
    #[serde(rename = "type", default = "default_edge_type")]
    #[builder(default = "DEFAULT_EDGE_TYPE.to_owned()")]
    pub edge_type: String,
    /// Arrow head marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default = "Some(MarkerEnd::arrow_closed())")]
    pub marker_end: Option<MarkerEnd>,
    /// Handle on the source node the edge leaves from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub source_handle: Option<String>,
    /// Handle on the target node the edge enters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub target_handle: Option<String>,
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_owned()
}

impl EdgeBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.id.as_ref().is_none_or(|id| id.as_str().is_empty()) {
            return Err("id is required".into());
        }
        if self.source.as_ref().is_none_or(|id| id.as_str().is_empty()) {
            return Err("source is required".into());
        }
        if self.target.as_ref().is_none_or(|id| id.as_str().is_empty()) {
            return Err("target is required".into());
        }
        Ok(())
    }
}

impl EditorEdge {
    /// Creates a default-typed edge with an arrow-closed marker.
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: DEFAULT_EDGE_TYPE.to_owned(),
            marker_end: Some(MarkerEnd::arrow_closed()),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Returns a builder for creating an edge.
    pub fn builder() -> EdgeBuilder {
        EdgeBuilder::default()
    }

    /// Returns whether the edge touches the given node at either end.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}
