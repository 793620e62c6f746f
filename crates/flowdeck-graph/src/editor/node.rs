//! Canvas node types.

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumString, IntoStaticStr};

/// Unique, immutable identifier of a node on the canvas.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from any string.
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

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Structural node type, which selects the node's renderer and its connection rules.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Debug, strum::Display, AsRefStr, EnumString, IntoStaticStr)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    /// Starts a workflow; never has incoming edges.
    Trigger,
    /// Performs one unit of work.
    Activity,
    /// Controls the flow between other nodes.
    Controller,
    /// Anything the editor has no dedicated renderer for.
    #[default]
    Default,
}

impl NodeKind {
    /// Resolves a service-side node type name, case-insensitively.
    ///
    /// Unknown and empty names fall back to [`NodeKind::Default`].
    pub fn from_type_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "trigger" => Self::Trigger,
            "activity" => Self::Activity,
            "controller" => Self::Controller,
            _ => Self::Default,
        }
    }

    /// Returns the lowercase name used on the canvas.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Returns whether this is a trigger node.
    pub const fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger)
    }
}

impl From<String> for NodeKind {
    fn from(name: String) -> Self {
        Self::from_type_name(&name)
    }
}

/// Position of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display and configuration payload of a canvas node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Text shown on the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Catalog name of the node, which selects its parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    /// Service-side node type, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Parameter values, shaped by the node's schema.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl NodeData {
    /// Creates the payload of a freshly dropped node.
    pub fn new(node_name: impl Into<String>, node_type: impl Into<String>) -> Self {
        let node_name = node_name.into();
        Self {
            label: Some(node_name.clone()),
            node_name: Some(node_name),
            node_type: Some(node_type.into()),
            params: Map::new(),
        }
    }

    /// Sets the parameter values.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// A node on the editor canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    /// Node identifier.
    pub id: NodeId,
    /// Structural type.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Canvas position.
    #[serde(default)]
    pub position: Position,
    /// Display and configuration payload.
    #[serde(default)]
    pub data: NodeData,
}

impl EditorNode {
    /// Creates a new node.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data,
        }
    }

    /// Returns the catalog name of the node, if any.
    pub fn node_name(&self) -> Option<&str> {
        self.data.node_name.as_deref()
    }

    /// Applies a partial update, replacing every field the update carries.
    pub fn apply(&mut self, update: NodeUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(data) = update.data {
            self.data = data;
        }
    }
}

/// Partial node update, shallow-merged into an existing node by id.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    /// Id of the node to update.
    pub id: NodeId,
    /// Replacement structural type.
    pub kind: Option<NodeKind>,
    /// Replacement position.
    pub position: Option<Position>,
    /// Replacement payload; replaces the whole `data` object.
    pub data: Option<NodeData>,
}

impl NodeUpdate {
    /// Creates an empty update for the given node.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            kind: None,
            position: None,
            data: None,
        }
    }

    /// Sets the replacement position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the replacement payload.
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the replacement structural type.
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
