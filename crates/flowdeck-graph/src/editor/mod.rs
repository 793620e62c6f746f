//! Canvas-side graph model.
//!
//! Serialized field names follow the editor's camelCase conventions, so an
//! [`EditorGraph`] can be written to and read from disk as-is.

mod edge;
mod graph;
mod node;

pub use edge::{DEFAULT_EDGE_TYPE, EdgeBuilder, EdgeId, EditorEdge, MarkerEnd};
pub use graph::EditorGraph;
pub use node::{EditorNode, NodeData, NodeId, NodeKind, NodeUpdate, Position};
