//! Prelude module for convenient imports.
//!
//! ```rust
//! use flowdeck_graph::prelude::*;
//! ```

pub use crate::connectivity::{Connection, ConnectionError, ConnectionRules, is_valid_connection};
pub use crate::editor::{
    EdgeId, EditorEdge, EditorGraph, EditorNode, MarkerEnd, NodeData, NodeId, NodeKind, NodeUpdate,
    Position,
};
pub use crate::schema::{NodeSchema, ParamKind, ParamSpec};
pub use crate::transcode::{to_editor_shape, to_wire_shape};
pub use crate::wire::{WorkflowDefinition, WorkflowDocument, WorkflowUpdate};
