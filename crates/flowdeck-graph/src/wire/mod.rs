//! Workflow service wire model.
//!
//! Keys are camelCase here; the client converts from and to the service's
//! snake_case at the HTTP boundary.
//!
//! Reading is lenient: nodes may come as an array or keyed by id, edges may use
//! the canonical or the legacy endpoint names, and fields of the wrong type read
//! as missing with a warning rather than failing the whole document. Writing always produces
//! the canonical [`WorkflowUpdate`] shape.

mod definition;
mod edge;
mod node;
mod update;

pub use definition::{NodeSet, WorkflowDefinition, WorkflowDocument};
pub use edge::WireEdge;
pub use node::WireNode;
pub use update::{DEFAULT_WORKFLOW_NAME, UpdateEdge, UpdateNode, WorkflowUpdate};
