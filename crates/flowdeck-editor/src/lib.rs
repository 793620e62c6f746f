#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod palette;
pub mod properties;
pub mod session;
pub mod state;
pub mod surface;

pub use palette::{NodePalette, PaletteSection, PaletteStatus};
pub use properties::{FieldView, NodeHeader, PanelView, PropertiesEditor};
pub use session::{DetailsRequest, EditorSession, HeaderView};
pub use state::{DEFAULT_WORKFLOW_ID, WorkflowState};
pub use surface::{DropPayload, EdgeChange, EditorSurface, NodeChange};

/// Tracing target for editor session operations.
pub const TRACING_TARGET: &str = "flowdeck_editor";

/// Tracing target for workflow state changes.
pub const TRACING_TARGET_STATE: &str = "flowdeck_editor::state";

/// Tracing target for canvas interactions.
pub const TRACING_TARGET_SURFACE: &str = "flowdeck_editor::surface";

/// Tracing target for the properties editor.
pub const TRACING_TARGET_PROPERTIES: &str = "flowdeck_editor::properties";
