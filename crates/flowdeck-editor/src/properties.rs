//! Parameter form of the selected node.
//!
//! The editor keeps a copy of the selected node's params as form values.
//! Edits only touch the form and raise `properties_panel_dirty`; [`save`]
//! merges the form into the node. Whenever the selection or the selected
//! node's params change underneath, the form is reloaded and the flag cleared.
//!
//! [`save`]: PropertiesEditor::save

use flowdeck_core::{Error, Result};
use flowdeck_graph::editor::{EditorNode, NodeId, NodeKind, NodeUpdate};
use flowdeck_graph::schema::{NodeSchema, ParamKind, ParamSpec, humanize};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_PROPERTIES;
use crate::state::WorkflowState;

#[derive(Debug, Clone, Default, PartialEq)]
enum Details {
    /// The selected node has no catalog name, so there is nothing to fetch.
    #[default]
    Idle,
    Loading(String),
    Failed(String),
    Ready(NodeSchema),
}

/// Identity of the node shown in the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHeader {
    pub node_id: NodeId,
    pub node_name: Option<String>,
    /// Structural type, shown as a badge.
    pub kind: NodeKind,
    /// Whether the form holds unsaved edits.
    pub dirty: bool,
}

/// One rendered parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub name: String,
    /// Human readable label, e.g. `Max Retry Count`.
    pub label: String,
    pub kind: ParamKind,
    pub required: bool,
    pub hint: Option<String>,
    /// Current form value; `Null` when unset.
    pub value: Value,
    /// Text shown in the input.
    pub text: String,
    pub read_only: bool,
}

impl FieldView {
    fn new(name: &str, spec: &ParamSpec, value: Option<&Value>) -> Self {
        let value = value.cloned().unwrap_or(Value::Null);
        let text = if spec.kind.is_read_only() {
            match &spec.hint {
                Some(hint) => format!("{hint} (System Managed)"),
                None => "(System Managed)".to_owned(),
            }
        } else {
            display_text(&spec.kind, &value)
        };

        Self {
            name: name.to_owned(),
            label: humanize(name),
            kind: spec.kind.clone(),
            required: spec.required,
            hint: spec.hint.clone(),
            value,
            text,
            read_only: spec.kind.is_read_only(),
        }
    }
}

fn display_text(kind: &ParamKind, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) if matches!(kind, ParamKind::Complex { .. }) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// What the properties panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    /// No node is selected.
    Empty,
    /// The node's schema is being fetched.
    Loading { header: NodeHeader },
    /// The schema could not be fetched.
    Failed { header: NodeHeader, message: String },
    /// The parameter form; `fields` is empty for nodes without parameters.
    Ready {
        header: NodeHeader,
        fields: Vec<FieldView>,
        /// Warning the service attached to the schema.
        warning: Option<String>,
    },
}

/// Form state of the properties panel.
#[derive(Debug, Clone, Default)]
pub struct PropertiesEditor {
    node_id: Option<NodeId>,
    synced_params: Map<String, Value>,
    form: Map<String, Value>,
    details: Details,
}

impl PropertiesEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the node the form belongs to.
    pub fn node_id(&self) -> Option<&NodeId> {
        self.node_id.as_ref()
    }

    /// Current form values.
    pub fn form(&self) -> &Map<String, Value> {
        &self.form
    }

    /// Reloads the form when the selection or the selected node's params changed.
    ///
    /// Returns the node name whose schema should be fetched when the selection
    /// moved to a node that has one.
    pub fn sync(&mut self, state: &mut WorkflowState) -> Option<String> {
        let selected = state.selected_node();
        let node_id = selected.map(|node| node.id.clone());
        let params = selected.map(|node| node.data.params.clone()).unwrap_or_default();
        let node_name = selected
            .and_then(EditorNode::node_name)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        let selection_changed = node_id != self.node_id;
        if !selection_changed && params == self.synced_params {
            return None;
        }

        tracing::trace!(
            target: TRACING_TARGET_PROPERTIES,
            selection_changed,
            params = params.len(),
            "reloading form",
        );

        self.form = params.clone();
        self.synced_params = params;
        self.node_id = node_id;
        state.set_properties_panel_dirty(false);

        if !selection_changed {
            return None;
        }

        match node_name {
            Some(name) => {
                self.details = Details::Loading(name.clone());
                Some(name)
            }
            None => {
                self.details = Details::Idle;
                None
            }
        }
    }

    /// Applies a schema fetch for `node_name`.
    ///
    /// Returns `false`, leaving the panel alone, when the panel is no longer
    /// waiting for that node.
    pub fn set_details(&mut self, node_name: &str, result: Result<NodeSchema, &Error>) -> bool {
        if !matches!(&self.details, Details::Loading(pending) if pending == node_name) {
            tracing::debug!(
                target: TRACING_TARGET_PROPERTIES,
                node_name,
                "ignoring schema for a node that is no longer shown",
            );
            return false;
        }

        self.details = match result {
            Ok(schema) => Details::Ready(schema),
            Err(error) => Details::Failed(error.to_string()),
        };
        true
    }

    /// Sets a form value and marks the panel dirty.
    ///
    /// Returns `false` when no node is selected.
    pub fn edit_field(&mut self, state: &mut WorkflowState, name: impl Into<String>, value: Value) -> bool {
        if self.node_id.is_none() {
            return false;
        }

        self.form.insert(name.into(), value);
        state.set_properties_panel_dirty(true);
        true
    }

    /// Sets a complex parameter from raw JSON text.
    ///
    /// Unparsable text changes nothing and is reported as invalid input.
    pub fn edit_complex(&mut self, state: &mut WorkflowState, name: impl Into<String>, raw: &str) -> Result<()> {
        let name = name.into();
        let value: Value = serde_json::from_str(raw).map_err(|error| {
            Error::invalid_input()
                .with_message(format!("`{name}` is not valid JSON: {error}"))
                .with_source(error)
        })?;

        self.edit_field(state, name, value);
        Ok(())
    }

    /// Merges the form over the selected node's params and clears the dirty flag.
    ///
    /// Returns `false` when no node is selected.
    pub fn save(&mut self, state: &mut WorkflowState) -> bool {
        let Some(node) = state.selected_node() else {
            return false;
        };

        let id = node.id.clone();
        let mut data = node.data.clone();
        data.params.extend(self.form.clone());

        tracing::debug!(
            target: TRACING_TARGET_PROPERTIES,
            node_id = %id,
            params = data.params.len(),
            "saving node params",
        );

        state.update_node(NodeUpdate::new(id).with_data(data));
        state.set_properties_panel_dirty(false);
        true
    }

    /// Discards the form and clears the selection.
    pub fn close(&mut self, state: &mut WorkflowState) {
        state.set_properties_panel_dirty(false);
        state.select_node(None);
        self.sync(state);
    }

    /// Renders the panel for the current selection.
    pub fn view(&self, state: &WorkflowState) -> PanelView {
        let Some(node) = state.selected_node() else {
            return PanelView::Empty;
        };

        let header = NodeHeader {
            node_id: node.id.clone(),
            node_name: node.node_name().map(str::to_owned),
            kind: node.kind,
            dirty: state.properties_panel_dirty(),
        };

        match &self.details {
            Details::Loading(_) => PanelView::Loading { header },
            Details::Failed(message) => PanelView::Failed {
                header,
                message: message.clone(),
            },
            Details::Idle => PanelView::Ready {
                header,
                fields: Vec::new(),
                warning: None,
            },
            Details::Ready(schema) => PanelView::Ready {
                header,
                fields: schema
                    .params
                    .iter()
                    .map(|(name, spec)| FieldView::new(name, spec, self.form.get(name)))
                    .collect(),
                warning: schema.error.clone(),
            },
        }
    }
}
