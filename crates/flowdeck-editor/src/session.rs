//! One open workflow, wired to the service.

use flowdeck_client::query::{QueryClient, RequestTracker, Ticket};
use flowdeck_client::{AllNodeTypes, WorkflowApi};
use flowdeck_core::{Error, Result};
use flowdeck_graph::connectivity::{Connection, ConnectionRules};
use flowdeck_graph::editor::{EdgeId, NodeId, Position};
use flowdeck_graph::schema::NodeSchema;
use flowdeck_graph::transcode::{DefinitionShape, to_editor_shape, to_wire_shape};
use flowdeck_graph::wire::{DEFAULT_WORKFLOW_NAME, WorkflowDocument};
use serde_json::Value;

use crate::TRACING_TARGET;
use crate::palette::NodePalette;
use crate::properties::{PanelView, PropertiesEditor};
use crate::state::WorkflowState;
use crate::surface::{EdgeChange, EditorSurface, NodeChange};

/// Request key of the properties panel's schema fetch.
const NODE_DETAILS_REQUEST: &str = "properties/nodeDetails";

/// Hint shown on the disabled save button.
pub const SAVE_BLOCKED_HINT: &str = "Please save changes in the Properties Panel first";

/// Header bar contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView<'a> {
    pub workflow_id: &'a str,
    /// `Unsaved changes` or `All changes saved`.
    pub status: &'static str,
    pub save_enabled: bool,
    /// Why saving is disabled, if it is.
    pub save_hint: Option<&'static str>,
}

/// A schema fetch started for the properties panel.
///
/// Only the most recently started request is applied; see
/// [`EditorSession::apply_node_details`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsRequest {
    ticket: Ticket,
    node_name: String,
}

impl DetailsRequest {
    /// Catalog name whose schema is requested.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }
}

/// Editor state, canvas, panels and the service behind them.
pub struct EditorSession<A> {
    queries: QueryClient<A>,
    tracker: RequestTracker,
    state: WorkflowState,
    surface: EditorSurface,
    properties: PropertiesEditor,
    palette: NodePalette,
    pending_details: Option<String>,
}

impl<A> std::fmt::Debug for EditorSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.state)
            .field("pending_details", &self.pending_details)
            .finish_non_exhaustive()
    }
}

impl<A: WorkflowApi> EditorSession<A> {
    /// Opens a session on `workflow_id` with default caching.
    pub fn new(api: A, workflow_id: impl Into<String>) -> Self {
        Self::with_queries(QueryClient::new(api), workflow_id)
    }

    /// Opens a session on `workflow_id` over an existing query client.
    pub fn with_queries(queries: QueryClient<A>, workflow_id: impl Into<String>) -> Self {
        Self {
            queries,
            tracker: RequestTracker::new(),
            state: WorkflowState::new(workflow_id),
            surface: EditorSurface::new(),
            properties: PropertiesEditor::new(),
            palette: NodePalette::new(),
            pending_details: None,
        }
    }

    /// Replaces the connection rules of the canvas.
    pub fn with_rules(mut self, rules: ConnectionRules) -> Self {
        self.surface = EditorSurface::with_rules(rules);
        self.refresh();
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn surface(&self) -> &EditorSurface {
        &self.surface
    }

    pub fn properties(&self) -> &PropertiesEditor {
        &self.properties
    }

    pub fn palette(&self) -> &NodePalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut NodePalette {
        &mut self.palette
    }

    pub fn queries(&self) -> &QueryClient<A> {
        &self.queries
    }

    /// Fetches the workflow and replaces the graph with it.
    pub async fn load_workflow(&mut self) -> Result<DefinitionShape> {
        let document = self.queries.workflow(self.state.workflow_id()).await?;
        Ok(self.apply_document(&document))
    }

    /// Switches to another workflow and loads it.
    pub async fn open_workflow(&mut self, workflow_id: impl Into<String>) -> Result<DefinitionShape> {
        self.state.open(workflow_id);
        self.refresh();
        self.load_workflow().await
    }

    /// Fetches all node catalogs into the palette.
    pub async fn load_palette(&mut self) -> Result<()> {
        self.palette.reset();
        let catalogs = self.queries.all_nodes().await;
        self.apply_catalogs(catalogs)
    }

    /// Loads the workflow and the palette concurrently.
    ///
    /// Both results are applied even when the other one failed.
    pub async fn load(&mut self) -> Result<DefinitionShape> {
        self.palette.reset();

        let (document, catalogs) = futures::join!(
            self.queries.workflow(self.state.workflow_id()),
            self.queries.all_nodes(),
        );

        let catalogs = self.apply_catalogs(catalogs);
        let shape = self.apply_document(&document?);
        catalogs?;
        Ok(shape)
    }

    fn apply_document(&mut self, document: &WorkflowDocument) -> DefinitionShape {
        let shape = DefinitionShape::of(Some(document));
        if shape == DefinitionShape::Missing {
            tracing::warn!(
                target: TRACING_TARGET,
                workflow_id = %self.state.workflow_id(),
                "workflow has no definition, starting from an empty graph",
            );
        }

        self.state.load(to_editor_shape(document));
        self.refresh();
        shape
    }

    fn apply_catalogs(&mut self, catalogs: Result<AllNodeTypes>) -> Result<()> {
        match catalogs {
            Ok(all) => {
                self.palette.set_catalogs(Ok(all));
                Ok(())
            }
            Err(error) => {
                self.palette.set_catalogs(Err(&error));
                Err(error)
            }
        }
    }

    /// Re-syncs the canvas and the properties form with the state.
    fn refresh(&mut self) {
        self.surface.sync(&self.state);

        let shown = self.properties.node_id().cloned();
        if let Some(node_name) = self.properties.sync(&mut self.state) {
            self.pending_details = Some(node_name);
        } else if self.properties.node_id() != shown.as_ref() {
            self.pending_details = None;
        }
    }

    /// Applies canvas node changes.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        self.surface.on_nodes_change(&mut self.state, changes);
        self.refresh();
    }

    /// Applies canvas edge changes.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        self.surface.on_edges_change(&mut self.state, changes);
        self.refresh();
    }

    /// Connects two nodes; see [`EditorSurface::on_connect`].
    pub fn connect(&mut self, connection: Connection) -> Result<Option<EdgeId>> {
        let edge = self.surface.on_connect(&mut self.state, connection)?;
        self.refresh();
        Ok(edge)
    }

    /// Adds a node from a palette drop; see [`EditorSurface::on_drop`].
    pub fn drop_node(&mut self, payload: &str, position: Position) -> Result<Option<NodeId>> {
        let node = self.surface.on_drop(&mut self.state, payload, position)?;
        self.refresh();
        Ok(node)
    }

    /// Removes a node and its edges.
    pub fn delete_node(&mut self, id: &NodeId) {
        self.state.delete_node(id);
        self.refresh();
    }

    /// Selects a node and fetches its parameter schema.
    pub async fn select_node(&mut self, id: NodeId) -> Result<()> {
        match self.begin_select(id) {
            Some(request) => self.finish_request(request).await,
            None => Ok(()),
        }
    }

    /// Selects a node without waiting for its schema.
    ///
    /// Returns the schema fetch to run when the panel needs one. Starting it
    /// supersedes every request started before.
    pub fn begin_select(&mut self, id: NodeId) -> Option<DetailsRequest> {
        self.surface.on_node_click(&mut self.state, id);
        self.refresh();
        self.request_node_details()
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.surface.on_pane_click(&mut self.state);
        self.refresh();
    }

    /// Fetches the schema the properties panel is waiting for, if any.
    pub async fn load_node_details(&mut self) -> Result<()> {
        match self.request_node_details() {
            Some(request) => self.finish_request(request).await,
            None => Ok(()),
        }
    }

    /// Starts the schema fetch the properties panel is waiting for, if any.
    pub fn request_node_details(&mut self) -> Option<DetailsRequest> {
        let node_name = self.pending_details.take()?;
        let ticket = self.tracker.issue(NODE_DETAILS_REQUEST);
        Some(DetailsRequest { ticket, node_name })
    }

    /// Runs a schema fetch through the query cache.
    pub async fn fetch_node_details(&self, request: &DetailsRequest) -> Result<NodeSchema> {
        self.queries.node_details(&request.node_name).await
    }

    /// Applies the outcome of a schema fetch.
    ///
    /// A response to a request that was superseded by a newer one is dropped,
    /// errors included, and yields `Ok`.
    pub fn apply_node_details(
        &mut self,
        request: DetailsRequest,
        details: Result<NodeSchema>,
    ) -> Result<()> {
        if !self.tracker.complete(&request.ticket) {
            return Ok(());
        }

        match details {
            Ok(schema) => {
                self.properties.set_details(&request.node_name, Ok(schema));
                Ok(())
            }
            Err(error) => {
                self.properties.set_details(&request.node_name, Err(&error));
                Err(error)
            }
        }
    }

    async fn finish_request(&mut self, request: DetailsRequest) -> Result<()> {
        let details = self.fetch_node_details(&request).await;
        self.apply_node_details(request, details)
    }

    /// Sets a parameter in the properties form.
    pub fn edit_param(&mut self, name: impl Into<String>, value: Value) -> bool {
        self.properties.edit_field(&mut self.state, name, value)
    }

    /// Sets a complex parameter from raw JSON text.
    pub fn edit_complex_param(&mut self, name: impl Into<String>, raw: &str) -> Result<()> {
        self.properties.edit_complex(&mut self.state, name, raw)
    }

    /// Writes the properties form into the selected node.
    pub fn save_properties(&mut self) -> bool {
        let saved = self.properties.save(&mut self.state);
        self.refresh();
        saved
    }

    /// Closes the properties panel, discarding its edits.
    pub fn close_properties(&mut self) {
        self.properties.close(&mut self.state);
        self.refresh();
    }

    /// Renders the properties panel.
    pub fn properties_view(&self) -> PanelView {
        self.properties.view(&self.state)
    }

    /// Renders the header bar.
    pub fn header(&self) -> HeaderView<'_> {
        let save_enabled = self.state.can_save();
        HeaderView {
            workflow_id: self.state.workflow_id(),
            status: self.state.status_text(),
            save_enabled,
            save_hint: (!save_enabled).then_some(SAVE_BLOCKED_HINT),
        }
    }

    /// Saves the whole graph.
    ///
    /// Refused while the properties panel holds unsaved edits. A failed save
    /// keeps every local edit and the unsaved flag.
    pub async fn save(&mut self) -> Result<Value> {
        if !self.state.can_save() {
            tracing::warn!(
                target: TRACING_TARGET,
                workflow_id = %self.state.workflow_id(),
                "save refused while the properties panel has unsaved changes",
            );
            return Err(Error::save_blocked().with_message(SAVE_BLOCKED_HINT));
        }

        let update = to_wire_shape(self.state.nodes(), self.state.edges(), DEFAULT_WORKFLOW_NAME);
        let workflow_id = self.state.workflow_id().to_owned();

        match self.queries.update_workflow(&workflow_id, &update).await {
            Ok(reply) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    workflow_id = %workflow_id,
                    nodes = update.nodes.len(),
                    edges = update.edges.len(),
                    "saved workflow",
                );
                self.state.mark_saved();
                Ok(reply)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    workflow_id = %workflow_id,
                    error = %error,
                    "failed to save workflow",
                );
                Err(error)
            }
        }
    }
}
