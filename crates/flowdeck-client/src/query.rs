//! Query caching over a [`WorkflowApi`].
//!
//! Results are cached per query key and served while fresh. Node catalogs stay
//! fresh for five minutes, node details for ten; workflows are refetched every
//! time unless configured otherwise. A successful update invalidates the
//! workflow it wrote.
//!
//! Responses that may be superseded by a newer request for the same key (a
//! rapid reselection in the properties panel, say) are guarded with
//! [`RequestTracker`] tickets: only the latest ticket for a key is current.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use flowdeck_core::{Error, Result};
use flowdeck_graph::schema::NodeSchema;
use flowdeck_graph::wire::{WorkflowDocument, WorkflowUpdate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::TRACING_TARGET_QUERY;
use crate::api::WorkflowApi;
use crate::catalog::{AllNodeTypes, NodeCatalog, NodeCategory};

/// Default stale time of node catalogs: 5 minutes.
pub const DEFAULT_NODES_STALE_SECS: u64 = 5 * 60;

/// Default stale time of node details: 10 minutes.
pub const DEFAULT_NODE_DETAILS_STALE_SECS: u64 = 10 * 60;

/// Stale times of cached queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How long a node catalog is served from cache.
    pub nodes_stale_time: Duration,
    /// How long node details are served from cache.
    pub node_details_stale_time: Duration,
    /// How long a workflow is served from cache; zero disables caching.
    pub workflow_stale_time: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            nodes_stale_time: Duration::from_secs(DEFAULT_NODES_STALE_SECS),
            node_details_stale_time: Duration::from_secs(DEFAULT_NODE_DETAILS_STALE_SECS),
            workflow_stale_time: Duration::ZERO,
        }
    }
}

/// Identity of a cached query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A node catalog; `None` is all three categories together.
    Nodes(Option<NodeCategory>),
    /// Details of one node.
    NodeDetails(String),
    /// One workflow.
    Workflow(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nodes(Some(category)) => write!(f, "nodes/{category}"),
            Self::Nodes(None) => f.write_str("nodes/all"),
            Self::NodeDetails(name) => write!(f, "nodeDetails/{name}"),
            Self::Workflow(id) => write!(f, "workflow/{id}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Cached {
    Catalog(NodeCatalog),
    AllNodeTypes(AllNodeTypes),
    Schema(NodeSchema),
    Workflow(WorkflowDocument),
}

#[derive(Debug)]
struct Entry {
    value: Cached,
    fetched_at: Instant,
}

/// Caching front of a [`WorkflowApi`].
pub struct QueryClient<A> {
    api: A,
    config: QueryConfig,
    cache: RwLock<HashMap<QueryKey, Entry>>,
}

impl<A> fmt::Debug for QueryClient<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<A: WorkflowApi> QueryClient<A> {
    /// Wraps an API with the default stale times.
    pub fn new(api: A) -> Self {
        Self::with_config(api, QueryConfig::default())
    }

    /// Wraps an API with custom stale times.
    pub fn with_config(api: A, config: QueryConfig) -> Self {
        Self {
            api,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the wrapped API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the stale times in use.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// One catalog category.
    pub async fn nodes(&self, category: NodeCategory) -> Result<NodeCatalog> {
        let key = QueryKey::Nodes(Some(category));
        if let Some(Cached::Catalog(catalog)) =
            self.fresh(&key, self.config.nodes_stale_time).await
        {
            return Ok(catalog);
        }

        let catalog = self.api.fetch_nodes(Some(category)).await?;
        self.store(key, Cached::Catalog(catalog.clone())).await;
        Ok(catalog)
    }

    /// All three catalog categories.
    pub async fn all_nodes(&self) -> Result<AllNodeTypes> {
        let key = QueryKey::Nodes(None);
        if let Some(Cached::AllNodeTypes(all)) =
            self.fresh(&key, self.config.nodes_stale_time).await
        {
            return Ok(all);
        }

        let all = self.api.fetch_all_node_types().await?;
        self.store(key, Cached::AllNodeTypes(all.clone())).await;
        Ok(all)
    }

    /// Parameter schema of one node; an empty name is rejected without a request.
    pub async fn node_details(&self, node_name: &str) -> Result<NodeSchema> {
        if node_name.is_empty() {
            return Err(Error::invalid_input().with_message("node name is empty"));
        }

        let key = QueryKey::NodeDetails(node_name.to_owned());
        if let Some(Cached::Schema(schema)) =
            self.fresh(&key, self.config.node_details_stale_time).await
        {
            return Ok(schema);
        }

        let schema = self.api.fetch_node_details(node_name).await?;
        self.store(key, Cached::Schema(schema.clone())).await;
        Ok(schema)
    }

    /// One workflow document.
    pub async fn workflow(&self, workflow_id: &str) -> Result<WorkflowDocument> {
        if workflow_id.is_empty() {
            return Err(Error::invalid_input().with_message("workflow id is empty"));
        }

        let key = QueryKey::Workflow(workflow_id.to_owned());
        if let Some(Cached::Workflow(document)) =
            self.fresh(&key, self.config.workflow_stale_time).await
        {
            return Ok(document);
        }

        let document = self.api.fetch_workflow(workflow_id).await?;
        if !self.config.workflow_stale_time.is_zero() {
            self.store(key, Cached::Workflow(document.clone())).await;
        }
        Ok(document)
    }

    /// Writes a workflow and invalidates its cached copy on success.
    pub async fn update_workflow(&self, workflow_id: &str, update: &WorkflowUpdate) -> Result<Value> {
        let reply = self.api.update_workflow(workflow_id, update).await?;
        self.invalidate(&QueryKey::Workflow(workflow_id.to_owned())).await;
        Ok(reply)
    }

    /// Drops one cached query.
    pub async fn invalidate(&self, key: &QueryKey) {
        if self.cache.write().await.remove(key).is_some() {
            tracing::debug!(target: TRACING_TARGET_QUERY, key = %key, "invalidated query");
        }
    }

    /// Drops every cached query.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    async fn fresh(&self, key: &QueryKey, stale_time: Duration) -> Option<Cached> {
        let cache = self.cache.read().await;
        let entry = cache.get(key)?;
        let age = entry.fetched_at.elapsed();

        if age < stale_time {
            tracing::trace!(target: TRACING_TARGET_QUERY, key = %key, age_ms = age.as_millis(), "cache hit");
            Some(entry.value.clone())
        } else {
            tracing::trace!(target: TRACING_TARGET_QUERY, key = %key, "cache entry is stale");
            None
        }
    }

    async fn store(&self, key: QueryKey, value: Cached) {
        let entry = Entry {
            value,
            fetched_at: Instant::now(),
        };
        self.cache.write().await.insert(key, entry);
    }
}

/// Proof that a request was issued for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    id: u64,
}

impl Ticket {
    /// Key the ticket was issued for.
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Latest-request-wins bookkeeping.
///
/// The owner issues a ticket when a request starts and completes it when the
/// response arrives; only the newest ticket per key completes successfully.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    latest: HashMap<String, u64>,
}

impl RequestTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for `key`, superseding every earlier ticket for it.
    pub fn issue(&mut self, key: impl Into<String>) -> Ticket {
        let key = key.into();
        let id = self.next_id;
        self.next_id += 1;
        self.latest.insert(key.clone(), id);
        Ticket { key, id }
    }

    /// Returns whether the ticket is still the latest for its key.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.id)
    }

    /// Retires a ticket; returns `true` when its response should be applied.
    pub fn complete(&mut self, ticket: &Ticket) -> bool {
        if self.is_current(ticket) {
            self.latest.remove(&ticket.key);
            true
        } else {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                key = %ticket.key,
                "discarding superseded response",
            );
            false
        }
    }
}
