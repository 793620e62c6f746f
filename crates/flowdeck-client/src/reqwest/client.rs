//! Reqwest-based implementation of [`WorkflowApi`].

use std::sync::Arc;

use flowdeck_core::case::KeyCase;
use flowdeck_graph::schema::NodeSchema;
use flowdeck_graph::wire::{WorkflowDocument, WorkflowUpdate};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{Error, ReqwestConfig, TRACING_TARGET};
use crate::api::WorkflowApi;
use crate::catalog::{NodeCatalog, NodeCategory};

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    base_url: Url,
    config: ReqwestConfig,
}

/// HTTP client of the workflow service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ReqwestConfig) -> crate::Result<Self> {
        let base_url = config.parsed_base_url()?;
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %base_url,
            timeout_ms = timeout.as_millis(),
            key_case = %config.request_key_case,
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(&user_agent)
            .build()
            .map_err(Error::from)?;

        let inner = ReqwestClientInner {
            http,
            base_url,
            config,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Builds an endpoint URL from path segments; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> crate::Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> crate::Result<Response> {
        tracing::debug!(
            target: TRACING_TARGET,
            method = %method,
            url = %url,
            "Sending request"
        );

        let mut request = self.inner.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(Error::from)?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                operation,
                "Request failed"
            );
            return Err(crate::Error::request(
                operation,
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        Ok(response)
    }

    /// Reads a JSON body, rewrites its keys to camelCase and parses it.
    async fn read<T: DeserializeOwned>(response: Response) -> crate::Result<T> {
        let bytes = response.bytes().await.map_err(Error::from)?;
        let raw: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(Error::from)?
        };

        let converted = KeyCase::Camel.convert(&raw);
        Ok(serde_json::from_value(converted).map_err(Error::from)?)
    }

    async fn get<T: DeserializeOwned>(&self, operation: &str, url: Url) -> crate::Result<T> {
        let response = self.send(operation, Method::GET, url, None).await?;
        Self::read(response).await
    }
}

#[async_trait::async_trait]
impl WorkflowApi for ReqwestClient {
    async fn fetch_nodes(&self, category: Option<NodeCategory>) -> crate::Result<NodeCatalog> {
        let mut url = self.endpoint(&["nodes"])?;
        if let Some(category) = category {
            url.query_pairs_mut().append_pair("node_type", category.as_str());
        }

        self.get("fetch nodes", url).await
    }

    async fn fetch_node_details(&self, node_name: &str) -> crate::Result<NodeSchema> {
        let url = self.endpoint(&["nodeDetails", node_name])?;
        self.get("fetch node details", url).await
    }

    async fn fetch_workflow(&self, workflow_id: &str) -> crate::Result<WorkflowDocument> {
        let url = self.endpoint(&["workflows", workflow_id])?;
        self.get("fetch workflow", url).await
    }

    async fn update_workflow(
        &self,
        workflow_id: &str,
        update: &WorkflowUpdate,
    ) -> crate::Result<Value> {
        let url = self.endpoint(&["workflow", "update", workflow_id])?;

        let body = serde_json::to_value(update).map_err(Error::from)?;
        let body = match self.config().request_key_case {
            KeyCase::Camel => body,
            KeyCase::Snake => KeyCase::Snake.convert(&body),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            workflow_id,
            nodes = update.nodes.len(),
            edges = update.edges.len(),
            "Updating workflow"
        );

        let response = self
            .send("update workflow", Method::PUT, url, Some(body))
            .await?;
        Self::read(response).await
    }
}
