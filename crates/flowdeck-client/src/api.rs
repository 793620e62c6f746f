//! The workflow service contract.

use std::sync::Arc;

use flowdeck_core::{Error, Result};
use flowdeck_graph::schema::NodeSchema;
use flowdeck_graph::wire::{WorkflowDocument, WorkflowUpdate};
use serde_json::Value;

use crate::TRACING_TARGET;
use crate::catalog::{AllNodeTypes, NodeCatalog, NodeCategory};

/// Operations offered by the workflow service.
///
/// Implementations fail with a request error carrying the status text when the
/// service answers with a non-success status, and otherwise return bodies with
/// camelCase keys.
#[async_trait::async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Lists nodes of one category, or every node when `category` is `None`.
    async fn fetch_nodes(&self, category: Option<NodeCategory>) -> Result<NodeCatalog>;

    /// Fetches the parameter schema of a node.
    async fn fetch_node_details(&self, node_name: &str) -> Result<NodeSchema>;

    /// Fetches a workflow document.
    async fn fetch_workflow(&self, workflow_id: &str) -> Result<WorkflowDocument>;

    /// Replaces the definition of a workflow and returns the service's reply.
    async fn update_workflow(&self, workflow_id: &str, update: &WorkflowUpdate) -> Result<Value>;

    /// Fetches the three catalog categories concurrently.
    ///
    /// Fails as a whole when any one fetch fails, wrapping that failure.
    async fn fetch_all_node_types(&self) -> Result<AllNodeTypes> {
        let fetched = futures::try_join!(
            self.fetch_nodes(Some(NodeCategory::Triggers)),
            self.fetch_nodes(Some(NodeCategory::Activities)),
            self.fetch_nodes(Some(NodeCategory::Controllers)),
        );

        let (triggers, activities, controllers) = fetched.map_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "failed to fetch node catalogs",
            );
            Error::aggregate_fetch(error)
        })?;

        Ok(AllNodeTypes {
            triggers,
            activities,
            controllers,
        })
    }
}

#[async_trait::async_trait]
impl<T: WorkflowApi + ?Sized> WorkflowApi for Arc<T> {
    async fn fetch_nodes(&self, category: Option<NodeCategory>) -> Result<NodeCatalog> {
        (**self).fetch_nodes(category).await
    }

    async fn fetch_node_details(&self, node_name: &str) -> Result<NodeSchema> {
        (**self).fetch_node_details(node_name).await
    }

    async fn fetch_workflow(&self, workflow_id: &str) -> Result<WorkflowDocument> {
        (**self).fetch_workflow(workflow_id).await
    }

    async fn update_workflow(&self, workflow_id: &str, update: &WorkflowUpdate) -> Result<Value> {
        (**self).update_workflow(workflow_id, update).await
    }

    async fn fetch_all_node_types(&self) -> Result<AllNodeTypes> {
        (**self).fetch_all_node_types().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use flowdeck_core::ErrorKind;

    use super::*;

    #[derive(Default)]
    struct FlakyCatalog {
        calls: AtomicUsize,
        failing: Option<NodeCategory>,
    }

    #[async_trait::async_trait]
    impl WorkflowApi for FlakyCatalog {
        async fn fetch_nodes(&self, category: Option<NodeCategory>) -> Result<NodeCatalog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match category {
                Some(category) if Some(category) == self.failing => {
                    Err(Error::request("fetch nodes", 500, "Internal Server Error"))
                }
                Some(category) => Ok(NodeCatalog::new([format!("{category}_node")])),
                None => Ok(NodeCatalog::default()),
            }
        }

        async fn fetch_node_details(&self, _node_name: &str) -> Result<NodeSchema> {
            Ok(NodeSchema::default())
        }

        async fn fetch_workflow(&self, _workflow_id: &str) -> Result<WorkflowDocument> {
            Ok(WorkflowDocument::default())
        }

        async fn update_workflow(&self, _id: &str, _update: &WorkflowUpdate) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_fetch_all_node_types() {
        let api = FlakyCatalog::default();
        let all = api.fetch_all_node_types().await.unwrap();

        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(all.triggers.items, ["triggers_node"]);
        assert_eq!(all.activities.items, ["activities_node"]);
        assert_eq!(all.controllers.items, ["controllers_node"]);
    }

    #[tokio::test]
    async fn test_fetch_all_node_types_fails_as_a_whole() {
        let api = Arc::new(FlakyCatalog {
            failing: Some(NodeCategory::Activities),
            ..Default::default()
        });
        let error = api.fetch_all_node_types().await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::AggregateFetch);
        assert_eq!(
            error.to_string(),
            "Failed to fetch all node types: Failed to fetch nodes: Internal Server Error"
        );
    }
}
