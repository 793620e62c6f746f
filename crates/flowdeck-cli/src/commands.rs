//! Subcommand implementations.

use std::fs;
use std::path::Path;

use anyhow::Context;
use flowdeck_client::WorkflowApi;
use flowdeck_client::reqwest::ReqwestClient;
use flowdeck_core::case::KeyCase;
use flowdeck_editor::EditorSession;
use flowdeck_graph::prelude::{Connection, EditorGraph, is_valid_connection};
use flowdeck_graph::schema::{NodeSchema, ParamKind, humanize};
use flowdeck_graph::transcode::{
    DefinitionShape, definition_to_editor_shape, to_editor_shape, to_wire_shape,
};
use flowdeck_graph::wire::{DEFAULT_WORKFLOW_NAME, WorkflowDefinition, WorkflowDocument};
use serde_json::{Value, json};

use crate::TRACING_TARGET_COMMAND;
use crate::config::{Cli, Command};

/// Runs the selected subcommand and returns what it prints.
pub async fn execute(cli: &Cli) -> anyhow::Result<Value> {
    match &cli.command {
        Command::Nodes {
            category: Some(category),
        } => {
            let catalog = client(cli)?.fetch_nodes(Some(*category)).await?;
            Ok(serde_json::to_value(catalog)?)
        }
        Command::Nodes { category: None } => {
            let all = client(cli)?.fetch_all_node_types().await?;
            Ok(serde_json::to_value(all)?)
        }
        Command::Node { name } => {
            let schema = client(cli)?.fetch_node_details(name).await?;
            Ok(describe_schema(name, &schema))
        }
        Command::Show => {
            let mut session = EditorSession::new(client(cli)?, cli.workflow_id.as_str());
            session
                .load_workflow()
                .await
                .with_context(|| format!("failed to load workflow `{}`", cli.workflow_id))?;
            Ok(serde_json::to_value(session.state().graph())?)
        }
        Command::Push { file } => {
            let graph = read_graph(file)?;
            check_graph(&graph)?;

            let update = to_wire_shape(&graph.nodes, &graph.edges, DEFAULT_WORKFLOW_NAME);
            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                workflow_id = %cli.workflow_id,
                nodes = update.nodes.len(),
                edges = update.edges.len(),
                "pushing workflow",
            );

            let reply = client(cli)?
                .update_workflow(&cli.workflow_id, &update)
                .await
                .with_context(|| format!("failed to push workflow `{}`", cli.workflow_id))?;
            Ok(reply)
        }
        Command::Convert { file } => {
            let graph = convert_file(file)?;
            Ok(serde_json::to_value(graph)?)
        }
    }
}

fn client(cli: &Cli) -> anyhow::Result<ReqwestClient> {
    ReqwestClient::new(cli.client.clone()).context("failed to create client")
}

/// Renders a node schema as a list of form field descriptions.
pub fn describe_schema(node_name: &str, schema: &NodeSchema) -> Value {
    let params: Vec<Value> = schema
        .params
        .iter()
        .map(|(name, spec)| {
            let mut field = json!({
                "name": name,
                "label": humanize(name),
                "type": spec.kind.type_name(),
                "required": spec.required,
                "readOnly": spec.kind.is_read_only(),
            });
            if let Some(hint) = &spec.hint {
                field["hint"] = json!(hint);
            }
            if let ParamKind::Dropdown { allowed_values } = &spec.kind {
                field["allowedValues"] = json!(allowed_values);
            }
            field
        })
        .collect();

    json!({
        "nodeName": node_name,
        "params": params,
        "warning": schema.error,
    })
}

/// Reads an editor graph from a JSON file.
pub fn read_graph(path: &Path) -> anyhow::Result<EditorGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("`{}` is not an editor graph", path.display()))
}

/// Rejects graphs with edges into trigger nodes; dangling edges are only logged.
pub fn check_graph(graph: &EditorGraph) -> anyhow::Result<()> {
    for edge in &graph.edges {
        let connection = Connection::new(edge.source.clone(), edge.target.clone());
        anyhow::ensure!(
            is_valid_connection(&connection, &graph.nodes),
            "edge `{}` targets trigger node `{}`",
            edge.id,
            edge.target,
        );
    }

    for edge in graph.dangling_edges() {
        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            edge_id = %edge.id,
            "edge references a node that does not exist",
        );
    }

    Ok(())
}

/// Converts a stored workflow (or a bare definition) into an editor graph.
///
/// Keys are normalized to camelCase first, so raw service payloads work as is.
pub fn convert_file(path: &Path) -> anyhow::Result<EditorGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let raw: Value = serde_json::from_str(&content)
        .with_context(|| format!("`{}` is not valid JSON", path.display()))?;
    let value = KeyCase::Camel.convert(&raw);

    if value.get("definition").is_some() {
        let document: WorkflowDocument = serde_json::from_value(value)?;
        tracing::debug!(
            target: TRACING_TARGET_COMMAND,
            shape = ?DefinitionShape::of(Some(&document)),
            "converting workflow document",
        );
        return Ok(to_editor_shape(&document));
    }

    let definition: WorkflowDefinition = serde_json::from_value(value)?;
    Ok(definition_to_editor_shape(&definition))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flowdeck_graph::editor::{EditorEdge, EditorNode, NodeData, NodeKind, Position};
    use tempfile::NamedTempFile;

    use super::*;

    fn write(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    #[test]
    fn test_convert_snake_case_document() {
        let file = write(&json!({
            "workflow_id": "twflow_1",
            "definition": {
                "nodes": [
                    { "node_id": "t1", "node_type": "trigger", "node_name": "cron_trigger" },
                    { "node_id": "a1", "node_type": "activity", "activity_name": "send_email" }
                ],
                "edges": [{ "edge_id": "e1", "source_node_id": "t1", "target_node_id": "a1" }]
            }
        }));

        let graph = convert_file(file.path()).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].kind, NodeKind::Trigger);
        assert_eq!(graph.nodes[1].node_name(), Some("send_email"));
        assert_eq!(graph.edges[0].target, "a1");
    }

    #[test]
    fn test_convert_bare_definition() {
        let file = write(&json!({
            "nodes": { "c1": { "node_id": "c1", "node_type": "controller", "node_name": "if_else" } }
        }));

        let graph = convert_file(file.path()).unwrap();
        assert_eq!(graph.nodes[0].id, "c1");
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_convert_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "definitely not json").unwrap();
        assert!(convert_file(file.path()).is_err());
    }

    #[test]
    fn test_push_graph_checks() {
        let node = |id: &str, kind: NodeKind| {
            EditorNode::new(id, kind, Position::default(), NodeData::new(id, kind.as_str()))
        };
        let mut graph = EditorGraph::new(
            vec![node("t1", NodeKind::Trigger), node("a1", NodeKind::Activity)],
            vec![EditorEdge::new("e1", "t1", "a1")],
        );

        let file = write(&serde_json::to_value(&graph).unwrap());
        let read = read_graph(file.path()).unwrap();
        assert_eq!(read, graph);
        assert!(check_graph(&read).is_ok());

        graph.edges.push(EditorEdge::new("e2", "a1", "t1"));
        let error = check_graph(&graph).unwrap_err();
        assert_eq!(error.to_string(), "edge `e2` targets trigger node `t1`");
    }

    #[test]
    fn test_describe_schema() {
        let schema = NodeSchema::from_value(&json!({
            "params": {
                "http_method": { "type": "dropdown", "allowedValues": ["GET", "POST"], "isRequired": true },
                "input": { "type": "edge_input", "hint": "Upstream data" }
            }
        }));

        let described = describe_schema("http_request", &schema);
        assert_eq!(described["params"][0]["label"], "Http Method");
        assert_eq!(described["params"][0]["allowedValues"], json!(["GET", "POST"]));
        assert_eq!(described["params"][1]["readOnly"], true);
        assert_eq!(described["params"][1]["hint"], "Upstream data");
        assert_eq!(described["warning"], Value::Null);
    }
}
