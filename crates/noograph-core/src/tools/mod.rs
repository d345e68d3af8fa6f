//! Tool dispatch surface for graph operations
//!
//! Each tool is a named operation taking JSON arguments and returning a
//! JSON envelope: `{"status": "ok", ...}` on success, or
//! `{"status": "error", "code": ..., "message": ...}` on failure. The
//! registry is an explicit value built over a repository at startup;
//! there is no global tool table.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::graph::{
    CreatedBy, DerivedKnowledgeWriter, EdgeStore, GraphQueryService, GraphRepository,
    NewTypeDefinition, NodeQuery, NodeStore, Scope, TypeKind, TypeRegistry,
};
use crate::error::{Error, Result};

/// Names of every registered tool, in presentation order
pub const TOOL_NAMES: &[&str] = &[
    "list_node_types",
    "list_edge_types",
    "create_node_type",
    "create_edge_type",
    "add_graph_node",
    "add_graph_edge",
    "get_graph_node",
    "query_graph",
    "add_analysis_node",
    "add_advice_node",
];

/// Registry of graph tools bound to a repository
pub struct ToolRegistry<R: GraphRepository> {
    repository: Arc<R>,
    types: TypeRegistry<R>,
    nodes: NodeStore<R>,
    edges: EdgeStore<R>,
    queries: GraphQueryService<R>,
    derived: DerivedKnowledgeWriter<R>,
}

impl<R: GraphRepository> ToolRegistry<R> {
    /// Build the registry over a repository
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            types: TypeRegistry::new(Arc::clone(&repository)),
            nodes: NodeStore::new(Arc::clone(&repository)),
            edges: EdgeStore::new(Arc::clone(&repository)),
            queries: GraphQueryService::new(Arc::clone(&repository)),
            derived: DerivedKnowledgeWriter::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// Dispatch a tool call by name
    ///
    /// Always returns an envelope; domain failures are encoded as
    /// `status: error` rather than propagated.
    pub async fn dispatch(&self, scope: &Scope, name: &str, args: Value) -> Value {
        debug!(tool = %name, scope = %scope, "Dispatching tool call");

        let result = match name {
            "list_node_types" => self.list_types(scope, TypeKind::Node).await,
            "list_edge_types" => self.list_types(scope, TypeKind::Edge).await,
            "create_node_type" => self.create_type(scope, TypeKind::Node, args).await,
            "create_edge_type" => self.create_type(scope, TypeKind::Edge, args).await,
            "add_graph_node" => self.add_graph_node(scope, args).await,
            "add_graph_edge" => self.add_graph_edge(scope, args).await,
            "get_graph_node" => self.get_graph_node(scope, args).await,
            "query_graph" => self.query_graph(scope, args).await,
            "add_analysis_node" => self.add_analysis_node(scope, args).await,
            "add_advice_node" => self.add_advice_node(scope, args).await,
            other => {
                warn!(tool = %other, "Unknown tool requested");
                return json!({
                    "status": "error",
                    "code": "unknown_tool",
                    "message": format!(
                        "Unknown tool '{}'; available tools: {}",
                        other,
                        TOOL_NAMES.join(", ")
                    ),
                });
            }
        };

        match result {
            Ok(payload) => payload,
            Err(err) => {
                warn!(tool = %name, code = err.code(), error = %err, "Tool call failed");
                json!({
                    "status": "error",
                    "code": err.code(),
                    "message": err.to_string(),
                })
            }
        }
    }

    async fn list_types(&self, scope: &Scope, kind: TypeKind) -> Result<Value> {
        let types = self.types.list_types(scope, kind).await?;
        Ok(json!({ "status": "ok", "types": types }))
    }

    async fn create_type(&self, scope: &Scope, kind: TypeKind, args: Value) -> Result<Value> {
        let definition: NewTypeDefinition = parse_args("create_type", args)?;
        let id = self
            .types
            .create_type(scope, kind, definition, CreatedBy::Agent)
            .await?;
        Ok(json!({ "status": "ok", "id": id }))
    }

    async fn add_graph_node(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: AddNodeArgs = parse_args("add_graph_node", args)?;
        let upsert = self
            .nodes
            .upsert(scope, &args.node_type, &args.name, args.properties)
            .await?;
        Ok(json!({ "status": "ok", "id": upsert.id, "action": upsert.action }))
    }

    async fn add_graph_edge(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: AddEdgeArgs = parse_args("add_graph_edge", args)?;
        let upsert = self
            .edges
            .upsert(
                scope,
                &args.edge_type,
                &args.source_type,
                &args.source_name,
                &args.target_type,
                &args.target_name,
                args.properties,
            )
            .await?;
        Ok(json!({ "status": "ok", "id": upsert.id, "action": upsert.action }))
    }

    async fn get_graph_node(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: GetNodeArgs = parse_args("get_graph_node", args)?;
        let node = self
            .repository
            .get_node(scope, &args.node_type, &args.name)
            .await?;
        Ok(json!({ "status": "ok", "node": node }))
    }

    async fn query_graph(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: QueryGraphArgs = parse_args("query_graph", args)?;
        let view = self
            .queries
            .query(
                scope,
                &NodeQuery {
                    type_name: args.node_type,
                    search_term: args.search_term,
                    limit: args.limit,
                },
            )
            .await?;
        Ok(json!({ "status": "ok", "nodes": view.nodes, "edges": view.edges }))
    }

    async fn add_analysis_node(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: DerivedNodeArgs = parse_args("add_analysis_node", args)?;
        let upsert = self
            .derived
            .add_analysis(scope, &args.name, args.properties)
            .await?;
        Ok(json!({ "status": "ok", "id": upsert.id, "action": upsert.action }))
    }

    async fn add_advice_node(&self, scope: &Scope, args: Value) -> Result<Value> {
        let args: DerivedNodeArgs = parse_args("add_advice_node", args)?;
        let upsert = self
            .derived
            .add_advice(scope, &args.name, args.properties)
            .await?;
        Ok(json!({
            "status": "ok",
            "id": upsert.id,
            "notification_id": upsert.notification_id,
        }))
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::InvalidInput(format!("Invalid arguments for {}: {}", tool, e)))
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Deserialize)]
struct AddNodeArgs {
    #[serde(alias = "type")]
    node_type: String,
    name: String,
    #[serde(default = "empty_object")]
    properties: Value,
}

#[derive(Debug, Deserialize)]
struct GetNodeArgs {
    #[serde(alias = "type")]
    node_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AddEdgeArgs {
    #[serde(alias = "type")]
    edge_type: String,
    source_type: String,
    source_name: String,
    target_type: String,
    target_name: String,
    #[serde(default)]
    properties: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryGraphArgs {
    #[serde(default, alias = "type")]
    node_type: Option<String>,
    #[serde(default, alias = "search")]
    search_term: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DerivedNodeArgs {
    name: String,
    #[serde(default = "empty_object")]
    properties: Value,
}
