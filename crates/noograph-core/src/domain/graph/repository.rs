//! Repository trait for graph persistence
//!
//! Abstracts the durable store behind point lookups on the identifying
//! tuples. The stores above this trait implement the find-before-create
//! upsert semantics; the repository only inserts, updates, and looks up.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

use super::entity::{
    GraphEdge, GraphNode, InboxNotification, Scope, TypeDefinition, TypeKind,
};

/// Filters for a graph query
#[derive(Debug, Clone, Default)]
pub struct NodeQuery {
    /// Restrict to nodes of this type
    pub type_name: Option<String>,
    /// Case-insensitive substring match on the node name
    pub search_term: Option<String>,
    /// Maximum nodes returned
    pub limit: Option<u32>,
}

/// Per-type counts for a scope, used by inspection tooling
#[derive(Debug, Clone, Default)]
pub struct TypeStats {
    pub nodes_by_type: Vec<(String, u64)>,
    pub edges_by_type: Vec<(String, u64)>,
}

/// Repository trait for graph persistence
///
/// Reads are unordered, non-transactional snapshots; no isolation is
/// guaranteed across a multi-step read-then-validate sequence.
#[async_trait]
pub trait GraphRepository: Send + Sync {
    // ========== Type Definitions ==========

    /// Persist a new type definition
    async fn insert_type(&self, def: &TypeDefinition) -> Result<()>;

    /// Look up a type by (scope, kind, name)
    async fn get_type(
        &self,
        scope: &Scope,
        kind: TypeKind,
        name: &str,
    ) -> Result<Option<TypeDefinition>>;

    /// List all types of a kind in a scope, sorted by name
    async fn list_types(&self, scope: &Scope, kind: TypeKind) -> Result<Vec<TypeDefinition>>;

    // ========== Nodes ==========

    /// Persist a new node
    async fn insert_node(&self, node: &GraphNode) -> Result<()>;

    /// Replace a node's properties
    async fn update_node_properties(&self, id: &str, properties: &Value) -> Result<()>;

    /// Look up a node by its identifying tuple (scope, type, name)
    async fn get_node(
        &self,
        scope: &Scope,
        type_name: &str,
        name: &str,
    ) -> Result<Option<GraphNode>>;

    /// Look up a node by id
    async fn get_node_by_id(&self, id: &str) -> Result<Option<GraphNode>>;

    /// Query nodes in a scope with optional type/name filters
    async fn query_nodes(&self, scope: &Scope, query: &NodeQuery) -> Result<Vec<GraphNode>>;

    // ========== Edges ==========

    /// Persist a new edge
    async fn insert_edge(&self, edge: &GraphEdge) -> Result<()>;

    /// Look up an edge by its identifying tuple (scope, type, source, target)
    async fn get_edge(
        &self,
        scope: &Scope,
        type_name: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<Option<GraphEdge>>;

    /// Look up an edge by id
    async fn get_edge_by_id(&self, id: &str) -> Result<Option<GraphEdge>>;

    /// All edges in a scope incident to any of the given node ids
    async fn edges_for_nodes(&self, scope: &Scope, node_ids: &[String]) -> Result<Vec<GraphEdge>>;

    // ========== Notifications ==========

    /// Record an inbox notification row
    async fn insert_notification(&self, notification: &InboxNotification) -> Result<()>;

    /// List notifications for an agent, newest first
    async fn list_notifications(&self, agent_id: &str) -> Result<Vec<InboxNotification>>;

    // ========== Maintenance ==========

    /// Per-type node and edge counts for a scope
    async fn type_stats(&self, scope: &Scope) -> Result<TypeStats>;

    /// Delete everything owned by an agent scope: types, nodes, edges,
    /// and notifications. Returns the number of rows removed.
    ///
    /// This is the only delete in the system.
    async fn delete_scope(&self, agent_id: &str) -> Result<u64>;
}
