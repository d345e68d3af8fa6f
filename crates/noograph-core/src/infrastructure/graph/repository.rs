//! SQLite implementation of the GraphRepository
//!
//! Type definitions, nodes, edges, and notifications are stored in plain
//! tables with point lookups on the identifying tuples. Properties and
//! schema descriptors are stored as JSON text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use crate::domain::graph::{
    CreatedBy, GraphEdge, GraphNode, GraphRepository, InboxNotification, NodeQuery, Scope,
    TypeDefinition, TypeKind, TypeStats,
};
use crate::error::{Error, Result};

/// Default result cap for graph queries
const DEFAULT_QUERY_LIMIT: u32 = 50;

/// SQLite implementation of the graph repository
#[derive(Clone)]
pub struct SqliteGraphRepository {
    pool: SqlitePool,
}

impl SqliteGraphRepository {
    /// Create a new SQLite graph repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn type_table(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Node => "graph_node_types",
        TypeKind::Edge => "graph_edge_types",
    }
}

#[async_trait]
impl GraphRepository for SqliteGraphRepository {
    // ========== Type Definitions ==========

    async fn insert_type(&self, def: &TypeDefinition) -> Result<()> {
        let query = format!(
            r#"
            INSERT INTO {} (
                id, agent_id, name, description, justification,
                properties_schema, example_properties, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            type_table(def.kind)
        );

        sqlx::query(&query)
            .bind(&def.id)
            .bind(def.scope.as_db())
            .bind(&def.name)
            .bind(&def.description)
            .bind(&def.justification)
            .bind(def.properties_schema.to_string())
            .bind(def.example_properties.to_string())
            .bind(def.created_by.as_str())
            .bind(def.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        debug!(type_id = %def.id, kind = %def.kind, name = %def.name, "Type definition saved");
        Ok(())
    }

    async fn get_type(
        &self,
        scope: &Scope,
        kind: TypeKind,
        name: &str,
    ) -> Result<Option<TypeDefinition>> {
        let query = format!(
            "SELECT * FROM {} WHERE agent_id = ? AND name = ?",
            type_table(kind)
        );

        let row: Option<TypeRow> = sqlx::query_as(&query)
            .bind(scope.as_db())
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_definition(kind)).transpose()
    }

    async fn list_types(&self, scope: &Scope, kind: TypeKind) -> Result<Vec<TypeDefinition>> {
        let query = format!(
            "SELECT * FROM {} WHERE agent_id = ? ORDER BY name",
            type_table(kind)
        );

        let rows: Vec<TypeRow> = sqlx::query_as(&query)
            .bind(scope.as_db())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_definition(kind)).collect()
    }

    // ========== Nodes ==========

    async fn insert_node(&self, node: &GraphNode) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO graph_nodes (id, agent_id, type_name, name, properties, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&node.id)
        .bind(node.scope.as_db())
        .bind(&node.type_name)
        .bind(&node.name)
        .bind(node.properties.to_string())
        .bind(node.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(node_id = %node.id, name = %node.name, "Node saved");
        Ok(())
    }

    async fn update_node_properties(&self, id: &str, properties: &Value) -> Result<()> {
        sqlx::query("UPDATE graph_nodes SET properties = ? WHERE id = ?")
            .bind(properties.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(node_id = %id, "Node properties updated");
        Ok(())
    }

    async fn get_node(
        &self,
        scope: &Scope,
        type_name: &str,
        name: &str,
    ) -> Result<Option<GraphNode>> {
        let row: Option<NodeRow> = sqlx::query_as(
            "SELECT * FROM graph_nodes WHERE agent_id = ? AND type_name = ? AND name = ?",
        )
        .bind(scope.as_db())
        .bind(type_name)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(NodeRow::into_node).transpose()
    }

    async fn get_node_by_id(&self, id: &str) -> Result<Option<GraphNode>> {
        let row: Option<NodeRow> = sqlx::query_as("SELECT * FROM graph_nodes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(NodeRow::into_node).transpose()
    }

    async fn query_nodes(&self, scope: &Scope, query: &NodeQuery) -> Result<Vec<GraphNode>> {
        let mut sql = String::from("SELECT * FROM graph_nodes WHERE agent_id = ?");
        if query.type_name.is_some() {
            sql.push_str(" AND type_name = ?");
        }
        if query.search_term.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        sql.push_str(" ORDER BY created_at, name LIMIT ?");

        let mut query_builder = sqlx::query_as::<_, NodeRow>(&sql).bind(scope.as_db());
        if let Some(type_name) = &query.type_name {
            query_builder = query_builder.bind(type_name.clone());
        }
        if let Some(term) = &query.search_term {
            query_builder = query_builder.bind(format!("%{}%", term));
        }
        query_builder = query_builder.bind(query.limit.unwrap_or(DEFAULT_QUERY_LIMIT) as i64);

        let rows: Vec<NodeRow> = query_builder.fetch_all(&self.pool).await?;
        rows.into_iter().map(NodeRow::into_node).collect()
    }

    // ========== Edges ==========

    async fn insert_edge(&self, edge: &GraphEdge) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO graph_edges (id, agent_id, type_name, source_id, target_id, properties, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&edge.id)
        .bind(edge.scope.as_db())
        .bind(&edge.type_name)
        .bind(&edge.source_id)
        .bind(&edge.target_id)
        .bind(edge.properties.to_string())
        .bind(edge.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(edge_id = %edge.id, source = %edge.source_id, target = %edge.target_id, "Edge saved");
        Ok(())
    }

    async fn get_edge(
        &self,
        scope: &Scope,
        type_name: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<Option<GraphEdge>> {
        let row: Option<EdgeRow> = sqlx::query_as(
            r#"
            SELECT * FROM graph_edges
            WHERE agent_id = ? AND type_name = ? AND source_id = ? AND target_id = ?
            "#,
        )
        .bind(scope.as_db())
        .bind(type_name)
        .bind(source_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EdgeRow::into_edge).transpose()
    }

    async fn get_edge_by_id(&self, id: &str) -> Result<Option<GraphEdge>> {
        let row: Option<EdgeRow> = sqlx::query_as("SELECT * FROM graph_edges WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(EdgeRow::into_edge).transpose()
    }

    async fn edges_for_nodes(&self, scope: &Scope, node_ids: &[String]) -> Result<Vec<GraphEdge>> {
        if node_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = node_ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            r#"
            SELECT * FROM graph_edges
            WHERE agent_id = ? AND (source_id IN ({}) OR target_id IN ({}))
            "#,
            placeholders, placeholders
        );

        let mut query_builder = sqlx::query_as::<_, EdgeRow>(&sql).bind(scope.as_db());
        for id in node_ids {
            query_builder = query_builder.bind(id);
        }
        for id in node_ids {
            query_builder = query_builder.bind(id);
        }

        let rows: Vec<EdgeRow> = query_builder.fetch_all(&self.pool).await?;
        rows.into_iter().map(EdgeRow::into_edge).collect()
    }

    // ========== Notifications ==========

    async fn insert_notification(&self, notification: &InboxNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inbox_notifications (id, agent_id, node_id, summary, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.agent_id)
        .bind(&notification.node_id)
        .bind(&notification.summary)
        .bind(notification.read as i32)
        .bind(notification.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(notification_id = %notification.id, "Notification saved");
        Ok(())
    }

    async fn list_notifications(&self, agent_id: &str) -> Result<Vec<InboxNotification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            "SELECT * FROM inbox_notifications WHERE agent_id = ? ORDER BY created_at DESC",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(NotificationRow::into_notification).collect())
    }

    // ========== Maintenance ==========

    async fn type_stats(&self, scope: &Scope) -> Result<TypeStats> {
        let nodes_by_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT type_name, COUNT(*) FROM graph_nodes WHERE agent_id = ? GROUP BY type_name ORDER BY type_name",
        )
        .bind(scope.as_db())
        .fetch_all(&self.pool)
        .await?;

        let edges_by_type: Vec<(String, i64)> = sqlx::query_as(
            "SELECT type_name, COUNT(*) FROM graph_edges WHERE agent_id = ? GROUP BY type_name ORDER BY type_name",
        )
        .bind(scope.as_db())
        .fetch_all(&self.pool)
        .await?;

        Ok(TypeStats {
            nodes_by_type: nodes_by_type
                .into_iter()
                .map(|(t, c)| (t, c as u64))
                .collect(),
            edges_by_type: edges_by_type
                .into_iter()
                .map(|(t, c)| (t, c as u64))
                .collect(),
        })
    }

    async fn delete_scope(&self, agent_id: &str) -> Result<u64> {
        if agent_id.is_empty() {
            return Err(Error::InvalidInput(
                "the global scope cannot be deleted".to_string(),
            ));
        }

        let mut removed = 0u64;
        for table in [
            "graph_node_types",
            "graph_edge_types",
            "graph_nodes",
            "graph_edges",
            "inbox_notifications",
        ] {
            let result = sqlx::query(&format!("DELETE FROM {} WHERE agent_id = ?", table))
                .bind(agent_id)
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }

        info!(agent_id = %agent_id, removed, "Scope deleted");
        Ok(removed)
    }
}

// ========== Database Row Types ==========

#[derive(Debug, FromRow)]
struct TypeRow {
    id: String,
    agent_id: String,
    name: String,
    description: String,
    justification: String,
    properties_schema: String,
    example_properties: String,
    created_by: String,
    created_at: String,
}

impl TypeRow {
    fn into_definition(self, kind: TypeKind) -> Result<TypeDefinition> {
        let created_by = CreatedBy::parse(&self.created_by)
            .ok_or_else(|| Error::Other(format!("Invalid created_by value: {}", self.created_by)))?;

        Ok(TypeDefinition {
            id: self.id,
            scope: Scope::from_db(&self.agent_id),
            kind,
            name: self.name,
            description: self.description,
            justification: self.justification,
            properties_schema: parse_json(&self.properties_schema),
            example_properties: parse_json(&self.example_properties),
            created_by,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

#[derive(Debug, FromRow)]
struct NodeRow {
    id: String,
    agent_id: String,
    type_name: String,
    name: String,
    properties: String,
    created_at: String,
}

impl NodeRow {
    fn into_node(self) -> Result<GraphNode> {
        Ok(GraphNode {
            id: self.id,
            scope: Scope::from_db(&self.agent_id),
            type_name: self.type_name,
            name: self.name,
            properties: parse_json(&self.properties),
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

#[derive(Debug, FromRow)]
struct EdgeRow {
    id: String,
    agent_id: String,
    type_name: String,
    source_id: String,
    target_id: String,
    properties: String,
    created_at: String,
}

impl EdgeRow {
    fn into_edge(self) -> Result<GraphEdge> {
        Ok(GraphEdge {
            id: self.id,
            scope: Scope::from_db(&self.agent_id),
            type_name: self.type_name,
            source_id: self.source_id,
            target_id: self.target_id,
            properties: parse_json(&self.properties),
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: String,
    agent_id: String,
    node_id: String,
    summary: String,
    read: i32,
    created_at: String,
}

impl NotificationRow {
    fn into_notification(self) -> InboxNotification {
        InboxNotification {
            id: self.id,
            agent_id: self.agent_id,
            node_id: self.node_id,
            summary: self.summary,
            read: self.read != 0,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

fn parse_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::NewTypeDefinition;
    use crate::storage::migrations::run_migrations;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqliteGraphRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test pool");

        run_migrations(&pool).await.expect("Failed to run migrations");

        SqliteGraphRepository::new(pool)
    }

    fn company_type(scope: Scope) -> TypeDefinition {
        TypeDefinition::new(
            scope,
            TypeKind::Node,
            NewTypeDefinition {
                name: "Company".into(),
                description: "A company".into(),
                justification: "test".into(),
                properties_schema: json!({
                    "type": "object",
                    "required": ["ticker"],
                    "properties": { "ticker": { "type": "string" } }
                }),
                example_properties: json!({ "ticker": "ACME" }),
            },
            CreatedBy::Agent,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_type() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let def = company_type(scope.clone());
        repo.insert_type(&def).await.unwrap();

        let retrieved = repo
            .get_type(&scope, TypeKind::Node, "Company")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.id, def.id);
        assert_eq!(retrieved.name, "Company");
        assert_eq!(retrieved.created_by, CreatedBy::Agent);
        assert_eq!(retrieved.properties_schema, def.properties_schema);
    }

    #[tokio::test]
    async fn test_type_tables_are_kind_separated() {
        let repo = setup_test_db().await;
        let scope = Scope::Global;

        let def = TypeDefinition::new(
            scope.clone(),
            TypeKind::Edge,
            NewTypeDefinition {
                name: "derived_from".into(),
                description: "provenance".into(),
                justification: String::new(),
                properties_schema: json!({ "type": "object" }),
                example_properties: json!({}),
            },
            CreatedBy::System,
        );
        repo.insert_type(&def).await.unwrap();

        assert!(
            repo.get_type(&scope, TypeKind::Edge, "derived_from")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.get_type(&scope, TypeKind::Node, "derived_from")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_types_are_scope_isolated() {
        let repo = setup_test_db().await;
        let a1 = Scope::Agent("a1".into());
        let a2 = Scope::Agent("a2".into());

        repo.insert_type(&company_type(a1.clone())).await.unwrap();

        assert!(repo.get_type(&a1, TypeKind::Node, "Company").await.unwrap().is_some());
        assert!(repo.get_type(&a2, TypeKind::Node, "Company").await.unwrap().is_none());
        assert!(
            repo.get_type(&Scope::Global, TypeKind::Node, "Company")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_types_sorted_by_name() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        for name in ["Metric", "Company", "Filing"] {
            let mut def = company_type(scope.clone());
            def.name = name.into();
            def.id = uuid::Uuid::new_v4().to_string();
            repo.insert_type(&def).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_types(&scope, TypeKind::Node)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Company", "Filing", "Metric"]);
    }

    #[tokio::test]
    async fn test_node_round_trip() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let node = GraphNode::new(
            scope.clone(),
            "Company",
            "Acme",
            json!({ "ticker": "ACME", "employees": 250 }),
        );
        repo.insert_node(&node).await.unwrap();

        let by_tuple = repo
            .get_node(&scope, "Company", "Acme")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_tuple.id, node.id);
        assert_eq!(by_tuple.properties, node.properties);

        let by_id = repo.get_node_by_id(&node.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Acme");
        assert_eq!(by_id.scope, scope);
    }

    #[tokio::test]
    async fn test_update_node_properties() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let node = GraphNode::new(scope.clone(), "Company", "Acme", json!({ "ticker": "ACME" }));
        repo.insert_node(&node).await.unwrap();

        repo.update_node_properties(&node.id, &json!({ "ticker": "ACME", "sector": "tech" }))
            .await
            .unwrap();

        let updated = repo.get_node_by_id(&node.id).await.unwrap().unwrap();
        assert_eq!(updated.properties["sector"], "tech");
    }

    #[tokio::test]
    async fn test_edge_round_trip() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let source = GraphNode::new(scope.clone(), "Company", "Acme", json!({}));
        let target = GraphNode::new(scope.clone(), "Sector", "Tech", json!({}));
        repo.insert_node(&source).await.unwrap();
        repo.insert_node(&target).await.unwrap();

        let edge = GraphEdge::new(scope.clone(), "about", &source.id, &target.id, json!({}));
        repo.insert_edge(&edge).await.unwrap();

        let by_tuple = repo
            .get_edge(&scope, "about", &source.id, &target.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_tuple.id, edge.id);

        let by_id = repo.get_edge_by_id(&edge.id).await.unwrap().unwrap();
        assert_eq!(by_id.source_id, source.id);
        assert_eq!(by_id.target_id, target.id);

        // Reversed direction is a different identity.
        assert!(
            repo.get_edge(&scope, "about", &target.id, &source.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_edges_for_nodes() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let a = GraphNode::new(scope.clone(), "Company", "A", json!({}));
        let b = GraphNode::new(scope.clone(), "Company", "B", json!({}));
        let c = GraphNode::new(scope.clone(), "Company", "C", json!({}));
        for node in [&a, &b, &c] {
            repo.insert_node(node).await.unwrap();
        }

        let ab = GraphEdge::new(scope.clone(), "about", &a.id, &b.id, json!({}));
        let bc = GraphEdge::new(scope.clone(), "about", &b.id, &c.id, json!({}));
        repo.insert_edge(&ab).await.unwrap();
        repo.insert_edge(&bc).await.unwrap();

        let edges = repo
            .edges_for_nodes(&scope, &[a.id.clone()])
            .await
            .unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, ab.id);

        let edges = repo.edges_for_nodes(&scope, &[b.id.clone()]).await.unwrap();
        assert_eq!(edges.len(), 2);

        let edges = repo.edges_for_nodes(&scope, &[]).await.unwrap();
        assert!(edges.is_empty());
    }

    #[tokio::test]
    async fn test_query_nodes_filters() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let nodes = [
            GraphNode::new(scope.clone(), "Company", "Acme Corp", json!({})),
            GraphNode::new(scope.clone(), "Company", "Globex", json!({})),
            GraphNode::new(scope.clone(), "Sector", "Acme Holdings", json!({})),
        ];
        for node in &nodes {
            repo.insert_node(node).await.unwrap();
        }

        // By type
        let result = repo
            .query_nodes(
                &scope,
                &NodeQuery {
                    type_name: Some("Company".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 2);

        // By search term
        let result = repo
            .query_nodes(
                &scope,
                &NodeQuery {
                    search_term: Some("Acme".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 2);

        // Both filters
        let result = repo
            .query_nodes(
                &scope,
                &NodeQuery {
                    type_name: Some("Company".into()),
                    search_term: Some("Acme".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Acme Corp");

        // Limit
        let result = repo
            .query_nodes(
                &scope,
                &NodeQuery {
                    limit: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);

        // Other scopes see nothing
        let result = repo
            .query_nodes(&Scope::Agent("a2".into()), &NodeQuery::default())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_notifications() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        let notification = InboxNotification::new(&scope, "node-1", "Rebalance now");
        repo.insert_notification(&notification).await.unwrap();

        let listed = repo.list_notifications("a1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].node_id, "node-1");
        assert_eq!(listed[0].summary, "Rebalance now");
        assert!(!listed[0].read);

        assert!(repo.list_notifications("a2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_type_stats() {
        let repo = setup_test_db().await;
        let scope = Scope::Agent("a1".into());

        for name in ["A", "B"] {
            repo.insert_node(&GraphNode::new(scope.clone(), "Company", name, json!({})))
                .await
                .unwrap();
        }
        repo.insert_node(&GraphNode::new(scope.clone(), "Sector", "Tech", json!({})))
            .await
            .unwrap();

        let stats = repo.type_stats(&scope).await.unwrap();
        assert_eq!(
            stats.nodes_by_type,
            vec![("Company".to_string(), 2), ("Sector".to_string(), 1)]
        );
        assert!(stats.edges_by_type.is_empty());
    }

    #[tokio::test]
    async fn test_delete_scope() {
        let repo = setup_test_db().await;
        let a1 = Scope::Agent("a1".into());
        let a2 = Scope::Agent("a2".into());

        repo.insert_type(&company_type(a1.clone())).await.unwrap();
        repo.insert_type(&company_type(a2.clone())).await.unwrap();
        let node = GraphNode::new(a1.clone(), "Company", "Acme", json!({}));
        repo.insert_node(&node).await.unwrap();
        repo.insert_notification(&InboxNotification::new(&a1, &node.id, "s"))
            .await
            .unwrap();

        let removed = repo.delete_scope("a1").await.unwrap();
        assert_eq!(removed, 3);

        assert!(repo.get_type(&a1, TypeKind::Node, "Company").await.unwrap().is_none());
        assert!(repo.get_node_by_id(&node.id).await.unwrap().is_none());
        assert!(repo.list_notifications("a1").await.unwrap().is_empty());

        // The other scope is untouched.
        assert!(repo.get_type(&a2, TypeKind::Node, "Company").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_scope_refuses_global() {
        let repo = setup_test_db().await;
        assert!(repo.delete_scope("").await.is_err());
    }
}
