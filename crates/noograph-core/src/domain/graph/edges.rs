//! Edge store: idempotent create-or-no-op of typed relationships
//!
//! `(scope, type, source, target)` identifies an edge. Unlike nodes,
//! edges are write-once: upserting an existing edge returns its id with
//! no write. Both endpoints must already exist as nodes.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::schema::{SchemaNode, validate_properties};
use crate::error::{Error, Result};

use super::entity::{GraphEdge, GraphNode, Scope, TypeKind};
use super::nodes::{NodeUpsert, UpsertAction};
use super::registry::TypeRegistry;
use super::repository::GraphRepository;

/// Idempotent store for typed graph edges
pub struct EdgeStore<R: GraphRepository> {
    repository: Arc<R>,
    registry: TypeRegistry<R>,
}

impl<R: GraphRepository> EdgeStore<R> {
    pub fn new(repository: Arc<R>) -> Self {
        let registry = TypeRegistry::new(Arc::clone(&repository));
        Self {
            repository,
            registry,
        }
    }

    /// Create the edge identified by `(scope, type, source, target)` if
    /// it does not already exist.
    ///
    /// Endpoints are resolved by `(scope, type, name)`; a missing
    /// endpoint fails with an error naming which side is absent -
    /// callers are expected to create nodes before edges.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        scope: &Scope,
        type_name: &str,
        source_type: &str,
        source_name: &str,
        target_type: &str,
        target_name: &str,
        properties: Option<Value>,
    ) -> Result<NodeUpsert> {
        let properties = properties.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        if !properties.is_object() {
            return Err(Error::InvalidInput(format!(
                "properties must be a JSON object, got {}",
                properties
            )));
        }

        let Some(edge_type) = self
            .registry
            .get_type(scope, TypeKind::Edge, type_name)
            .await?
        else {
            return Err(Error::EdgeTypeNotFound {
                name: type_name.to_string(),
                available: self.registry.available_names(scope, TypeKind::Edge).await?,
            });
        };

        let schema = SchemaNode::parse(&edge_type.properties_schema);
        let violations = validate_properties(&properties, &schema);
        if !violations.is_empty() {
            return Err(Error::SchemaValidation {
                kind: TypeKind::Edge,
                violations: violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            });
        }

        let source = self
            .resolve_endpoint(scope, source_type, source_name, "Source")
            .await?;
        let target = self
            .resolve_endpoint(scope, target_type, target_name, "Target")
            .await?;

        if let Some(existing) = self
            .repository
            .get_edge(scope, type_name, &source.id, &target.id)
            .await?
        {
            debug!(edge_id = %existing.id, "Edge already exists, no-op");
            return Ok(NodeUpsert {
                id: existing.id,
                action: UpsertAction::AlreadyExists,
            });
        }

        let edge = GraphEdge::new(scope.clone(), type_name, source.id, target.id, properties);
        self.repository.insert_edge(&edge).await?;

        info!(edge_id = %edge.id, scope = %scope, type_name = %type_name, "Edge created");
        Ok(NodeUpsert {
            id: edge.id,
            action: UpsertAction::Created,
        })
    }

    async fn resolve_endpoint(
        &self,
        scope: &Scope,
        type_name: &str,
        name: &str,
        side: &'static str,
    ) -> Result<GraphNode> {
        self.repository
            .get_node(scope, type_name, name)
            .await?
            .ok_or_else(|| Error::ReferenceNotFound {
                side,
                type_name: type_name.to_string(),
                name: name.to_string(),
            })
    }
}
