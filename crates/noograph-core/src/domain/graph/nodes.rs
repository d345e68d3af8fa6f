//! Node store: idempotent create-or-merge of named, typed nodes
//!
//! `(scope, type, name)` identifies a node. Upserting an existing node
//! shallow-merges the incoming properties over the stored ones and
//! validates the merged result; a validation failure leaves the stored
//! node untouched. This upsert-by-name is how the system avoids
//! duplicate nodes for the same real-world entity discovered twice.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::schema::{SchemaNode, validate_properties};
use crate::error::{Error, Result};

use super::entity::{GraphNode, Scope, TypeKind};
use super::registry::TypeRegistry;
use super::repository::GraphRepository;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
    AlreadyExists,
}

/// Result of a node upsert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeUpsert {
    pub id: String,
    pub action: UpsertAction,
}

/// Idempotent store for typed graph nodes
pub struct NodeStore<R: GraphRepository> {
    repository: Arc<R>,
    registry: TypeRegistry<R>,
}

impl<R: GraphRepository> NodeStore<R> {
    pub fn new(repository: Arc<R>) -> Self {
        let registry = TypeRegistry::new(Arc::clone(&repository));
        Self {
            repository,
            registry,
        }
    }

    /// Create or merge-update the node identified by `(scope, type, name)`.
    ///
    /// The merged (not just incoming) properties must validate against
    /// the type's schema; on violation nothing is written and every
    /// violation is reported.
    pub async fn upsert(
        &self,
        scope: &Scope,
        type_name: &str,
        name: &str,
        properties: Value,
    ) -> Result<NodeUpsert> {
        let properties = as_object(properties)?;

        let Some(node_type) = self
            .registry
            .get_type(scope, TypeKind::Node, type_name)
            .await?
        else {
            return Err(Error::NodeTypeNotFound {
                name: type_name.to_string(),
                available: self.registry.available_names(scope, TypeKind::Node).await?,
            });
        };

        let schema = SchemaNode::parse(&node_type.properties_schema);

        match self.repository.get_node(scope, type_name, name).await? {
            Some(existing) => {
                let merged = shallow_merge(&existing.properties, &properties);
                check_schema(&merged, &schema)?;

                self.repository
                    .update_node_properties(&existing.id, &merged)
                    .await?;

                debug!(node_id = %existing.id, name = %name, "Node updated");
                Ok(NodeUpsert {
                    id: existing.id,
                    action: UpsertAction::Updated,
                })
            }
            None => {
                check_schema(&properties, &schema)?;

                let node = GraphNode::new(scope.clone(), type_name, name, properties);
                self.repository.insert_node(&node).await?;

                info!(node_id = %node.id, scope = %scope, type_name = %type_name, name = %name, "Node created");
                Ok(NodeUpsert {
                    id: node.id,
                    action: UpsertAction::Created,
                })
            }
        }
    }
}

/// Require a JSON object for properties
fn as_object(properties: Value) -> Result<Value> {
    if properties.is_object() {
        Ok(properties)
    } else {
        Err(Error::InvalidInput(format!(
            "properties must be a JSON object, got {}",
            properties
        )))
    }
}

/// Shallow merge: incoming keys win on conflict, existing keys are kept
fn shallow_merge(existing: &Value, incoming: &Value) -> Value {
    let mut merged = existing
        .as_object()
        .cloned()
        .unwrap_or_default();
    if let Some(incoming) = incoming.as_object() {
        for (key, value) in incoming {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// Validate against the schema, joining every violation into one error
pub(crate) fn check_schema(properties: &Value, schema: &SchemaNode) -> Result<()> {
    let violations = validate_properties(properties, schema);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaValidation {
            kind: TypeKind::Node,
            violations: violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        })
    }
}
