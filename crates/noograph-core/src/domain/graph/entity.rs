//! Graph entity types for the typed knowledge graph
//!
//! Nodes and edges carry arbitrary JSON properties that are validated
//! against the `properties_schema` of their type definition on every
//! write. Type definitions themselves are created at runtime and are
//! immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The scope a type, node, or edge belongs to.
///
/// A scope is either a single owning agent or the shared global scope.
/// It is the unit of multi-tenancy: identifying tuples, type lookups,
/// and citation authorization are all scoped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The shared scope, visible to system-level tooling
    Global,
    /// A single agent's private scope
    Agent(String),
}

impl Scope {
    /// Build a scope from an optional agent id
    pub fn from_agent(agent_id: Option<String>) -> Self {
        match agent_id {
            Some(id) if !id.is_empty() => Self::Agent(id),
            _ => Self::Global,
        }
    }

    /// Database column value for this scope.
    ///
    /// Global is stored as the empty string so identifying-tuple lookups
    /// stay plain equality comparisons.
    pub fn as_db(&self) -> &str {
        match self {
            Self::Global => "",
            Self::Agent(id) => id,
        }
    }

    /// Rebuild a scope from its database column value
    pub fn from_db(value: &str) -> Self {
        if value.is_empty() {
            Self::Global
        } else {
            Self::Agent(value.to_string())
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Agent(id) => write!(f, "agent:{}", id),
        }
    }
}

/// Whether a type definition describes nodes or edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Node,
    Edge,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node" => Some(Self::Node),
            "edge" => Some(Self::Edge),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who created a type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedBy {
    /// Installed by the seed provisioner
    System,
    /// Proposed by an agent at runtime
    Agent,
}

impl CreatedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

/// A node or edge type definition
///
/// Type definitions are the runtime-extensible schema of the graph.
/// `properties_schema` is a JSON-Schema-like descriptor (see
/// `domain::schema`) that every node/edge of this type must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Unique identifier for the type
    pub id: String,
    /// Scope the type is defined in
    pub scope: Scope,
    /// Node or edge type
    pub kind: TypeKind,
    /// Type name; unique within (scope, kind)
    pub name: String,
    /// Human-readable description of what the type represents
    pub description: String,
    /// Why the type was created (recorded for audit, not enforced)
    pub justification: String,
    /// Schema descriptor that properties must validate against
    pub properties_schema: Value,
    /// Example properties object, shown to callers discovering the schema
    pub example_properties: Value,
    /// Whether the type was seeded or agent-created
    pub created_by: CreatedBy,
    /// When the type was created
    pub created_at: DateTime<Utc>,
}

/// Arguments for creating a new type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTypeDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub justification: String,
    #[serde(default = "default_schema")]
    pub properties_schema: Value,
    #[serde(default = "default_example")]
    pub example_properties: Value,
}

fn default_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

fn default_example() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Default for NewTypeDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            justification: String::new(),
            properties_schema: default_schema(),
            example_properties: default_example(),
        }
    }
}

impl TypeDefinition {
    /// Build a type definition from creation arguments
    pub fn new(scope: Scope, kind: TypeKind, def: NewTypeDefinition, created_by: CreatedBy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            kind,
            name: def.name,
            description: def.description,
            justification: def.justification,
            properties_schema: def.properties_schema,
            example_properties: def.example_properties,
            created_by,
            created_at: Utc::now(),
        }
    }
}

/// A node in the knowledge graph
///
/// `(scope, type_name, name)` uniquely identifies a node; the node store
/// enforces this via find-before-create. Properties are an arbitrary
/// JSON object validated against the node type's schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier for the node
    pub id: String,
    /// Scope the node belongs to
    pub scope: Scope,
    /// Name of the node's type
    pub type_name: String,
    /// Human-readable name; unique within (scope, type)
    pub name: String,
    /// Validated JSON properties
    pub properties: Value,
    /// When the node was created
    pub created_at: DateTime<Utc>,
}

impl GraphNode {
    /// Create a new node
    pub fn new(
        scope: Scope,
        type_name: impl Into<String>,
        name: impl Into<String>,
        properties: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            type_name: type_name.into(),
            name: name.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// A typed edge between two nodes
///
/// `(scope, type_name, source_id, target_id)` uniquely identifies an
/// edge. Edges are write-once: a second identical upsert is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Unique identifier for the edge
    pub id: String,
    /// Scope the edge belongs to
    pub scope: Scope,
    /// Name of the edge's type
    pub type_name: String,
    /// Id of the source node
    pub source_id: String,
    /// Id of the target node
    pub target_id: String,
    /// Validated JSON properties
    pub properties: Value,
    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

impl GraphEdge {
    /// Create a new edge
    pub fn new(
        scope: Scope,
        type_name: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        properties: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scope,
            type_name: type_name.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// An inbox notification recorded when an advice node is written
///
/// Only the row is written here; delivery belongs to the surrounding
/// application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxNotification {
    pub id: String,
    /// Agent the notification is addressed to (empty for global scope)
    pub agent_id: String,
    /// The advice node the notification points at
    pub node_id: String,
    /// Short summary taken from the advice properties
    pub summary: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl InboxNotification {
    pub fn new(scope: &Scope, node_id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: scope.as_db().to_string(),
            node_id: node_id.into(),
            summary: summary.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_db_round_trip() {
        assert_eq!(Scope::Global.as_db(), "");
        assert_eq!(Scope::from_db(""), Scope::Global);

        let scope = Scope::Agent("a1".into());
        assert_eq!(scope.as_db(), "a1");
        assert_eq!(Scope::from_db("a1"), scope);
    }

    #[test]
    fn test_scope_from_agent() {
        assert_eq!(Scope::from_agent(None), Scope::Global);
        assert_eq!(Scope::from_agent(Some(String::new())), Scope::Global);
        assert_eq!(
            Scope::from_agent(Some("a1".into())),
            Scope::Agent("a1".into())
        );
    }

    #[test]
    fn test_type_kind_parsing() {
        assert_eq!(TypeKind::parse("node"), Some(TypeKind::Node));
        assert_eq!(TypeKind::parse("edge"), Some(TypeKind::Edge));
        assert_eq!(TypeKind::parse("vertex"), None);
    }

    #[test]
    fn test_type_definition_defaults() {
        let def: NewTypeDefinition = serde_json::from_value(json!({
            "name": "Company",
            "description": "A company"
        }))
        .unwrap();

        assert_eq!(def.properties_schema, json!({ "type": "object" }));
        assert!(def.example_properties.as_object().unwrap().is_empty());

        let ty = TypeDefinition::new(Scope::Global, TypeKind::Node, def, CreatedBy::Agent);
        assert!(!ty.id.is_empty());
        assert_eq!(ty.name, "Company");
        assert_eq!(ty.created_by, CreatedBy::Agent);
    }

    #[test]
    fn test_node_creation() {
        let node = GraphNode::new(
            Scope::Agent("a1".into()),
            "Company",
            "Acme",
            json!({ "ticker": "ACME" }),
        );
        assert!(!node.id.is_empty());
        assert_eq!(node.type_name, "Company");
        assert_eq!(node.name, "Acme");
    }
}
