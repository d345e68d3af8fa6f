//! Seed provisioner: idempotent installation of the baseline type set
//!
//! Every scope gets a fixed set of derived-knowledge node types and
//! provenance edge types before any other mutation is trusted to occur.
//! Re-invocation is a pure no-op once the set exists, so this is safe to
//! call on every agent-initialization path.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::error::Result;

use super::entity::{CreatedBy, NewTypeDefinition, Scope, TypeKind};
use super::registry::TypeRegistry;
use super::repository::GraphRepository;

/// Node type produced by analysis generation; content must carry
/// verified citations.
pub const ANALYSIS_TYPE: &str = "Analysis";

/// Node type produced by advice generation; content may cite only
/// analysis nodes.
pub const ADVICE_TYPE: &str = "Advice";

/// Baseline provenance edge type names
pub const SEED_EDGE_TYPES: &[&str] = &["derived_from", "about", "supports", "contradicts", "based_on"];

fn seed_node_types() -> Vec<NewTypeDefinition> {
    vec![
        NewTypeDefinition {
            name: ANALYSIS_TYPE.to_string(),
            description: "A derived analysis grounded in cited graph evidence".to_string(),
            justification: "Baseline type installed by the seed provisioner".to_string(),
            properties_schema: json!({
                "type": "object",
                "required": ["type", "summary", "content", "generated_at"],
                "properties": {
                    "type": { "type": "string" },
                    "summary": { "type": "string" },
                    "content": { "type": "string" },
                    "generated_at": { "type": "string", "format": "date-time" },
                    "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                }
            }),
            example_properties: json!({
                "type": "trend",
                "summary": "Revenue is accelerating quarter over quarter",
                "content": "Revenue grew 12% [node:5f0c0d94-0000-4000-8000-000000000000]",
                "generated_at": "2026-01-15T09:30:00Z",
                "confidence": 0.8
            }),
        },
        NewTypeDefinition {
            name: ADVICE_TYPE.to_string(),
            description: "An actionable recommendation derived from analysis nodes".to_string(),
            justification: "Baseline type installed by the seed provisioner".to_string(),
            properties_schema: json!({
                "type": "object",
                "required": ["action", "summary", "content", "generated_at"],
                "properties": {
                    "action": { "type": "string" },
                    "summary": { "type": "string" },
                    "content": { "type": "string" },
                    "generated_at": { "type": "string", "format": "date-time" },
                    "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                }
            }),
            example_properties: json!({
                "action": "rebalance",
                "summary": "Shift weight toward the accelerating segment",
                "content": "Based on [node:5f0c0d94-0000-4000-8000-000000000000], rebalance now",
                "generated_at": "2026-01-15T09:45:00Z",
                "confidence": 0.7
            }),
        },
    ]
}

fn seed_edge_types() -> Vec<NewTypeDefinition> {
    let descriptions = [
        ("derived_from", "The source entity was derived from the target"),
        ("about", "The source entity is about the target"),
        ("supports", "The source entity supports the target's claim"),
        ("contradicts", "The source entity contradicts the target's claim"),
        ("based_on", "The source entity is based on the target"),
    ];

    descriptions
        .iter()
        .map(|(name, description)| NewTypeDefinition {
            name: (*name).to_string(),
            description: (*description).to_string(),
            justification: "Baseline provenance relation installed by the seed provisioner"
                .to_string(),
            properties_schema: json!({ "type": "object" }),
            example_properties: json!({}),
        })
        .collect()
}

/// Installs the baseline type set into a scope
pub struct SeedProvisioner<R: GraphRepository> {
    registry: TypeRegistry<R>,
}

impl<R: GraphRepository> SeedProvisioner<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            registry: TypeRegistry::new(repository),
        }
    }

    /// Ensure every baseline type exists in the scope.
    ///
    /// Each type is exists-checked individually, so a partially seeded
    /// scope is completed rather than erroring on the types already
    /// present.
    pub async fn ensure_seed_types(&self, scope: &Scope) -> Result<()> {
        let mut created = 0usize;

        for def in seed_node_types() {
            if !self
                .registry
                .type_exists(scope, TypeKind::Node, &def.name)
                .await?
            {
                self.registry
                    .create_type(scope, TypeKind::Node, def, CreatedBy::System)
                    .await?;
                created += 1;
            }
        }

        for def in seed_edge_types() {
            if !self
                .registry
                .type_exists(scope, TypeKind::Edge, &def.name)
                .await?
            {
                self.registry
                    .create_type(scope, TypeKind::Edge, def, CreatedBy::System)
                    .await?;
                created += 1;
            }
        }

        if created > 0 {
            info!(scope = %scope, created, "Seed types installed");
        } else {
            debug!(scope = %scope, "Seed types already present");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::registry::check_type_name;

    #[test]
    fn test_seed_names_satisfy_naming_rules() {
        for def in seed_node_types() {
            assert!(check_type_name(TypeKind::Node, &def.name).is_ok());
        }
        for def in seed_edge_types() {
            assert!(check_type_name(TypeKind::Edge, &def.name).is_ok());
        }
    }

    #[test]
    fn test_seed_edge_type_set() {
        let names: Vec<String> = seed_edge_types().into_iter().map(|d| d.name).collect();
        assert_eq!(names, SEED_EDGE_TYPES);
    }
}
