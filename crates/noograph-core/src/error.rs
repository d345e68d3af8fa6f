//! Error types for noograph

use thiserror::Error;

use crate::domain::graph::TypeKind;

/// Result type alias using noograph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Noograph error types with messages sufficient for a caller to self-correct
#[derive(Error, Debug)]
pub enum Error {
    // Type registry errors
    #[error("{kind} type name '{name}' is invalid: {rule}")]
    InvalidTypeName {
        kind: TypeKind,
        name: String,
        rule: &'static str,
    },

    #[error("A {kind} type named '{name}' already exists in this scope")]
    DuplicateType { kind: TypeKind, name: String },

    #[error(
        "Node type '{name}' does not exist. Available node types: [{available}]. \
         Call list_node_types before creating a new type."
    )]
    NodeTypeNotFound { name: String, available: String },

    #[error(
        "Edge type '{name}' does not exist. Available edge types: [{available}]. \
         Call list_edge_types before creating a new type."
    )]
    EdgeTypeNotFound { name: String, available: String },

    // Validation errors
    #[error("{kind} properties failed schema validation: {violations}")]
    SchemaValidation { kind: TypeKind, violations: String },

    // Edge endpoint errors
    #[error("{side} node '{name}' of type '{type_name}' not found. Create nodes before edges.")]
    ReferenceNotFound {
        side: &'static str,
        type_name: String,
        name: String,
    },

    // Citation errors
    #[error("Content must include at least one [node:<id>] or [edge:<id>] citation")]
    MissingCitations,

    #[error("Invalid citation format: {0}. Citation ids must be UUIDs.")]
    MalformedCitation(String),

    #[error("Citation check failed: {0}")]
    UnresolvedCitations(String),

    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Stable machine-readable code for this error, used as the `code`
    /// field of tool error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTypeName { .. } => "invalid_type_name",
            Self::DuplicateType { .. } => "duplicate_type",
            Self::NodeTypeNotFound { .. } => "node_type_not_found",
            Self::EdgeTypeNotFound { .. } => "edge_type_not_found",
            Self::SchemaValidation { kind, .. } => match kind {
                TypeKind::Node => "node_properties_schema_validation_failed",
                TypeKind::Edge => "edge_properties_schema_validation_failed",
            },
            Self::ReferenceNotFound { .. } => "reference_not_found",
            Self::MissingCitations => "citation_missing",
            Self::MalformedCitation(_) => "citation_format",
            Self::UnresolvedCitations(_) => "citation_unresolved",
            Self::InvalidInput(_) => "invalid_input",
            Self::Database(_) => "database_error",
            Self::Io(_) => "io_error",
            Self::Other(_) => "unexpected_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = Error::DuplicateType {
            kind: TypeKind::Node,
            name: "Company".into(),
        };
        assert_eq!(err.code(), "duplicate_type");

        let err = Error::SchemaValidation {
            kind: TypeKind::Node,
            violations: "properties.x is required".into(),
        };
        assert_eq!(err.code(), "node_properties_schema_validation_failed");

        let err = Error::SchemaValidation {
            kind: TypeKind::Edge,
            violations: "properties.x is required".into(),
        };
        assert_eq!(err.code(), "edge_properties_schema_validation_failed");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = Error::NodeTypeNotFound {
            name: "Compny".into(),
            available: "Analysis, Company".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Compny"));
        assert!(msg.contains("Analysis, Company"));
        assert!(msg.contains("list_node_types"));
    }
}
