//! Type registry: owns node and edge type definitions per scope
//!
//! All type creation goes through this registry; no other component may
//! define a type. Names are checked against the kind's convention and
//! duplicates within a scope are rejected, never overwritten. Types are
//! immutable once created - there is no update operation.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};

use super::entity::{CreatedBy, NewTypeDefinition, Scope, TypeDefinition, TypeKind};
use super::repository::GraphRepository;

/// Node type names are capitalized words separated by single spaces,
/// e.g. `Company` or `Quarterly Report`.
static NODE_TYPE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*(?: [A-Za-z0-9]+)*$").expect("valid regex"));

/// Edge type names are snake_case, e.g. `derived_from`.
static EDGE_TYPE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z_]*$").expect("valid regex"));

const NODE_NAME_RULE: &str =
    "node type names must start with a capital letter and contain only letters, digits, and single spaces";
const EDGE_NAME_RULE: &str =
    "edge type names must be snake_case (lowercase letters and underscores)";

/// Check a candidate type name against its kind's naming convention
pub fn check_type_name(kind: TypeKind, name: &str) -> Result<()> {
    let (pattern, rule) = match kind {
        TypeKind::Node => (&*NODE_TYPE_NAME, NODE_NAME_RULE),
        TypeKind::Edge => (&*EDGE_TYPE_NAME, EDGE_NAME_RULE),
    };
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidTypeName {
            kind,
            name: name.to_string(),
            rule,
        })
    }
}

/// Registry of node and edge type definitions, scoped by owning agent
pub struct TypeRegistry<R: GraphRepository> {
    repository: Arc<R>,
}

impl<R: GraphRepository> TypeRegistry<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Whether a type of this kind and name exists in the scope
    pub async fn type_exists(&self, scope: &Scope, kind: TypeKind, name: &str) -> Result<bool> {
        Ok(self.repository.get_type(scope, kind, name).await?.is_some())
    }

    /// Create a new type definition, returning its id.
    ///
    /// Fails with [`Error::InvalidTypeName`] when the name violates the
    /// kind's convention and [`Error::DuplicateType`] when a same-scope
    /// type of that name already exists.
    pub async fn create_type(
        &self,
        scope: &Scope,
        kind: TypeKind,
        definition: NewTypeDefinition,
        created_by: CreatedBy,
    ) -> Result<String> {
        check_type_name(kind, &definition.name)?;

        if self.type_exists(scope, kind, &definition.name).await? {
            return Err(Error::DuplicateType {
                kind,
                name: definition.name,
            });
        }

        let def = TypeDefinition::new(scope.clone(), kind, definition, created_by);
        self.repository.insert_type(&def).await?;

        info!(scope = %scope, kind = %kind, name = %def.name, "Type created");
        Ok(def.id)
    }

    /// Look up a type definition
    pub async fn get_type(
        &self,
        scope: &Scope,
        kind: TypeKind,
        name: &str,
    ) -> Result<Option<TypeDefinition>> {
        self.repository.get_type(scope, kind, name).await
    }

    /// List all types of a kind in a scope.
    ///
    /// Callers are expected to discover the schema here before writing;
    /// the engine never auto-creates a type on demand.
    pub async fn list_types(&self, scope: &Scope, kind: TypeKind) -> Result<Vec<TypeDefinition>> {
        self.repository.list_types(scope, kind).await
    }

    /// Sorted type names of a kind in a scope, for not-found messages
    pub async fn available_names(&self, scope: &Scope, kind: TypeKind) -> Result<String> {
        let mut names: Vec<String> = self
            .repository
            .list_types(scope, kind)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        names.sort();
        Ok(names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_names() {
        assert!(check_type_name(TypeKind::Node, "Company").is_ok());
        assert!(check_type_name(TypeKind::Node, "Quarterly Report").is_ok());
        assert!(check_type_name(TypeKind::Node, "R2 Unit").is_ok());

        assert!(check_type_name(TypeKind::Node, "company").is_err());
        assert!(check_type_name(TypeKind::Node, "lowercase name").is_err());
        assert!(check_type_name(TypeKind::Node, "Double  Space").is_err());
        assert!(check_type_name(TypeKind::Node, " Leading").is_err());
        assert!(check_type_name(TypeKind::Node, "Trailing ").is_err());
        assert!(check_type_name(TypeKind::Node, "Hyphen-ated").is_err());
        assert!(check_type_name(TypeKind::Node, "").is_err());
    }

    #[test]
    fn test_edge_type_names() {
        assert!(check_type_name(TypeKind::Edge, "derived_from").is_ok());
        assert!(check_type_name(TypeKind::Edge, "about").is_ok());

        assert!(check_type_name(TypeKind::Edge, "CamelCase").is_err());
        assert!(check_type_name(TypeKind::Edge, "_leading").is_err());
        assert!(check_type_name(TypeKind::Edge, "has space").is_err());
        assert!(check_type_name(TypeKind::Edge, "digit_2").is_err());
        assert!(check_type_name(TypeKind::Edge, "").is_err());
    }
}
