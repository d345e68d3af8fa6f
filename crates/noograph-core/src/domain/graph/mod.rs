//! Graph domain: types, nodes, edges, citations, and seeding
//!
//! The graph's schema is runtime-extensible: node and edge types are
//! created dynamically through the [`TypeRegistry`] and enforced against
//! every subsequent write. The stores implement idempotent upsert
//! semantics over a [`GraphRepository`] backend, and the derived
//! knowledge writers add provenance enforcement on top.
//!
//! ## Data Model
//!
//! - [`TypeDefinition`]: a node or edge type with its properties schema
//! - [`GraphNode`]: a named, typed node, identified by (scope, type, name)
//! - [`GraphEdge`]: a typed relationship, identified by
//!   (scope, type, source, target)
//! - [`Scope`]: the owning agent, or the shared global scope
//!
//! ## Concurrency
//!
//! Upserts are non-atomic find-then-create sequences with no in-process
//! coordination. Two concurrent identical upserts for a brand-new name
//! can both observe "not found" and both insert; exactly-once semantics
//! under concurrent identical writes are a known limitation, not a
//! guaranteed invariant.

mod citation;
mod derived;
mod edges;
mod entity;
mod nodes;
mod query;
mod registry;
mod repository;
mod seed;

pub use citation::{Citation, CitationKind, CitationVerifier, VerifiedCitations, extract_citations};
pub use derived::{AdviceUpsert, DerivedKnowledgeWriter};
pub use edges::EdgeStore;
pub use entity::{
    CreatedBy, GraphEdge, GraphNode, InboxNotification, NewTypeDefinition, Scope, TypeDefinition,
    TypeKind,
};
pub use nodes::{NodeStore, NodeUpsert, UpsertAction};
pub use query::{GraphQueryService, GraphView};
pub use registry::{TypeRegistry, check_type_name};
pub use repository::{GraphRepository, NodeQuery, TypeStats};
pub use seed::{ADVICE_TYPE, ANALYSIS_TYPE, SEED_EDGE_TYPES, SeedProvisioner};
