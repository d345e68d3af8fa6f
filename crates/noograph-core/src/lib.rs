//! Noograph Core Library
//!
//! This crate provides the core functionality for Noograph, including:
//! - Runtime-extensible graph schema (node and edge type registry)
//! - Recursive JSON-schema property validation
//! - Idempotent node and edge upserts over SQLite
//! - Citation parsing and provenance verification
//! - Derived-knowledge writers (analysis and advice nodes)
//! - Seed type provisioning
//! - Tool dispatch surface for agent integrations

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;
pub mod tools;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::domain::graph::{
        GraphEdge, GraphNode, GraphRepository, NodeQuery, Scope, TypeDefinition, TypeKind,
    };
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::graph::SqliteGraphRepository;
    pub use crate::storage::{Database, DatabaseConfig};
    pub use crate::tools::ToolRegistry;
}
