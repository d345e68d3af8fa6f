//! Domain layer: graph entities, stores, and schema validation

pub mod graph;
pub mod schema;
