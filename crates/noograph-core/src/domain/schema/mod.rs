//! Schema descriptor parsing and structural validation
//!
//! The graph's runtime-extensible schema is expressed as JSON-Schema-like
//! descriptors attached to type definitions. This module parses a
//! descriptor into a typed constraint tree ([`SchemaNode`]) and validates
//! JSON values against it, returning every violation found.

mod constraint;
mod validator;

pub use constraint::{
    ArrayConstraints, NumberConstraints, ObjectConstraints, SchemaNode, SchemaType,
    StringConstraints, value_kind,
};
pub use validator::{Violation, validate_at, validate_properties};
