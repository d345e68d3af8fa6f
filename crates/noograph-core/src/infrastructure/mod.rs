//! Infrastructure implementations of domain repository traits

pub mod graph;
