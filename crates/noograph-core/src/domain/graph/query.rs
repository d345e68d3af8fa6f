//! Read-side graph queries: nodes plus the edges that touch them

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{GraphEdge, GraphNode, Scope};
use super::repository::{GraphRepository, NodeQuery};
use crate::error::Result;

/// A slice of the graph: matched nodes and every edge touching them
///
/// Edges may reference nodes outside `nodes` when the neighbour did not
/// match the query filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Query service over the graph
///
/// Reads are snapshots without isolation; a concurrent writer can make
/// the edge list slightly newer than the node list.
pub struct GraphQueryService<R: GraphRepository> {
    repository: Arc<R>,
}

impl<R: GraphRepository> GraphQueryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Fetch nodes matching `query`, then every same-scope edge whose
    /// source or target is one of them.
    pub async fn query(&self, scope: &Scope, query: &NodeQuery) -> Result<GraphView> {
        let nodes = self.repository.query_nodes(scope, query).await?;

        let node_ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut edges = self.repository.edges_for_nodes(scope, &node_ids).await?;

        // edges_for_nodes can return the same edge once per endpoint hit
        let mut seen = HashSet::new();
        edges.retain(|e| seen.insert(e.id.clone()));

        debug!(
            scope = %scope,
            nodes = nodes.len(),
            edges = edges.len(),
            "Graph query executed"
        );

        Ok(GraphView { nodes, edges })
    }
}
