//! Derived-knowledge writers: analysis and advice nodes
//!
//! These are specialized node writers that enforce provenance on top of
//! the plain node upsert. Analysis content must cite existing same-scope
//! entities; advice content is stricter and may cite only analysis
//! nodes. Raw research nodes go through the plain node store and do not
//! require citations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};

use super::citation::CitationVerifier;
use super::entity::{InboxNotification, Scope};
use super::nodes::{NodeStore, NodeUpsert};
use super::repository::GraphRepository;
use super::seed::{ADVICE_TYPE, ANALYSIS_TYPE};

/// Result of writing an advice node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceUpsert {
    pub id: String,
    /// Inbox notification recorded for the advice
    pub notification_id: String,
}

/// Writers for citation-enforced derived-knowledge nodes
pub struct DerivedKnowledgeWriter<R: GraphRepository> {
    repository: Arc<R>,
    nodes: NodeStore<R>,
    verifier: CitationVerifier<R>,
}

impl<R: GraphRepository> DerivedKnowledgeWriter<R> {
    pub fn new(repository: Arc<R>) -> Self {
        let nodes = NodeStore::new(Arc::clone(&repository));
        let verifier = CitationVerifier::new(Arc::clone(&repository));
        Self {
            repository,
            nodes,
            verifier,
        }
    }

    /// Write an analysis node after verifying the citations in its
    /// `content` property.
    pub async fn add_analysis(
        &self,
        scope: &Scope,
        name: &str,
        properties: Value,
    ) -> Result<NodeUpsert> {
        self.verifier
            .verify(scope, content_of(&properties))
            .await?;
        self.nodes.upsert(scope, ANALYSIS_TYPE, name, properties).await
    }

    /// Write an advice node and record an inbox notification for it.
    ///
    /// Advice is held to a stricter citation rule: every citation must
    /// resolve to an `Analysis` node. Edge citations and citations of
    /// other node types are rejected.
    pub async fn add_advice(
        &self,
        scope: &Scope,
        name: &str,
        properties: Value,
    ) -> Result<AdviceUpsert> {
        let verified = self
            .verifier
            .verify(scope, content_of(&properties))
            .await?;

        let mut offenders: Vec<String> = verified
            .nodes
            .iter()
            .filter(|n| n.type_name != ANALYSIS_TYPE)
            .map(|n| format!("[node:{}]", n.id))
            .collect();
        offenders.extend(verified.edges.iter().map(|e| format!("[edge:{}]", e.id)));
        if !offenders.is_empty() {
            return Err(Error::UnresolvedCitations(format!(
                "advice may cite only {} nodes; offending citations: {}",
                ANALYSIS_TYPE,
                offenders.join(", ")
            )));
        }

        let summary = properties
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let upsert = self.nodes.upsert(scope, ADVICE_TYPE, name, properties).await?;

        let notification = InboxNotification::new(scope, &upsert.id, summary);
        self.repository.insert_notification(&notification).await?;

        info!(
            node_id = %upsert.id,
            notification_id = %notification.id,
            scope = %scope,
            "Advice node written"
        );

        Ok(AdviceUpsert {
            id: upsert.id,
            notification_id: notification.id,
        })
    }
}

/// The `content` property as text; absent or non-string content reads as
/// empty and fails the at-least-one-citation policy.
fn content_of(properties: &Value) -> &str {
    properties
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_of_missing_is_empty() {
        assert_eq!(content_of(&json!({})), "");
        assert_eq!(content_of(&json!({ "content": 42 })), "");
        assert_eq!(content_of(&json!({ "content": "text" })), "text");
    }
}
