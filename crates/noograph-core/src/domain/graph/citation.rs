//! Citation parsing and provenance verification
//!
//! Derived-knowledge content grounds its claims in inline markers of the
//! form `[node:<uuid>]` or `[edge:<uuid>]`. Extraction is an explicit
//! two-token lexer (kind keyword, then id) so malformed markers - nested
//! brackets, a missing id after the colon, an unterminated marker - have
//! unambiguous behavior. Verification checks that every cited id is a
//! UUID, exists, and belongs to the calling scope.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::entity::{GraphEdge, GraphNode, Scope};
use super::repository::GraphRepository;

/// Whether a citation refers to a node or an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CitationKind {
    Node,
    Edge,
}

impl CitationKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("node") {
            Some(Self::Node)
        } else if keyword.eq_ignore_ascii_case("edge") {
            Some(Self::Edge)
        } else {
            None
        }
    }
}

/// A citation marker as lexed from content, id not yet checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub kind: CitationKind,
    /// Raw id token between the colon and the closing bracket
    pub raw_id: String,
}

impl Citation {
    /// The marker as it appeared in the content, for error messages
    pub fn marker(&self) -> String {
        let kind = match self.kind {
            CitationKind::Node => "node",
            CitationKind::Edge => "edge",
        };
        format!("[{}:{}]", kind, self.raw_id)
    }
}

/// Extract all citation markers from free text, in order of appearance.
///
/// Repeated citations are kept; deduplication happens at verification.
/// A `[` that does not open a well-formed marker is skipped; an inner
/// `[` aborts the current marker and restarts lexing at that position.
pub fn extract_citations(content: &str) -> Vec<Citation> {
    let bytes = content.as_bytes();
    let mut citations = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }

        // Token 1: the kind keyword, terminated by ':'.
        let keyword_start = i + 1;
        let mut j = keyword_start;
        while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b':' {
            i += 1;
            continue;
        }
        let Some(kind) = CitationKind::from_keyword(&content[keyword_start..j]) else {
            i += 1;
            continue;
        };

        // Token 2: the id, terminated by ']'. An empty id is still lexed
        // as a citation; it fails the UUID check at verification.
        let id_start = j + 1;
        let mut k = id_start;
        while k < bytes.len() && bytes[k] != b']' && bytes[k] != b'[' {
            k += 1;
        }
        if k < bytes.len() && bytes[k] == b']' {
            citations.push(Citation {
                kind,
                raw_id: content[id_start..k].to_string(),
            });
            i = k + 1;
        } else if k < bytes.len() {
            // Nested bracket: restart lexing at the inner '['.
            i = k;
        } else {
            break;
        }
    }

    citations
}

/// The entities a piece of content cites, after verification
#[derive(Debug, Clone, Default)]
pub struct VerifiedCitations {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Verifies that cited entities exist and belong to the calling scope
pub struct CitationVerifier<R: GraphRepository> {
    repository: Arc<R>,
}

impl<R: GraphRepository> CitationVerifier<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Verify every citation in `content` against `scope`.
    ///
    /// Fails with [`Error::MissingCitations`] when the content has no
    /// markers at all, [`Error::MalformedCitation`] when any id is not a
    /// UUID (before any lookups run), and [`Error::UnresolvedCitations`]
    /// aggregating every missing or cross-scope id otherwise.
    pub async fn verify(&self, scope: &Scope, content: &str) -> Result<VerifiedCitations> {
        let citations = extract_citations(content);
        if citations.is_empty() {
            return Err(Error::MissingCitations);
        }

        // Format errors fail fast, before any existence checks.
        let malformed: Vec<String> = citations
            .iter()
            .filter(|c| Uuid::parse_str(&c.raw_id).is_err())
            .map(Citation::marker)
            .collect();
        if !malformed.is_empty() {
            return Err(Error::MalformedCitation(malformed.join(", ")));
        }

        // Deduplicate before verification, preserving citation order.
        let mut seen = HashSet::new();
        let unique: Vec<&Citation> = citations
            .iter()
            .filter(|c| seen.insert((c.kind, c.raw_id.clone())))
            .collect();

        debug!(scope = %scope, cited = unique.len(), "Verifying citations");

        let mut resolved = VerifiedCitations::default();
        let mut missing_nodes = Vec::new();
        let mut cross_scope_nodes = Vec::new();
        let mut missing_edges = Vec::new();
        let mut cross_scope_edges = Vec::new();

        for citation in unique {
            match citation.kind {
                CitationKind::Node => match self.repository.get_node_by_id(&citation.raw_id).await? {
                    Some(node) if node.scope == *scope => resolved.nodes.push(node),
                    Some(_) => cross_scope_nodes.push(citation.raw_id.clone()),
                    None => missing_nodes.push(citation.raw_id.clone()),
                },
                CitationKind::Edge => match self.repository.get_edge_by_id(&citation.raw_id).await? {
                    Some(edge) if edge.scope == *scope => resolved.edges.push(edge),
                    Some(_) => cross_scope_edges.push(citation.raw_id.clone()),
                    None => missing_edges.push(citation.raw_id.clone()),
                },
            }
        }

        let mut problems = Vec::new();
        if !missing_nodes.is_empty() {
            problems.push(format!("missing nodes: {}", missing_nodes.join(", ")));
        }
        if !cross_scope_nodes.is_empty() {
            problems.push(format!("cross-agent nodes: {}", cross_scope_nodes.join(", ")));
        }
        if !missing_edges.is_empty() {
            problems.push(format!("missing edges: {}", missing_edges.join(", ")));
        }
        if !cross_scope_edges.is_empty() {
            problems.push(format!("cross-agent edges: {}", cross_scope_edges.join(", ")));
        }
        if !problems.is_empty() {
            return Err(Error::UnresolvedCitations(problems.join("; ")));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_markers() {
        let content = "Revenue grew [node:aaa] while margins fell [edge:bbb].";
        let citations = extract_citations(content);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].kind, CitationKind::Node);
        assert_eq!(citations[0].raw_id, "aaa");
        assert_eq!(citations[1].kind, CitationKind::Edge);
        assert_eq!(citations[1].raw_id, "bbb");
    }

    #[test]
    fn test_extract_is_order_preserving() {
        let content = "[edge:1] then [node:2] then [node:1]";
        let ids: Vec<String> = extract_citations(content)
            .into_iter()
            .map(|c| c.raw_id)
            .collect();
        assert_eq!(ids, vec!["1", "2", "1"]);
    }

    #[test]
    fn test_extract_keyword_case_insensitive() {
        let citations = extract_citations("[Node:x] [EDGE:y]");
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].kind, CitationKind::Node);
        assert_eq!(citations[1].kind, CitationKind::Edge);
    }

    #[test]
    fn test_extract_keeps_repeats() {
        let citations = extract_citations("[node:a] and again [node:a]");
        assert_eq!(citations.len(), 2);
    }

    #[test]
    fn test_extract_ignores_unknown_keywords() {
        assert!(extract_citations("[link:abc] [ref:def]").is_empty());
    }

    #[test]
    fn test_extract_empty_id_is_lexed() {
        // Nothing after the colon still produces a citation; the empty
        // id fails the UUID check at verification.
        let citations = extract_citations("see [node:]");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].raw_id, "");
    }

    #[test]
    fn test_extract_nested_bracket_restarts() {
        // The outer marker is aborted by the inner '['; the inner marker lexes.
        let citations = extract_citations("[node:[edge:abc]]");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].kind, CitationKind::Edge);
        assert_eq!(citations[0].raw_id, "abc");
    }

    #[test]
    fn test_extract_unterminated_marker() {
        assert!(extract_citations("trailing [node:abc").is_empty());
    }

    #[test]
    fn test_extract_plain_brackets() {
        assert!(extract_citations("an [aside] with no colon").is_empty());
        assert!(extract_citations("empty [] brackets").is_empty());
    }

    #[test]
    fn test_marker_round_trip() {
        let citation = Citation {
            kind: CitationKind::Node,
            raw_id: "abc".into(),
        };
        assert_eq!(citation.marker(), "[node:abc]");
    }
}
