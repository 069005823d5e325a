//! Strategies for pairing graph nodes with ground-truth resources

use infragraph_core::{Category, GraphNode};
use infragraph_parser::GroundTruthResource;

/// A ground-truth resource together with the category the catalog assigns it.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub resource: &'a GroundTruthResource,
    pub category: Category,
}

/// One way of deciding that a node and a ground-truth resource are the same thing.
pub trait MatchStrategy: Send + Sync {
    /// Name reported alongside every match this strategy makes.
    fn name(&self) -> &'static str;

    /// Whether this strategy should try to match `node` at all.
    fn applies_to(&self, node: &GraphNode) -> bool;

    /// Index of the first unclaimed candidate matching `node`.
    fn find_match(&self, node: &GraphNode, candidates: &[Candidate<'_>], claimed: &[bool]) -> Option<usize>;
}

/// Exact `(type, name)` match on the node's resource key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceKeyStrategy;

impl MatchStrategy for ResourceKeyStrategy {
    fn name(&self) -> &'static str {
        "resource_key"
    }

    fn applies_to(&self, node: &GraphNode) -> bool {
        node.resource_key.is_some()
    }

    fn find_match(&self, node: &GraphNode, candidates: &[Candidate<'_>], claimed: &[bool]) -> Option<usize> {
        let key = node.resource_key.as_ref()?;
        candidates
            .iter()
            .enumerate()
            .find(|(i, c)| !claimed[*i] && &c.resource.key == key)
            .map(|(i, _)| i)
    }
}

/// Heuristic fallback for hand-drawn nodes without a resource key: same
/// category and the same label once case, `-` and `_` are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryLabelStrategy;

impl MatchStrategy for CategoryLabelStrategy {
    fn name(&self) -> &'static str {
        "category_label"
    }

    fn applies_to(&self, node: &GraphNode) -> bool {
        node.resource_key.is_none()
    }

    fn find_match(&self, node: &GraphNode, candidates: &[Candidate<'_>], claimed: &[bool]) -> Option<usize> {
        let label = normalize_label(&node.label);
        if label.is_empty() {
            return None;
        }
        candidates
            .iter()
            .enumerate()
            .find(|(i, c)| {
                !claimed[*i] && c.category == node.category && normalize_label(&c.resource.key.name) == label
            })
            .map(|(i, _)| i)
    }
}

/// Lowercase and drop `-` and `_`: `Web-Server` and `web_server` compare equal.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
