//! Cross-provider conversion using the catalog's reverse mapping

use serde::{Deserialize, Serialize};

use crate::catalog::CanonicalCatalog;
use crate::model::*;

/// Result of converting a graph to another provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub target: Provider,
    pub graph: InfraGraph,
    pub converted: Vec<NodeId>,
    /// Nodes with no implementation on the target provider, left untouched.
    pub unmapped: Vec<NodeId>,
}

/// Re-express every node on `target`. Node ids and edges are kept so the
/// drawing survives; the input graph is not modified.
///
/// Sizing attributes that belong to the source provider's defaults (for
/// example `instance_type` on aws) are replaced by the target's defaults;
/// every other attribute is carried over.
pub fn convert_graph(graph: &InfraGraph, target: &Provider, catalog: &CanonicalCatalog) -> ConversionReport {
    let mut converted = Vec::new();
    let mut unmapped = Vec::new();

    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            let Some(component) = catalog.component_for(&node.canonical_id, target) else {
                unmapped.push(node.id);
                return node.clone();
            };

            let source_defaults = node
                .provider
                .as_ref()
                .and_then(|p| catalog.component_for(&node.canonical_id, p))
                .map(|pc| &pc.default_attributes);

            let mut attributes = component.default_attributes.clone();
            for (key, value) in &node.attributes {
                if source_defaults.is_some_and(|d| d.contains_key(key)) {
                    continue;
                }
                attributes.entry(key.clone()).or_insert_with(|| value.clone());
            }

            converted.push(node.id);
            GraphNode {
                attributes,
                provider: Some(target.clone()),
                resource_key: node
                    .resource_key
                    .as_ref()
                    .map(|k| ResourceKey::new(&component.component_id, &k.name)),
                ..node.clone()
            }
        })
        .collect();

    tracing::debug!(
        "Converted {} nodes to {}, {} without mapping",
        converted.len(),
        target,
        unmapped.len()
    );

    ConversionReport {
        target: target.clone(),
        graph: graph.with_nodes(nodes),
        converted,
        unmapped,
    }
}
