//! Fold drift back into a graph

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use infragraph_core::{
    node_from_resource, place_in_bands, BuildOptions, CanonicalCatalog, Category, EdgeId, EdgeKind, EngineWarning,
    GraphEdge, InfraGraph, NodeId, Position, ResourceKey,
};
use infragraph_parser::{resources_from_ground_truth, GroundTruthResource};

use crate::drift::DriftRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileOutput {
    pub graph: InfraGraph,
    /// Nodes created for resources missing from the graph.
    pub added: Vec<NodeId>,
    pub warnings: Vec<EngineWarning>,
}

/// Add every resource from `record.missing_in_graph` as a node flagged
/// `from_drift`, laid out in category bands below the existing drawing.
/// Existing nodes and edges are kept untouched.
pub fn reconcile(
    graph: &InfraGraph,
    record: &DriftRecord,
    truth: &[GroundTruthResource],
    catalog: &CanonicalCatalog,
    options: &BuildOptions,
) -> ReconcileOutput {
    let missing: HashSet<&ResourceKey> = record.missing_in_graph.iter().collect();
    let resources: Vec<_> = resources_from_ground_truth(truth)
        .into_iter()
        .filter(|r| missing.contains(&r.key()) && graph.node_by_key(&r.key()).is_none())
        .collect();

    let mut output = ReconcileOutput {
        graph: graph.clone(),
        ..ReconcileOutput::default()
    };
    if resources.is_empty() {
        return output;
    }

    let resolutions: Vec<_> = resources
        .iter()
        .map(|r| catalog.resolve(&r.resource_type, &r.provider))
        .collect();
    let categories: Vec<Category> = resolutions.iter().map(|r| r.category).collect();

    let origin = match graph.nodes.iter().map(|n| n.position.y).reduce(f64::max) {
        Some(bottom) => Position::new(options.origin.x, bottom + options.cell_height + options.band_gap),
        None => options.origin,
    };
    let positions = place_in_bands(&categories, origin, options);

    let mut ids: HashMap<ResourceKey, NodeId> = graph
        .nodes
        .iter()
        .filter_map(|n| n.resource_key.clone().map(|k| (k, n.id)))
        .collect();

    let mut unmapped: HashSet<&str> = HashSet::new();
    for ((resource, resolution), position) in resources.iter().zip(&resolutions).zip(positions) {
        if let Some(warning) = &resolution.warning {
            if unmapped.insert(resource.resource_type.as_str()) {
                output.warnings.push(warning.clone());
            }
        }
        let mut node = node_from_resource(resource, resolution, position);
        node.flags.from_drift = true;
        ids.insert(resource.key(), node.id);
        output.added.push(node.id);
        output.graph.nodes.push(node);
    }

    // Only dependencies touching a new node; the rest were already drawn.
    let added: HashSet<NodeId> = output.added.iter().copied().collect();
    let mut seen: HashSet<(NodeId, NodeId)> = output.graph.edges.iter().map(|e| (e.source, e.target)).collect();
    for resource in truth {
        let Some(&target) = ids.get(&resource.key) else {
            continue;
        };
        for dependency in &resource.dependencies {
            let Some(&source) = ids.get(dependency) else {
                continue;
            };
            if source == target || !(added.contains(&source) || added.contains(&target)) {
                continue;
            }
            if seen.insert((source, target)) {
                output.graph.edges.push(GraphEdge {
                    id: EdgeId::generate(),
                    source,
                    target,
                    kind: EdgeKind::DependsOn,
                });
            }
        }
    }

    tracing::info!("Reconciled {} resources from drift", output.added.len());
    output
}
