//! Drift detection between a graph and its ground truth

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use infragraph_core::{CanonicalCatalog, GraphNode, NodeId, ResourceKey};
use infragraph_parser::{parse_live_inventory, parse_state_export, GroundTruthResource, InventoryError};

use crate::matching::{Candidate, CategoryLabelStrategy, MatchStrategy, ResourceKeyStrategy};

/// Attributes whose change is worth reporting: sizes, classes, tiers and versions.
pub const DRIFT_SIGNIFICANT_ATTRIBUTES: &[&str] = &[
    "instance_type",
    "instance_class",
    "machine_type",
    "size",
    "vm_size",
    "node_type",
    "sku",
    "sku_name",
    "tier",
    "storage_class",
    "engine",
    "engine_version",
    "version",
    "kubernetes_version",
    "runtime",
    "allocated_storage",
    "disk_size_gb",
    "memory_size",
    "available_memory_mb",
    "storage_gb",
    "desired_count",
    "node_count",
];

#[derive(Error, Debug)]
pub enum DriftComparisonError {
    #[error("invalid state export: {0}")]
    InvalidState(#[source] InventoryError),

    #[error("invalid live inventory: {0}")]
    InvalidInventory(#[source] InventoryError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftOptions {
    /// Enable the category + label heuristic for nodes without a resource key.
    pub fallback_matching: bool,
}

impl Default for DriftOptions {
    fn default() -> Self {
        DriftOptions {
            fallback_matching: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriftStatus {
    InSync,
    Drifted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedResource {
    pub node_id: NodeId,
    pub resource_key: ResourceKey,
    /// Name of the strategy that made the match.
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDifference {
    pub resource_id: ResourceKey,
    pub attribute: String,
    pub state_value: String,
    pub diagram_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftRecord {
    pub status: DriftStatus,
    pub matched: Vec<MatchedResource>,
    /// Ground-truth resources no node matched.
    pub missing_in_graph: Vec<ResourceKey>,
    /// Imported nodes with no ground-truth counterpart.
    pub missing_in_state: Vec<NodeId>,
    pub attribute_differences: Vec<AttributeDifference>,
    pub timestamp: DateTime<Utc>,
}

impl DriftRecord {
    pub fn is_in_sync(&self) -> bool {
        self.status == DriftStatus::InSync
    }
}

/// Reported instead of a record when the ground truth cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidGroundTruth {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriftOutcome {
    Completed(DriftRecord),
    Invalid(InvalidGroundTruth),
}

impl From<DriftComparisonError> for DriftOutcome {
    fn from(error: DriftComparisonError) -> Self {
        tracing::warn!("Drift comparison aborted: {}", error);
        DriftOutcome::Invalid(InvalidGroundTruth {
            valid: false,
            message: error.to_string(),
        })
    }
}

/// Runs the enabled match strategies in order, the exact key match first.
pub struct DriftDetector<'a> {
    catalog: &'a CanonicalCatalog,
    strategies: Vec<Box<dyn MatchStrategy>>,
}

impl<'a> DriftDetector<'a> {
    pub fn new(catalog: &'a CanonicalCatalog, options: &DriftOptions) -> Self {
        let mut strategies: Vec<Box<dyn MatchStrategy>> = vec![Box::new(ResourceKeyStrategy)];
        if options.fallback_matching {
            strategies.push(Box::new(CategoryLabelStrategy));
        }
        DriftDetector { catalog, strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn detect(&self, truth: &[GroundTruthResource], nodes: &[GraphNode]) -> DriftRecord {
        self.detect_at(truth, nodes, Utc::now())
    }

    /// Same as [`detect`](Self::detect) with an explicit timestamp.
    pub fn detect_at(&self, truth: &[GroundTruthResource], nodes: &[GraphNode], now: DateTime<Utc>) -> DriftRecord {
        let candidates: Vec<Candidate<'_>> = truth
            .iter()
            .map(|resource| Candidate {
                resource,
                category: self.catalog.resolve(&resource.key.resource_type, &resource.provider).category,
            })
            .collect();

        let mut claimed = vec![false; candidates.len()];
        let mut pairs: Vec<Option<(usize, &'static str)>> = vec![None; nodes.len()];

        for strategy in &self.strategies {
            for (n, node) in nodes.iter().enumerate() {
                if pairs[n].is_some() || !strategy.applies_to(node) {
                    continue;
                }
                if let Some(c) = strategy.find_match(node, &candidates, &claimed) {
                    tracing::debug!("{} matched {} by {}", node.label, candidates[c].resource.key, strategy.name());
                    claimed[c] = true;
                    pairs[n] = Some((c, strategy.name()));
                }
            }
        }

        let mut matched = Vec::new();
        let mut attribute_differences = Vec::new();
        let mut missing_in_state = Vec::new();

        for (node, pair) in nodes.iter().zip(&pairs) {
            match pair {
                Some((c, strategy)) => {
                    let resource = candidates[*c].resource;
                    attribute_differences.extend(compare_attributes(node, resource));
                    matched.push(MatchedResource {
                        node_id: node.id,
                        resource_key: resource.key.clone(),
                        strategy: strategy.to_string(),
                    });
                }
                None if node.flags.imported => missing_in_state.push(node.id),
                None => {}
            }
        }

        let missing_in_graph: Vec<ResourceKey> = candidates
            .iter()
            .zip(&claimed)
            .filter(|(_, claimed)| !**claimed)
            .map(|(c, _)| c.resource.key.clone())
            .collect();

        let status = if missing_in_graph.is_empty() && missing_in_state.is_empty() && attribute_differences.is_empty() {
            DriftStatus::InSync
        } else {
            DriftStatus::Drifted
        };

        tracing::info!(
            "Drift check: {} matched, {} missing in graph, {} missing in state, {} attribute differences",
            matched.len(),
            missing_in_graph.len(),
            missing_in_state.len(),
            attribute_differences.len()
        );

        DriftRecord {
            status,
            matched,
            missing_in_graph,
            missing_in_state,
            attribute_differences,
            timestamp: now,
        }
    }

    /// Read a state export and compare it with `nodes`.
    pub fn detect_from_state(&self, state_json: &str, nodes: &[GraphNode]) -> DriftOutcome {
        match parse_state_export(state_json).map_err(DriftComparisonError::InvalidState) {
            Ok(truth) => DriftOutcome::Completed(self.detect(&truth, nodes)),
            Err(e) => e.into(),
        }
    }

    /// Read a live inventory and compare it with `nodes`.
    pub fn detect_from_inventory(&self, inventory_json: &str, nodes: &[GraphNode]) -> DriftOutcome {
        match parse_live_inventory(inventory_json).map_err(DriftComparisonError::InvalidInventory) {
            Ok(truth) => DriftOutcome::Completed(self.detect(&truth, nodes)),
            Err(e) => e.into(),
        }
    }
}

/// Compare tracked attributes present on both sides by their string rendering.
fn compare_attributes(node: &GraphNode, resource: &GroundTruthResource) -> Vec<AttributeDifference> {
    DRIFT_SIGNIFICANT_ATTRIBUTES
        .iter()
        .filter_map(|&attribute| {
            let diagram = node.attributes.get(attribute)?.to_string();
            let state = resource.attributes.get(attribute)?.to_string();
            (diagram != state).then(|| AttributeDifference {
                resource_id: resource.key.clone(),
                attribute: attribute.to_string(),
                state_value: state,
                diagram_value: diagram,
            })
        })
        .collect()
}
