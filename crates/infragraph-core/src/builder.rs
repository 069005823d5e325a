//! Converts parsed resources into a node/edge graph with a legible initial placement

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{CanonicalCatalog, Resolution};
use crate::error::EngineWarning;
use crate::model::*;
use crate::symbols::SymbolTable;

/// Builder settings, also loadable from the `[build]` config table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Emit [`EngineWarning::DanglingReference`] for references to undeclared resources.
    pub warn_on_dangling: bool,
    pub columns_per_band: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Vertical gap between category bands.
    pub band_gap: f64,
    pub origin: Position,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            warn_on_dangling: true,
            columns_per_band: 4,
            cell_width: 220.0,
            cell_height: 140.0,
            band_gap: 80.0,
            origin: Position::new(50.0, 50.0),
        }
    }
}

/// Graph plus the non-fatal diagnostics produced while building it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOutput {
    pub graph: InfraGraph,
    pub warnings: Vec<EngineWarning>,
}

/// Build a graph from resources. One node per distinct resource key, one
/// `depends_on` edge from dependency to dependent per resolved reference.
pub fn build_graph(
    resources: &[Resource],
    catalog: &CanonicalCatalog,
    options: &BuildOptions,
) -> BuildOutput {
    let mut warnings = Vec::new();

    // Later declarations of the same key replace earlier ones in place.
    let mut unique: Vec<&Resource> = Vec::with_capacity(resources.len());
    let mut slot: HashMap<ResourceKey, usize> = HashMap::new();
    for resource in resources {
        let key = resource.key();
        match slot.get(&key) {
            Some(&i) => {
                unique[i] = resource;
                warnings.push(EngineWarning::DuplicateResource { key });
            }
            None => {
                slot.insert(key, unique.len());
                unique.push(resource);
            }
        }
    }

    let resolutions: Vec<Resolution> = unique
        .iter()
        .map(|r| catalog.resolve(&r.resource_type, &r.provider))
        .collect();
    let categories: Vec<Category> = resolutions.iter().map(|r| r.category).collect();
    let positions = place_in_bands(&categories, options.origin, options);

    // one warning per unmapped type, however many resources share it
    let mut unmapped: HashSet<&str> = HashSet::new();
    let mut symbols = SymbolTable::new();
    let mut nodes = Vec::with_capacity(unique.len());
    for ((resource, resolution), position) in unique.iter().zip(resolutions).zip(positions) {
        if let Some(warning) = &resolution.warning {
            if unmapped.insert(resource.resource_type.as_str()) {
                warnings.push(warning.clone());
            }
        }
        let node = node_from_resource(resource, &resolution, position);
        symbols.insert(resource.key(), node.id);
        nodes.push(node);
    }

    let mut edges = Vec::new();
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
    for (resource, node) in unique.iter().zip(&nodes) {
        for dependency in &resource.dependencies {
            match symbols.lookup(dependency) {
                Some(source) if source == node.id => {}
                Some(source) => {
                    if seen.insert((source, node.id)) {
                        edges.push(GraphEdge {
                            id: EdgeId::generate(),
                            source,
                            target: node.id,
                            kind: EdgeKind::DependsOn,
                        });
                    }
                }
                None => {
                    tracing::debug!("Dropping reference {} -> {}", resource.key(), dependency);
                    if options.warn_on_dangling {
                        warnings.push(EngineWarning::DanglingReference {
                            from: resource.key(),
                            to: dependency.clone(),
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(
        "Built graph with {} nodes, {} edges, {} warnings",
        nodes.len(),
        edges.len(),
        warnings.len()
    );

    BuildOutput {
        graph: InfraGraph { nodes, edges },
        warnings,
    }
}

/// Create a node for `resource` with a fresh id.
pub fn node_from_resource(resource: &Resource, resolution: &Resolution, position: Position) -> GraphNode {
    GraphNode {
        id: NodeId::generate(),
        position,
        canonical_id: resolution.canonical_id.clone(),
        category: resolution.category,
        label: resource.name.clone(),
        attributes: resource.attributes.clone(),
        flags: NodeFlags {
            imported: true,
            ..NodeFlags::default()
        },
        resource_key: Some(resource.key()),
        provider: Some(resource.provider.clone()),
    }
}

/// Deterministic band placement: one horizontal band per non-empty category
/// (in [`Category::ALL`] order), nodes filling a row/column grid inside each band.
/// Returns one position per entry of `categories`, in the same order.
pub fn place_in_bands(categories: &[Category], origin: Position, options: &BuildOptions) -> Vec<Position> {
    let columns = options.columns_per_band.max(1);
    let mut positions = vec![origin; categories.len()];
    let mut band_top = origin.y;

    for bucket in Category::ALL {
        let members: Vec<usize> = categories
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == bucket)
            .map(|(i, _)| i)
            .collect();
        if members.is_empty() {
            continue;
        }

        for (slot, &i) in members.iter().enumerate() {
            let row = slot / columns;
            let col = slot % columns;
            positions[i] = Position::new(
                origin.x + col as f64 * options.cell_width,
                band_top + row as f64 * options.cell_height,
            );
        }

        let rows = members.len().div_ceil(columns);
        band_top += rows as f64 * options.cell_height + options.band_gap;
    }

    positions
}
