//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use infragraph_advisor::{
    analyze_costs, reconcile, CostRules, DriftComparisonError, DriftDetector, DriftOutcome, DriftRecord,
};
use infragraph_core::{convert_graph, CanonicalCatalog, InfraGraph, Provider};
use infragraph_layout::{layout_graph, LayoutAlgorithm, LayoutOptions};
use infragraph_parser::{import_configuration, parse_live_inventory, parse_state_export, ImportResult, SourceDocument};

use crate::config::EngineConfig;

/// Where drift ground truth comes from.
pub enum TruthFile {
    State(PathBuf),
    Inventory(PathBuf),
}

/// Commands accept either a bare graph or a full import result.
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Graph(InfraGraph),
    Import(ImportResult),
}

#[derive(Serialize)]
struct ReconciledDrift<'a> {
    drift: &'a DriftRecord,
    graph: &'a InfraGraph,
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_graph(path: &Path) -> anyhow::Result<InfraGraph> {
    let text = read(path)?;
    let file: GraphFile =
        serde_json::from_str(&text).with_context(|| format!("{} is not a graph", path.display()))?;
    Ok(match file {
        GraphFile::Graph(graph) => graph,
        GraphFile::Import(result) => result.graph,
    })
}

/// Pretty JSON to `output`, or stdout.
fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn layout_options(config: &EngineConfig, algorithm: Option<LayoutAlgorithm>) -> LayoutOptions {
    let mut options = config.layout.clone();
    if let Some(algorithm) = algorithm {
        options.algorithm = algorithm;
    }
    options
}

pub fn import(
    files: &[PathBuf],
    algorithm: Option<LayoutAlgorithm>,
    output: Option<&Path>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let documents = files
        .iter()
        .map(|path| Ok(SourceDocument::new(path.display().to_string(), read(path)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let catalog = CanonicalCatalog::builtin();
    let mut result = import_configuration(&documents, &catalog, &config.build);
    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }

    if algorithm.is_some() {
        result.graph = layout_graph(&result.graph, &layout_options(config, algorithm));
    }
    emit(&result, output)
}

pub fn layout(
    graph: &Path,
    algorithm: Option<LayoutAlgorithm>,
    output: Option<&Path>,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let graph = load_graph(graph)?;
    let options = layout_options(config, algorithm);
    tracing::info!("Laying out {} nodes with {}", graph.nodes.len(), options.algorithm);
    emit(&layout_graph(&graph, &options), output)
}

pub fn drift(
    graph: &Path,
    truth: &TruthFile,
    no_fallback: bool,
    with_reconcile: bool,
    config: &EngineConfig,
) -> anyhow::Result<()> {
    let graph = load_graph(graph)?;
    let parsed = match truth {
        TruthFile::State(path) => parse_state_export(&read(path)?).map_err(DriftComparisonError::InvalidState),
        TruthFile::Inventory(path) => {
            parse_live_inventory(&read(path)?).map_err(DriftComparisonError::InvalidInventory)
        }
    };
    let resources = match parsed {
        Ok(resources) => resources,
        Err(e) => return emit(&DriftOutcome::from(e), None),
    };

    let catalog = CanonicalCatalog::builtin();
    let mut options = config.drift.clone();
    if no_fallback {
        options.fallback_matching = false;
    }
    let record = DriftDetector::new(&catalog, &options).detect(&resources, &graph.nodes);

    if !with_reconcile {
        return emit(&record, None);
    }
    let reconciled = reconcile(&graph, &record, &resources, &catalog, &config.build);
    for warning in &reconciled.warnings {
        tracing::warn!("{}", warning);
    }
    emit(
        &ReconciledDrift {
            drift: &record,
            graph: &reconciled.graph,
        },
        None,
    )
}

pub fn cost(graph: &Path) -> anyhow::Result<()> {
    let graph = load_graph(graph)?;
    let report = analyze_costs(&graph, &CanonicalCatalog::builtin(), &CostRules::builtin());
    emit(&report, None)
}

pub fn convert(graph: &Path, target: &str) -> anyhow::Result<()> {
    let graph = load_graph(graph)?;
    let target = Provider::from(target.to_string());
    let report = convert_graph(&graph, &target, &CanonicalCatalog::builtin());
    if !report.unmapped.is_empty() {
        tracing::warn!("{} nodes have no {} equivalent", report.unmapped.len(), target);
    }
    emit(&report, None)
}

pub fn cheapest(canonical_id: &str) -> anyhow::Result<()> {
    let catalog = CanonicalCatalog::builtin();
    let provider = catalog
        .cheapest_provider(canonical_id)
        .with_context(|| format!("No provider implements {}", canonical_id))?;
    let cost = catalog.cost_for(canonical_id, &provider);
    emit(
        &serde_json::json!({
            "canonicalId": canonical_id,
            "provider": provider,
            "costRange": cost,
        }),
        None,
    )
}
