//! Import pipeline: documents or ground truth in, graph and warnings out

use serde::{Deserialize, Serialize};

use infragraph_core::{build_graph, BuildOptions, BuildOutput, CanonicalCatalog, EngineWarning, InfraGraph};

use crate::document::{parse_documents, Module, Output, SourceDocument, Variable};
use crate::inventory::{resources_from_ground_truth, GroundTruthResource};

/// Result of importing configuration text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub graph: InfraGraph,
    pub variables: Vec<Variable>,
    pub outputs: Vec<Output>,
    pub modules: Vec<Module>,
    /// Parser warnings first, then builder warnings.
    pub warnings: Vec<EngineWarning>,
}

/// Parse `documents` and build a graph from every resource they declare.
pub fn import_configuration(
    documents: &[SourceDocument],
    catalog: &CanonicalCatalog,
    options: &BuildOptions,
) -> ImportResult {
    let parsed = parse_documents(documents);
    let built = build_graph(&parsed.resources, catalog, options);

    let mut warnings = parsed.warnings;
    warnings.extend(built.warnings);

    tracing::info!(
        "Imported {} documents into {} nodes and {} edges ({} warnings)",
        documents.len(),
        built.graph.nodes.len(),
        built.graph.edges.len(),
        warnings.len()
    );

    ImportResult {
        graph: built.graph,
        variables: parsed.variables,
        outputs: parsed.outputs,
        modules: parsed.modules,
        warnings,
    }
}

/// Build a graph straight from a state export or live inventory.
pub fn import_ground_truth(
    truth: &[GroundTruthResource],
    catalog: &CanonicalCatalog,
    options: &BuildOptions,
) -> BuildOutput {
    build_graph(&resources_from_ground_truth(truth), catalog, options)
}
