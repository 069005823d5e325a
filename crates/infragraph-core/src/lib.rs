//! Infragraph core: data model, canonical catalog, graph builder and topology

pub mod builder;
pub mod catalog;
pub mod convert;
pub mod error;
pub mod graph;
pub mod model;
pub mod symbols;


#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{build_graph, place_in_bands, node_from_resource, BuildOptions, BuildOutput};
pub use catalog::{CanonicalCatalog, CanonicalComponent, CostRange, ProviderComponent, Resolution, GENERIC_CANONICAL_ID};
pub use convert::{convert_graph, ConversionReport};
pub use error::EngineWarning;
pub use graph::DependencyGraph;
pub use model::{
    Category, EdgeId, EdgeKind, GraphEdge, GraphNode, InfraGraph, NodeFlags, NodeId, Position, Provider,
    Resource, ResourceKey, Scalar,
};
pub use symbols::SymbolTable;
