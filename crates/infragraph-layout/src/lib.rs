//! Graph layouts: hierarchical, grid, radial and force-directed
//!
//! Every layout is a pure function of nodes, edges and options that returns
//! the same nodes in the same order with new positions. Edges naming unknown
//! nodes are ignored.

pub mod force;
pub mod grid;
pub mod hierarchical;
pub mod radial;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use infragraph_core::{GraphEdge, GraphNode, InfraGraph};

pub use force::{force_layout, ForceOptions, Seeding};
pub use grid::{grid_columns, grid_layout, GridOptions};
pub use hierarchical::{assign_layers, hierarchical_layout, Direction, HierarchicalOptions, LayerAssignment, LayeringStrategy};
pub use radial::{radial_layout, RadialOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    #[default]
    Hierarchical,
    Grid,
    Radial,
    Force,
}

impl LayoutAlgorithm {
    pub const ALL: [LayoutAlgorithm; 4] = [
        LayoutAlgorithm::Hierarchical,
        LayoutAlgorithm::Grid,
        LayoutAlgorithm::Radial,
        LayoutAlgorithm::Force,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutAlgorithm::Hierarchical => "hierarchical",
            LayoutAlgorithm::Grid => "grid",
            LayoutAlgorithm::Radial => "radial",
            LayoutAlgorithm::Force => "force",
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutAlgorithm::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layout algorithm '{}' (expected hierarchical, grid, radial or force)", s))
    }
}

/// Options for every algorithm, as read from the `[layout]` config table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub algorithm: LayoutAlgorithm,
    pub hierarchical: HierarchicalOptions,
    pub grid: GridOptions,
    pub radial: RadialOptions,
    pub force: ForceOptions,
}

/// Run the algorithm selected in `options`.
pub fn apply_layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &LayoutOptions) -> Vec<GraphNode> {
    tracing::debug!("Running {} layout on {} nodes, {} edges", options.algorithm, nodes.len(), edges.len());
    match options.algorithm {
        LayoutAlgorithm::Hierarchical => hierarchical_layout(nodes, edges, &options.hierarchical),
        LayoutAlgorithm::Grid => grid_layout(nodes, &options.grid),
        LayoutAlgorithm::Radial => radial_layout(nodes, edges, &options.radial),
        LayoutAlgorithm::Force => force_layout(nodes, edges, &options.force),
    }
}

/// A copy of `graph` with laid-out positions.
pub fn layout_graph(graph: &InfraGraph, options: &LayoutOptions) -> InfraGraph {
    graph.with_nodes(apply_layout(&graph.nodes, &graph.edges, options))
}
