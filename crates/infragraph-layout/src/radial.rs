//! Concentric rings, one per hierarchical layer

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use infragraph_core::{DependencyGraph, GraphEdge, GraphNode, NodeId, Position};

use crate::hierarchical::{assign_layers, LayeringStrategy};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialOptions {
    pub center: Position,
    pub ring_spacing: f64,
    pub strategy: LayeringStrategy,
}

impl Default for RadialOptions {
    fn default() -> Self {
        RadialOptions {
            center: Position::new(500.0, 400.0),
            ring_spacing: 150.0,
            strategy: LayeringStrategy::ShortestPath,
        }
    }
}

/// Layer k sits on radius `k * ring_spacing`. A lone layer-0 node takes the
/// centre; several share an inner ring of half the spacing.
pub fn radial_layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &RadialOptions) -> Vec<GraphNode> {
    let graph = DependencyGraph::from_parts(nodes, edges);
    let assignment = assign_layers(&graph, options.strategy);

    let mut positions: HashMap<NodeId, Position> = HashMap::new();
    for (layer, ids) in assignment.members(graph.nodes()).iter().enumerate() {
        let radius = match (layer, ids.len()) {
            (0, 1) => 0.0,
            (0, _) => options.ring_spacing / 2.0,
            _ => layer as f64 * options.ring_spacing,
        };
        let step = TAU / ids.len().max(1) as f64;

        for (i, id) in ids.iter().enumerate() {
            let angle = -FRAC_PI_2 + i as f64 * step;
            positions.insert(
                *id,
                Position::new(
                    options.center.x + radius * angle.cos(),
                    options.center.y + radius * angle.sin(),
                ),
            );
        }
    }

    nodes
        .iter()
        .map(|node| node.placed_at(positions.get(&node.id).copied().unwrap_or(node.position)))
        .collect()
}
