//! Layered (Sugiyama-style) placement
//!
//! Layering runs over the dependency topology. Shortest-path layering is a
//! multi-source BFS from the roots; longest-path layering walks a topological
//! order after dropping the back edges a depth-first search finds, so it
//! always terminates on cyclic input.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use infragraph_core::{DependencyGraph, GraphEdge, GraphNode, NodeId, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayeringStrategy {
    /// BFS depth from the roots.
    #[default]
    ShortestPath,
    /// Longest chain of dependencies above a node; every edge points one or more layers down.
    LongestPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalOptions {
    pub direction: Direction,
    pub strategy: LayeringStrategy,
    /// Distance between consecutive layers along the main axis.
    pub layer_spacing: f64,
    /// Distance between neighbours inside a layer.
    pub node_spacing: f64,
    pub origin: Position,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        HierarchicalOptions {
            direction: Direction::TopDown,
            strategy: LayeringStrategy::ShortestPath,
            layer_spacing: 180.0,
            node_spacing: 220.0,
            origin: Position::new(50.0, 50.0),
        }
    }
}

/// Layer of every node, plus the nodes that had to be seeded at layer 0
/// because no root reached them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerAssignment {
    pub layers: HashMap<NodeId, usize>,
    pub synthesized_roots: Vec<NodeId>,
}

impl LayerAssignment {
    pub fn layer(&self, id: NodeId) -> Option<usize> {
        self.layers.get(&id).copied()
    }

    /// Number of layers in use.
    pub fn depth(&self) -> usize {
        self.layers.values().max().map_or(0, |max| max + 1)
    }

    /// Members of each layer, keeping the order of `order`.
    pub fn members(&self, order: &[NodeId]) -> Vec<Vec<NodeId>> {
        let mut members = vec![Vec::new(); self.depth()];
        for id in order {
            if let Some(layer) = self.layer(*id) {
                members[layer].push(*id);
            }
        }
        members
    }
}

pub fn assign_layers(graph: &DependencyGraph, strategy: LayeringStrategy) -> LayerAssignment {
    let bfs = bfs_layers(graph);
    match strategy {
        LayeringStrategy::ShortestPath => bfs,
        LayeringStrategy::LongestPath => LayerAssignment {
            layers: longest_path_layers(graph),
            synthesized_roots: bfs.synthesized_roots,
        },
    }
}

fn bfs_layers(graph: &DependencyGraph) -> LayerAssignment {
    let mut assignment = LayerAssignment::default();
    let mut queue = VecDeque::new();

    let mut roots = graph.roots();
    if roots.is_empty() {
        if let Some(&first) = graph.nodes().first() {
            tracing::debug!("No root in graph, seeding {} at layer 0", first);
            assignment.synthesized_roots.push(first);
            roots.push(first);
        }
    }
    for root in roots {
        assignment.layers.insert(root, 0);
        queue.push_back(root);
    }
    bfs_from(graph, &mut assignment.layers, &mut queue);

    // Anything still unlayered sits in a cycle no root reaches.
    for &id in graph.nodes() {
        if assignment.layers.contains_key(&id) {
            continue;
        }
        tracing::debug!("Node {} unreachable from any root, seeding a synthetic root", id);
        assignment.synthesized_roots.push(id);
        assignment.layers.insert(id, 0);
        queue.push_back(id);
        bfs_from(graph, &mut assignment.layers, &mut queue);
    }

    assignment
}

fn bfs_from(graph: &DependencyGraph, layers: &mut HashMap<NodeId, usize>, queue: &mut VecDeque<NodeId>) {
    while let Some(id) = queue.pop_front() {
        let next = layers[&id] + 1;
        for successor in graph.successors(id) {
            if !layers.contains_key(&successor) {
                layers.insert(successor, next);
                queue.push_back(successor);
            }
        }
    }
}

fn longest_path_layers(graph: &DependencyGraph) -> HashMap<NodeId, usize> {
    let back = back_edges(graph);
    if !back.is_empty() {
        tracing::debug!("Ignoring {} back edges for longest-path layering", back.len());
    }
    let forward = |id: NodeId| {
        graph
            .successors(id)
            .into_iter()
            .filter(|s| !back.contains(&(id, *s)))
            .collect::<Vec<_>>()
    };

    let mut indegree: HashMap<NodeId, usize> = graph.nodes().iter().map(|&id| (id, 0)).collect();
    for &id in graph.nodes() {
        for successor in forward(id) {
            *indegree.entry(successor).or_default() += 1;
        }
    }

    let mut layers: HashMap<NodeId, usize> = HashMap::new();
    let mut queue: VecDeque<NodeId> = graph
        .nodes()
        .iter()
        .copied()
        .filter(|id| indegree[id] == 0)
        .collect();

    while let Some(id) = queue.pop_front() {
        let layer = *layers.entry(id).or_insert(0);
        for successor in forward(id) {
            let entry = layers.entry(successor).or_insert(0);
            *entry = (*entry).max(layer + 1);
            if let Some(remaining) = indegree.get_mut(&successor) {
                *remaining -= 1;
                if *remaining == 0 {
                    queue.push_back(successor);
                }
            }
        }
    }

    layers
}

/// Edges closing a cycle, found by an iterative depth-first search started
/// from the roots and then from every unvisited node in input order.
fn back_edges(graph: &DependencyGraph) -> HashSet<(NodeId, NodeId)> {
    enum Mark {
        Active,
        Done,
    }

    let mut marks: HashMap<NodeId, Mark> = HashMap::new();
    let mut back = HashSet::new();
    let starts: Vec<NodeId> = graph.roots().into_iter().chain(graph.nodes().iter().copied()).collect();

    for start in starts {
        if marks.contains_key(&start) {
            continue;
        }
        marks.insert(start, Mark::Active);
        let mut stack = vec![(start, graph.successors(start), 0usize)];

        while let Some(top) = stack.last_mut() {
            let node = top.0;
            let next = top.1.get(top.2).copied();
            top.2 += 1;

            match next {
                Some(next) => match marks.get(&next) {
                    Some(Mark::Active) => {
                        back.insert((node, next));
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Active);
                        stack.push((next, graph.successors(next), 0));
                    }
                },
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }

    back
}

/// Place nodes layer by layer. Only positions change; output order matches input.
pub fn hierarchical_layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &HierarchicalOptions) -> Vec<GraphNode> {
    let graph = DependencyGraph::from_parts(nodes, edges);
    let assignment = assign_layers(&graph, options.strategy);
    if !assignment.synthesized_roots.is_empty() {
        tracing::info!(
            "Hierarchical layout seeded {} synthetic roots for cyclic dependencies",
            assignment.synthesized_roots.len()
        );
    }

    let members = assignment.members(graph.nodes());
    let depth = members.len();
    let widest = members.iter().map(Vec::len).max().unwrap_or(0);
    let cross_center = (widest.saturating_sub(1)) as f64 * options.node_spacing / 2.0;

    let mut positions: HashMap<NodeId, Position> = HashMap::new();
    for (layer, ids) in members.iter().enumerate() {
        let main_index = match options.direction {
            Direction::TopDown | Direction::LeftRight => layer,
            Direction::BottomUp | Direction::RightLeft => depth - 1 - layer,
        };
        let main = main_index as f64 * options.layer_spacing;
        let first = cross_center - ids.len().saturating_sub(1) as f64 * options.node_spacing / 2.0;

        for (i, id) in ids.iter().enumerate() {
            let cross = first + i as f64 * options.node_spacing;
            let (x, y) = match options.direction {
                Direction::TopDown | Direction::BottomUp => (cross, main),
                Direction::LeftRight | Direction::RightLeft => (main, cross),
            };
            positions.insert(*id, Position::new(options.origin.x + x, options.origin.y + y));
        }
    }

    nodes
        .iter()
        .map(|node| node.placed_at(positions.get(&node.id).copied().unwrap_or(node.position)))
        .collect()
}
