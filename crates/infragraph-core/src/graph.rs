//! Dependency topology over an [`InfraGraph`](crate::model::InfraGraph), backed by petgraph::StableDiGraph

use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Read-only adjacency view used by layouts and the builder.
///
/// Node order is the input order; neighbour lists follow edge input order so
/// every traversal built on top of this is deterministic.
pub struct DependencyGraph {
    inner: StableDiGraph<NodeId, usize>,
    index: HashMap<NodeId, NodeIndex>,
    order: Vec<NodeId>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    /// Build the topology. Edges whose endpoints are not among `nodes` are ignored.
    pub fn from_parts(nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
        let mut inner = StableDiGraph::new();
        let mut index = HashMap::with_capacity(nodes.len());
        let mut order = Vec::with_capacity(nodes.len());

        for node in nodes {
            if index.contains_key(&node.id) {
                continue;
            }
            let idx = inner.add_node(node.id);
            index.insert(node.id, idx);
            order.push(node.id);
        }

        for (position, edge) in edges.iter().enumerate() {
            match (index.get(&edge.source), index.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    inner.add_edge(s, t, position);
                }
                _ => tracing::debug!("Ignoring edge {:?} with unknown endpoint", edge.id),
            }
        }

        DependencyGraph { inner, index, order }
    }

    pub fn from_graph(graph: &InfraGraph) -> Self {
        Self::from_parts(&graph.nodes, &graph.edges)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Node ids in input order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.order
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Targets of outgoing edges, in edge input order.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Sources of incoming edges, in edge input order.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut found: Vec<(usize, NodeId)> = self
            .inner
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (*e.weight(), self.inner[other])
            })
            .collect();
        found.sort_by_key(|(position, _)| *position);
        found.into_iter().map(|(_, id)| id).collect()
    }

    /// Nodes without incoming edges, in input order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|id| {
                self.index.get(id).is_some_and(|&idx| {
                    self.inner
                        .edges_directed(idx, Direction::Incoming)
                        .next()
                        .is_none()
                })
            })
            .collect()
    }

    /// Check if an edge exists from `source` to `target`.
    pub fn has_edge_between(&self, source: NodeId, target: NodeId) -> bool {
        match (self.index.get(&source), self.index.get(&target)) {
            (Some(&s), Some(&t)) => self.inner.contains_edge(s, t),
            _ => false,
        }
    }

    /// Every node `id` transitively depends on (following edges backwards).
    pub fn upstream(&self, id: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut to_visit = vec![id];

        while let Some(current) = to_visit.pop() {
            for source in self.predecessors(current) {
                if seen.insert(source) {
                    to_visit.push(source);
                }
            }
        }

        seen.remove(&id);
        seen
    }
}
