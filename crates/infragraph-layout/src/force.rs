//! Fruchterman-Reingold spring embedder
//!
//! Every pair repels with `k^2/d`, every edge attracts with `d^2/k`, and a weak
//! pull towards the centroid keeps components together. Each node's step is its
//! net force scaled by `damping` over the node's local stiffness, capped by a
//! temperature that cools geometrically down to `min_temperature`. The run
//! stops as soon as no node would move more than `tolerance`, or after
//! `iterations` steps. A settled input therefore comes back unchanged.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use infragraph_core::{GraphEdge, GraphNode, NodeId, Position};

/// Closest two nodes are allowed to be when computing forces.
const MIN_DISTANCE: f64 = 0.01;

/// Repulsion stiffness is evaluated no closer than this fraction of `k`.
const STIFFNESS_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seeding {
    /// Start from the positions the nodes already carry. Nodes flagged
    /// `unplaced` get a random start inside `width` x `height`.
    #[default]
    Existing,
    /// Start every node from a uniform random position inside `width` x `height`.
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceOptions {
    /// Upper bound on simulation steps.
    pub iterations: usize,
    /// Natural spring length `k`.
    pub ideal_edge_length: f64,
    pub initial_temperature: f64,
    /// Temperature multiplier per iteration, below 1.
    pub cooling: f64,
    pub min_temperature: f64,
    /// Fraction of the stiffness-scaled force applied per step.
    pub damping: f64,
    /// Settled once no node would move further than this.
    pub tolerance: f64,
    pub gravity: f64,
    /// Minimum x and y of the result.
    pub margin: f64,
    pub seeding: Seeding,
    /// Makes random seeding reproducible.
    pub seed: Option<u64>,
    pub width: f64,
    pub height: f64,
}

impl Default for ForceOptions {
    fn default() -> Self {
        ForceOptions {
            iterations: 2000,
            ideal_edge_length: 150.0,
            initial_temperature: 100.0,
            cooling: 0.92,
            min_temperature: 10.0,
            damping: 0.9,
            tolerance: 0.1,
            gravity: 0.05,
            margin: 50.0,
            seeding: Seeding::Existing,
            seed: None,
            width: 1000.0,
            height: 800.0,
        }
    }
}

pub fn force_layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &ForceOptions) -> Vec<GraphNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let index: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    let springs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
        .filter(|(s, t)| s != t)
        .collect();

    let mut positions = seed_positions(nodes, options);
    let k = options.ideal_edge_length;
    let floor = k * STIFFNESS_FLOOR;
    let mut temperature = options.initial_temperature;
    let mut settled = None;

    for iteration in 0..options.iterations {
        let mut displacement = vec![(0.0, 0.0); positions.len()];
        let mut stiffness = vec![options.gravity; positions.len()];

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let (dx, dy, d) = separation(&positions, i, j);
                let force = k * k / d;
                displacement[i].0 += dx / d * force;
                displacement[i].1 += dy / d * force;
                displacement[j].0 -= dx / d * force;
                displacement[j].1 -= dy / d * force;

                let rate = k * k / d.max(floor).powi(2);
                stiffness[i] += rate;
                stiffness[j] += rate;
            }
        }

        for &(s, t) in &springs {
            let (dx, dy, d) = separation(&positions, t, s);
            let force = d * d / k;
            displacement[s].0 += dx / d * force;
            displacement[s].1 += dy / d * force;
            displacement[t].0 -= dx / d * force;
            displacement[t].1 -= dy / d * force;

            stiffness[s] += 2.0 * d / k;
            stiffness[t] += 2.0 * d / k;
        }

        let n = positions.len() as f64;
        let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;

        let moves: Vec<(f64, f64, f64)> = positions
            .iter()
            .zip(displacement)
            .zip(&stiffness)
            .map(|((position, (dx, dy)), h)| {
                let dx = dx - (position.x - cx) * options.gravity;
                let dy = dy - (position.y - cy) * options.gravity;
                let length = (dx * dx + dy * dy).sqrt();
                (dx, dy, options.damping * length / h.max(f64::EPSILON))
            })
            .collect();

        if moves.iter().all(|&(_, _, step)| step < options.tolerance) {
            settled = Some(iteration);
            break;
        }

        for (position, (dx, dy, step)) in positions.iter_mut().zip(moves) {
            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let step = step.min(temperature);
                position.x += dx / length * step;
                position.y += dy / length * step;
            }
        }

        temperature = (temperature * options.cooling).max(options.min_temperature);
    }

    match settled {
        Some(iteration) => tracing::debug!("Force layout settled after {} iterations", iteration),
        None => tracing::debug!("Force layout stopped at the {} iteration cap", options.iterations),
    }

    let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

    nodes
        .iter()
        .zip(positions)
        .map(|(node, p)| node.placed_at(Position::new(p.x - min_x + options.margin, p.y - min_y + options.margin)))
        .collect()
}

fn seed_positions(nodes: &[GraphNode], options: &ForceOptions) -> Vec<Position> {
    let randomize = |node: &GraphNode| options.seeding == Seeding::Random || node.flags.unplaced;
    if !nodes.iter().any(randomize) {
        return nodes.iter().map(|n| n.position).collect();
    }

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    tracing::debug!("Seeding force layout with random positions (seed {})", seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let (width, height) = (extent(options.width), extent(options.height));
    nodes
        .iter()
        .map(|node| {
            if randomize(node) {
                Position::new(rng.random_range(0.0..=width), rng.random_range(0.0..=height))
            } else {
                node.position
            }
        })
        .collect()
}

/// Negative or non-finite box sides collapse to zero.
fn extent(side: f64) -> f64 {
    if side.is_finite() {
        side.max(0.0)
    } else {
        0.0
    }
}

/// Vector from `j` to `i` and its length. Coincident nodes get a small
/// deterministic offset so they can push apart.
fn separation(positions: &[Position], i: usize, j: usize) -> (f64, f64, f64) {
    let dx = positions[i].x - positions[j].x;
    let dy = positions[i].y - positions[j].y;
    let d = (dx * dx + dy * dy).sqrt();
    if d >= MIN_DISTANCE {
        return (dx, dy, d);
    }
    let angle = (i * 7 + j * 13) as f64 * 0.7;
    (angle.cos() * MIN_DISTANCE, angle.sin() * MIN_DISTANCE, MIN_DISTANCE)
}
