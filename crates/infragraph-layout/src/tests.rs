//! Unit tests for infragraph-layout

use std::collections::HashSet;

use infragraph_core::test_utils::{edge, edges, node, nodes};
use infragraph_core::{Category, DependencyGraph, GraphNode, Position};

use crate::*;

fn force_options(seed: u64) -> ForceOptions {
    ForceOptions {
        seeding: Seeding::Random,
        seed: Some(seed),
        ..ForceOptions::default()
    }
}

fn max_shift(a: &[GraphNode], b: &[GraphNode]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.position.distance(&y.position))
        .fold(0.0, f64::max)
}

#[test]
fn test_grid_places_every_node_in_its_own_cell() {
    let ns = nodes(10);
    let options = GridOptions::default();
    let laid_out = grid_layout(&ns, &options);

    assert_eq!(grid_columns(ns.len()), 4);
    let cells: HashSet<(i64, i64)> = laid_out
        .iter()
        .map(|n| (n.position.x as i64, n.position.y as i64))
        .collect();
    assert_eq!(cells.len(), ns.len());

    // tenth node: row 2, col 1
    assert_eq!(
        laid_out[9].position,
        Position::new(50.0 + options.cell_width, 50.0 + 2.0 * options.cell_height)
    );
}

#[test]
fn test_longest_path_puts_every_edge_downward() {
    // 0 -> 1 -> 3, 0 -> 2 -> 3, 0 -> 3, plus a separate chain 4 -> 5
    let ns = nodes(6);
    let es = edges(&ns, &[(0, 1), (0, 2), (1, 3), (2, 3), (0, 3), (4, 5)]);
    let graph = DependencyGraph::from_parts(&ns, &es);

    let longest = assign_layers(&graph, LayeringStrategy::LongestPath);
    for e in &es {
        assert!(longest.layer(e.source).unwrap() < longest.layer(e.target).unwrap());
    }
    assert_eq!(longest.layer(ns[3].id), Some(2));
    assert!(longest.synthesized_roots.is_empty());

    let shortest = assign_layers(&graph, LayeringStrategy::ShortestPath);
    for e in &es {
        assert!(shortest.layer(e.target).unwrap() <= shortest.layer(e.source).unwrap() + 1);
    }
    assert_eq!(shortest.layer(ns[3].id), Some(1));
}

#[test]
fn test_cycles_terminate_with_synthetic_roots() {
    // root 0 -> 1, and a cycle 2 -> 3 -> 4 -> 2 nothing reaches
    let ns = nodes(5);
    let es = edges(&ns, &[(0, 1), (2, 3), (3, 4), (4, 2)]);
    let graph = DependencyGraph::from_parts(&ns, &es);

    for strategy in [LayeringStrategy::ShortestPath, LayeringStrategy::LongestPath] {
        let assignment = assign_layers(&graph, strategy);
        assert_eq!(assignment.layers.len(), 5);
        assert_eq!(assignment.synthesized_roots, vec![ns[2].id]);
        assert_eq!(assignment.layer(ns[2].id), Some(0));
        assert_eq!(assignment.layer(ns[4].id), Some(2));
    }

    // a pure cycle has no root at all, so its first node is seeded
    let ring = nodes(3);
    let ring_edges = edges(&ring, &[(0, 1), (1, 2), (2, 0)]);
    let assignment = assign_layers(
        &DependencyGraph::from_parts(&ring, &ring_edges),
        LayeringStrategy::ShortestPath,
    );
    assert_eq!(assignment.synthesized_roots, vec![ring[0].id]);
    assert_eq!(assignment.depth(), 3);
}

#[test]
fn test_hierarchical_spacing() {
    let ns = nodes(4);
    let es = edges(&ns, &[(0, 1), (0, 2), (0, 3)]);
    let options = HierarchicalOptions::default();
    let laid_out = hierarchical_layout(&ns, &es, &options);

    let root = laid_out[0].position;
    let children: Vec<Position> = laid_out[1..].iter().map(|n| n.position).collect();
    assert!(children.iter().all(|p| p.y == root.y + options.layer_spacing));
    assert_eq!(children[1].x - children[0].x, options.node_spacing);
    assert_eq!(children[2].x - children[1].x, options.node_spacing);
    // parent centred over its layer
    assert_eq!(root.x, children[1].x);
    assert_eq!(children[0].x, options.origin.x);
}

#[test]
fn test_radial_rings() {
    let ns = nodes(4);
    let es = edges(&ns, &[(0, 1), (0, 2), (1, 3)]);
    let options = RadialOptions::default();
    let laid_out = radial_layout(&ns, &es, &options);

    let radius = |n: &GraphNode| n.position.distance(&options.center);
    assert!(radius(&laid_out[0]) < 1e-9);
    assert!((radius(&laid_out[1]) - 150.0).abs() < 1e-9);
    assert!((radius(&laid_out[2]) - 150.0).abs() < 1e-9);
    assert!((radius(&laid_out[3]) - 300.0).abs() < 1e-9);

    // first ring member sits straight above the centre
    assert!((laid_out[1].position.x - options.center.x).abs() < 1e-9);
    assert!(laid_out[1].position.y < options.center.y);
}

#[test]
fn test_radial_shares_inner_ring_between_roots() {
    let ns = nodes(2);
    let options = RadialOptions::default();
    let laid_out = radial_layout(&ns, &[], &options);
    for n in &laid_out {
        assert!((n.position.distance(&options.center) - options.ring_spacing / 2.0).abs() < 1e-9);
    }
    assert_ne!(laid_out[0].position, laid_out[1].position);
}

#[test]
fn test_force_translates_to_margin() {
    let ns = nodes(5);
    let es = edges(&ns, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
    let options = force_options(7);
    let laid_out = force_layout(&ns, &es, &options);

    let min_x = laid_out.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
    let min_y = laid_out.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
    assert!((min_x - options.margin).abs() < 1e-9);
    assert!((min_y - options.margin).abs() < 1e-9);
    assert!(laid_out.iter().all(|n| n.position.x.is_finite() && n.position.y.is_finite()));
}

#[test]
fn test_force_is_reproducible_with_a_seed() {
    let ns = nodes(6);
    let es = edges(&ns, &[(0, 1), (0, 2), (2, 3), (3, 4), (4, 5)]);
    let a = force_layout(&ns, &es, &force_options(42));
    let b = force_layout(&ns, &es, &force_options(42));
    assert_eq!(a, b);
}

#[test]
fn test_force_rerun_from_own_output_is_stable() {
    let chain = nodes(3);
    let chain_edges = edges(&chain, &[(0, 1), (1, 2)]);
    let triangle = nodes(3);
    let triangle_edges = edges(&triangle, &[(0, 1), (1, 2), (2, 0)]);

    for (ns, es) in [(chain, chain_edges), (triangle, triangle_edges)] {
        for seed in [1, 2, 3] {
            let first = force_layout(&ns, &es, &force_options(seed));
            let second = force_layout(&first, &es, &ForceOptions::default());
            let shift = max_shift(&first, &second);
            assert!(shift < 1.0, "seed {} moved nodes by {}", seed, shift);
        }
    }
}

#[test]
fn test_force_rerun_of_a_larger_tree_stays_put() {
    // binary tree of 12 nodes plus one cross edge
    let ns = nodes(12);
    let mut pairs: Vec<(usize, usize)> = (1..12).map(|i| ((i - 1) / 2, i)).collect();
    pairs.push((3, 11));
    let es = edges(&ns, &pairs);

    for seed in 1..=5 {
        let first = force_layout(&ns, &es, &force_options(seed));
        let second = force_layout(&first, &es, &ForceOptions::default());
        let third = force_layout(&second, &es, &ForceOptions::default());
        let shift = max_shift(&first, &second).max(max_shift(&second, &third));
        assert!(shift < 1.0, "seed {} moved nodes by {}", seed, shift);
    }
}

#[test]
fn test_force_seeds_only_unplaced_nodes() {
    let ns = nodes(6);
    let es = edges(&ns, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    let mut settled = force_layout(&ns, &es, &force_options(5));

    let mut sketch = node("sketch", "compute.vm", Category::Compute);
    sketch.flags.unplaced = true;
    let mut es = es;
    es.push(edge(&settled[2], &sketch));
    settled.push(sketch);

    let options = ForceOptions {
        seed: Some(9),
        ..ForceOptions::default()
    };
    let a = force_layout(&settled, &es, &options);
    let b = force_layout(&settled, &es, &options);
    assert_eq!(a, b);
    assert!(a.iter().all(|n| !n.flags.unplaced));
    for (i, x) in a.iter().enumerate() {
        for y in &a[i + 1..] {
            assert!(x.position.distance(&y.position) > 10.0, "{} overlaps {}", x.label, y.label);
        }
    }

    // nothing to seed: the settled graph is returned in place
    let placed = &settled[..6];
    let again = force_layout(placed, &es, &options);
    assert!(max_shift(placed, &again) < 1.0);
}

#[test]
fn test_force_tolerates_a_degenerate_box() {
    let ns = nodes(4);
    let es = edges(&ns, &[(0, 1), (1, 2), (2, 3)]);
    let options = ForceOptions {
        width: -100.0,
        height: f64::NAN,
        ..force_options(11)
    };
    let laid_out = force_layout(&ns, &es, &options);
    assert!(laid_out.iter().all(|n| n.position.x.is_finite() && n.position.y.is_finite()));
    assert!(laid_out[0].position.distance(&laid_out[1].position) > 10.0);
}

#[test]
fn test_force_separates_coincident_nodes() {
    // every node starts at the origin
    let ns = nodes(4);
    let es = edges(&ns, &[(0, 1), (1, 2), (2, 3)]);
    let laid_out = force_layout(&ns, &es, &ForceOptions::default());
    for (i, a) in laid_out.iter().enumerate() {
        for b in &laid_out[i + 1..] {
            assert!(a.position.distance(&b.position) > 10.0);
        }
    }
}

#[test]
fn test_layouts_ignore_unknown_edges_and_keep_nodes() {
    let mut ns = nodes(3);
    ns[0].flags.unplaced = true;
    let stranger = node("elsewhere", "compute.vm", Category::Compute);
    let mut es = edges(&ns, &[(0, 1)]);
    es.push(edge(&ns[2], &stranger));

    for algorithm in LayoutAlgorithm::ALL {
        let options = LayoutOptions {
            algorithm,
            force: force_options(3),
            ..LayoutOptions::default()
        };
        let laid_out = apply_layout(&ns, &es, &options);
        assert_eq!(laid_out.len(), ns.len(), "{}", algorithm);
        for (before, after) in ns.iter().zip(&laid_out) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.label, after.label);
            assert_eq!(before.attributes, after.attributes);
            assert!(!after.flags.unplaced, "{}", algorithm);
        }
    }
}

#[test]
fn test_options_from_config() {
    let options: LayoutOptions = serde_json::from_str(
        r#"{"algorithm": "force", "force": {"seed": 7, "iterations": 50}, "hierarchical": {"direction": "left-right", "strategy": "longest-path"}}"#,
    )
    .unwrap();
    assert_eq!(options.algorithm, LayoutAlgorithm::Force);
    assert_eq!(options.force.seed, Some(7));
    assert_eq!(options.force.iterations, 50);
    assert_eq!(options.force.cooling, 0.92);
    assert_eq!(options.force.damping, 0.9);
    assert_eq!(options.hierarchical.direction, Direction::LeftRight);
    assert_eq!(options.hierarchical.strategy, LayeringStrategy::LongestPath);

    assert_eq!("Radial".parse::<LayoutAlgorithm>(), Ok(LayoutAlgorithm::Radial));
    assert!("spiral".parse::<LayoutAlgorithm>().is_err());
}
