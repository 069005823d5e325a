//! Square-ish grid placement in input order

use serde::{Deserialize, Serialize};

use infragraph_core::{GraphNode, Position};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub cell_width: f64,
    pub cell_height: f64,
    pub origin: Position,
    /// Round every coordinate to a multiple of this pitch.
    pub snap: Option<f64>,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            cell_width: 220.0,
            cell_height: 160.0,
            origin: Position::new(50.0, 50.0),
            snap: None,
        }
    }
}

/// `ceil(sqrt(n))`, computed without floating point.
pub fn grid_columns(n: usize) -> usize {
    let mut columns = 0;
    while columns * columns < n {
        columns += 1;
    }
    columns
}

pub fn grid_layout(nodes: &[GraphNode], options: &GridOptions) -> Vec<GraphNode> {
    let columns = grid_columns(nodes.len()).max(1);

    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let (row, col) = (i / columns, i % columns);
            let x = options.origin.x + col as f64 * options.cell_width;
            let y = options.origin.y + row as f64 * options.cell_height;
            node.placed_at(snap(Position::new(x, y), options.snap))
        })
        .collect()
}

fn snap(position: Position, pitch: Option<f64>) -> Position {
    match pitch {
        Some(pitch) if pitch > 0.0 => Position::new(
            (position.x / pitch).round() * pitch,
            (position.y / pitch).round() * pitch,
        ),
        _ => position,
    }
}
