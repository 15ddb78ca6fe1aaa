use crate::graph::{Node, Position, PositionSource};
use serde::{Deserialize, Serialize};

/// Placeholder placement used when a workflow carries no stored positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub offset_x: f64,
    pub offset_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Distance between the topmost task and the trigger row.
    pub trigger_offset: f64,
    pub node_width: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            offset_x: 100.0,
            offset_y: 100.0,
            cell_width: 350.0,
            cell_height: 200.0,
            trigger_offset: 150.0,
            node_width: 250.0,
        }
    }
}

/// Number of grid columns for `count` cells: `ceil(sqrt(count))`, at least 1.
pub fn grid_columns(count: usize) -> usize {
    ((count as f64).sqrt().ceil() as usize).max(1)
}

/// The grid cell of the `index`-th of `count` tasks.
pub fn grid_position(index: usize, count: usize, grid: &GridConfig) -> Position {
    let columns = grid_columns(count);
    let col = index % columns;
    let row = index / columns;
    Position::new(
        grid.offset_x + col as f64 * grid.cell_width,
        grid.offset_y + row as f64 * grid.cell_height,
    )
}

/// Spreads trigger nodes evenly in a row above the other nodes.
///
/// Triggers are spaced `workflow_width / (count + 1)` apart, but never closer
/// than one node width plus a small gap, and the row stays centred on the
/// workflow. Non-trigger nodes are left untouched.
pub fn position_triggers(nodes: &mut [Node], trigger_offset: f64, node_width: f64) {
    let trigger_count = nodes.iter().filter(|n| n.is_trigger()).count();
    if trigger_count == 0 {
        return;
    }

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    for node in nodes.iter().filter(|n| !n.is_trigger()) {
        min_x = min_x.min(node.position.x);
        max_x = max_x.max(node.position.x);
        min_y = min_y.min(node.position.y);
    }
    if !min_x.is_finite() {
        min_x = 0.0;
        max_x = 0.0;
        min_y = trigger_offset;
    }

    let workflow_width = (max_x - min_x) + node_width;
    let min_step = node_width + node_width * 0.2;
    let step = (workflow_width / (trigger_count as f64 + 1.0)).max(min_step);
    let span = step * (trigger_count as f64 - 1.0);
    let center = min_x + workflow_width / 2.0;
    let y = min_y - trigger_offset;

    for (slot, node) in nodes.iter_mut().filter(|n| n.is_trigger()).enumerate() {
        let x = center - span / 2.0 + slot as f64 * step - node_width / 2.0;
        node.position = Position::new(x, y);
        node.position_source = PositionSource::Trigger;
    }
}
