//! Automatic layered layout for workflow graphs.
//!
//! The pipeline is a constrained Sugiyama-style layout:
//!
//! 1. build an index-based adjacency from the edges ([`graph`]),
//! 2. assign ranks by longest path, then shorten edges ([`rank`]),
//! 3. order each rank with weighted barycenter sweeps ([`ordering`]),
//! 4. assign coordinates, optionally compact and wrap wide ranks.
//!
//! The engine is a pure function of its inputs: the same nodes, edges and
//! config always produce the same positions, and nothing here assumes which
//! thread it runs on.

mod coordinates;
pub mod graph;
pub mod grid;
pub mod ordering;
pub mod rank;

pub use graph::{LayoutGraph, edge_weight};
pub use grid::{GridConfig, grid_columns, grid_position, position_triggers};
pub use ordering::{count_crossings, order_ranks, stable_name_hash};
pub use rank::assign_ranks;

use crate::error::ConfigError;
use crate::graph::{Edge, Node, Position, PositionSource};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Ranks run top to bottom.
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    /// Ranks run left to right.
    #[serde(rename = "LR")]
    LeftRight,
}

/// How a rank narrower than the widest one is placed against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// When a recompute runs the layout engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Keep stored and grid positions as built.
    Preserve,
    /// Always run the engine.
    Auto,
    /// Run the engine only when no stored positions exist.
    #[default]
    WhenUnpositioned,
}

/// Layout engine settings. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub direction: Direction,
    /// Distance between neighbouring nodes of one rank.
    pub node_spacing: f64,
    /// Distance between consecutive ranks.
    pub rank_spacing: f64,
    pub rank_alignment: RankAlignment,
    pub padding: f64,
    pub compact: bool,
    /// Cross-axis bound; ranks wider than this are wrapped into rows.
    pub max_width: Option<f64>,
    pub node_width: f64,
    pub node_height: f64,
    /// Fraction of the free space between nodes kept when compacting.
    pub compaction: f64,
    pub ordering_iterations: usize,
    pub rank_passes: usize,
    pub trigger_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            node_spacing: 300.0,
            rank_spacing: 200.0,
            rank_alignment: RankAlignment::Center,
            padding: 50.0,
            compact: false,
            max_width: None,
            node_width: 250.0,
            node_height: 100.0,
            compaction: 0.5,
            ordering_iterations: 30,
            rank_passes: 10,
            trigger_offset: 150.0,
        }
    }
}

impl LayoutConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_spacing(mut self, node_spacing: f64, rank_spacing: f64) -> Self {
        self.node_spacing = node_spacing;
        self.rank_spacing = rank_spacing;
        self
    }

    pub fn with_alignment(mut self, alignment: RankAlignment) -> Self {
        self.rank_alignment = alignment;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }
}

/// Computes positions for `nodes` and returns them with updated positions.
///
/// Task nodes are laid out in ranks; trigger nodes are then spread in a row
/// above them. Edges are read, never modified. Edges to unknown nodes and
/// self-loops are ignored.
pub fn apply_layout(nodes: &[Node], edges: &[Edge], config: &LayoutConfig) -> Vec<Node> {
    let mut result = nodes.to_vec();
    let layered: Vec<usize> = (0..nodes.len()).filter(|&i| !nodes[i].is_trigger()).collect();

    let graph = LayoutGraph::new(layered.iter().map(|&i| &nodes[i]), edges);
    let ranks = assign_ranks(&graph, config.rank_passes);
    let mut layers = order_ranks(&graph, &ranks, config.ordering_iterations);
    debug!(
        nodes = graph.len(),
        ranks = layers.len(),
        crossings = count_crossings(&graph, &ranks, &layers),
        "Ranked and ordered layout"
    );

    let mut placements = coordinates::assign_coordinates(&layers, graph.len(), config);
    if config.compact {
        coordinates::compact(&mut layers, &mut placements, config);
    }
    if let Some(max_width) = config.max_width {
        coordinates::wrap(&layers, &mut placements, config, max_width);
    }

    for node in result.iter_mut().filter(|node| !node.is_trigger()) {
        // Duplicate ids share the first occurrence's slot.
        let Some(index) = graph.position_of(&node.id) else {
            continue;
        };
        let placement = placements[index];
        node.position = match config.direction {
            Direction::TopBottom => Position::new(placement.cross, placement.primary),
            Direction::LeftRight => Position::new(placement.primary, placement.cross),
        };
        node.position_source = PositionSource::Layout;
    }

    position_triggers(&mut result, config.trigger_offset, config.node_width);
    result
}
