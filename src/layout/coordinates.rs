//! Coordinate assignment, compaction and wrapping.
//!
//! Everything here works in layout space: `cross` runs along a rank and
//! `primary` runs across ranks. The caller maps these to x/y by direction.

use super::{Direction, LayoutConfig, RankAlignment};
use tracing::debug;

/// Smallest free gap left between neighbouring nodes when compacting.
const MIN_GAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Placement {
    pub cross: f64,
    pub primary: f64,
}

/// Node extent along the cross and primary axes.
fn extents(config: &LayoutConfig) -> (f64, f64) {
    match config.direction {
        Direction::TopBottom => (config.node_width, config.node_height),
        Direction::LeftRight => (config.node_height, config.node_width),
    }
}

/// Distance between neighbours in a rank, and between ranks.
fn steps(config: &LayoutConfig) -> (f64, f64) {
    if !config.compact {
        return (config.node_spacing, config.rank_spacing);
    }
    let (cross_extent, primary_extent) = extents(config);
    let keep = config.compaction.clamp(0.0, 1.0);
    let cross_gap = ((config.node_spacing - cross_extent).max(0.0) * keep).max(MIN_GAP);
    let primary_gap = ((config.rank_spacing - primary_extent).max(0.0) * keep).max(MIN_GAP);
    (cross_extent + cross_gap, primary_extent + primary_gap)
}

/// Where the first node of a rank of `len` nodes starts, aligned against the
/// widest rank of `widest` nodes.
fn align_offset(len: usize, widest: usize, step: f64, alignment: RankAlignment) -> f64 {
    let free = widest.saturating_sub(len) as f64 * step;
    match alignment {
        RankAlignment::Left => 0.0,
        RankAlignment::Center => free / 2.0,
        RankAlignment::Right => free,
    }
}

/// Places rank `r`'s `i`-th node at `offset + i * nodeSpacing` along the
/// rank and `r * rankSpacing` across ranks.
pub(super) fn assign_coordinates(layers: &[Vec<usize>], node_count: usize, config: &LayoutConfig) -> Vec<Placement> {
    let mut placements = vec![Placement::default(); node_count];
    let widest = layers.iter().map(Vec::len).max().unwrap_or(0);
    for (rank, layer) in layers.iter().enumerate() {
        let offset = align_offset(layer.len(), widest, config.node_spacing, config.rank_alignment);
        for (slot, &node) in layer.iter().enumerate() {
            placements[node] = Placement {
                cross: config.padding + offset + slot as f64 * config.node_spacing,
                primary: config.padding + rank as f64 * config.rank_spacing,
            };
        }
    }
    placements
}

/// Re-packs every rank tightly and removes slack between ranks.
///
/// Nodes keep the order of their current cross coordinate. Each rank starts
/// exactly one compact rank step below the lowest node of the previous rank.
pub(super) fn compact(layers: &mut [Vec<usize>], placements: &mut [Placement], config: &LayoutConfig) {
    let (cross_step, rank_step) = steps(config);
    let widest = layers.iter().map(Vec::len).max().unwrap_or(0);

    let mut previous_max: Option<f64> = None;
    for layer in layers.iter_mut() {
        if layer.is_empty() {
            continue;
        }
        layer.sort_by(|&a, &b| placements[a].cross.total_cmp(&placements[b].cross));

        let primary = match previous_max {
            Some(max) => max + rank_step,
            None => config.padding,
        };
        let offset = align_offset(layer.len(), widest, cross_step, config.rank_alignment);
        for (slot, &node) in layer.iter().enumerate() {
            placements[node] = Placement {
                cross: config.padding + offset + slot as f64 * cross_step,
                primary,
            };
        }
        previous_max = Some(primary);
    }
}

/// Splits ranks wider than `max_width` into several rows.
///
/// `columns_needed` is how many bounds-wide strips the widest rank covers;
/// every rank is then cut into chunks of
/// `ceil(widest_rank / columns_needed)` nodes, each chunk on its own row.
/// Ranks after a wrapped one shift down by the rows it added.
pub(super) fn wrap(layers: &[Vec<usize>], placements: &mut [Placement], config: &LayoutConfig, max_width: f64) {
    let (cross_step, rank_step) = steps(config);
    let (cross_extent, _) = extents(config);
    let widest = layers.iter().map(Vec::len).max().unwrap_or(0);
    if widest <= 1 {
        return;
    }

    let content = (widest - 1) as f64 * cross_step + cross_extent;
    let available = (max_width - 2.0 * config.padding).max(cross_extent);
    if content <= available {
        return;
    }

    let columns_needed = (content / available).ceil().max(1.0) as usize;
    let nodes_per_column = widest.div_ceil(columns_needed).max(1);
    debug!(content, available, columns_needed, nodes_per_column, "Wrapping wide ranks");

    let mut primary = config.padding;
    let mut first = true;
    // Compaction already removed empty ranks; otherwise they keep their slot.
    for layer in layers.iter().filter(|layer| !(config.compact && layer.is_empty())) {
        if !first {
            primary += rank_step;
        }
        first = false;

        let rows = layer.len().div_ceil(nodes_per_column);
        for (row, chunk) in layer.chunks(nodes_per_column).enumerate() {
            let offset = align_offset(chunk.len(), nodes_per_column, cross_step, config.rank_alignment);
            for (slot, &node) in chunk.iter().enumerate() {
                placements[node] = Placement {
                    cross: config.padding + offset + slot as f64 * cross_step,
                    primary: primary + row as f64 * rank_step,
                };
            }
        }
        primary += rows.saturating_sub(1) as f64 * rank_step;
    }
}
