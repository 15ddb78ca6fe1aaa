//! Crossing reduction: ordering the nodes inside each rank.

use super::graph::LayoutGraph;
use itertools::Itertools;
use std::cmp::Ordering;
use tracing::trace;

/// Pull of a same-rank sibling relative to a unit edge weight.
const SIBLING_AFFINITY: f64 = 0.5;

/// A stable 32-bit FNV-1a hash of a display name.
///
/// Used instead of the input order to break ties in the first rank, so names
/// like "Authorized" and "Unauthorized" always land in the same relative order.
pub fn stable_name_hash(name: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Groups nodes by rank and orders every rank with the barycenter heuristic.
///
/// Sweeps alternate top-down and bottom-up for at most `iterations` rounds,
/// stopping early once a sweep changes nothing. The ordering with the fewest
/// crossings seen is returned.
///
/// A sweep only replaces an ordering that has strictly more crossings, so an
/// initial ordering without crossings is returned as is and no sweep runs.
pub fn order_ranks(graph: &LayoutGraph, ranks: &[usize], iterations: usize) -> Vec<Vec<usize>> {
    let mut layers = initial_layers(graph, ranks);
    if ranks.len() <= 1 {
        return layers;
    }

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(graph, ranks, &layers);

    for iteration in 0..iterations {
        if best_crossings == 0 {
            break;
        }
        let downward = iteration % 2 == 0;
        let changed = sweep(graph, ranks, &mut layers, downward);
        let crossings = count_crossings(graph, ranks, &layers);
        trace!(iteration, downward, crossings, "Barycenter sweep");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
        if !changed {
            break;
        }
    }
    best
}

fn initial_layers(graph: &LayoutGraph, ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    if let Some(first) = layers.first_mut() {
        first.sort_by_key(|&node| (stable_name_hash(graph.label(node)), node));
    }
    layers
}

/// Reorders every rank once in the given direction. Returns whether any rank changed.
fn sweep(graph: &LayoutGraph, ranks: &[usize], layers: &mut [Vec<usize>], downward: bool) -> bool {
    let depth = layers.len();
    let order: Vec<usize> = if downward {
        (1..depth).collect()
    } else {
        (0..depth.saturating_sub(1)).rev().collect()
    };

    let mut changed = false;
    for rank in order {
        if layers[rank].len() <= 1 {
            continue;
        }
        let coordinates = centered_coordinates(layers);
        let values: Vec<(usize, f64)> = layers[rank]
            .iter()
            .map(|&node| {
                let value = barycenter(graph, ranks, &coordinates, node, rank, downward);
                (node, value)
            })
            .collect();

        let reordered: Vec<usize> = values
            .iter()
            .enumerate()
            .sorted_by(|(pos_a, (node_a, value_a)), (pos_b, (node_b, value_b))| {
                value_a.total_cmp(value_b).then_with(|| {
                    if rank == 0 {
                        stable_name_hash(graph.label(*node_a))
                            .cmp(&stable_name_hash(graph.label(*node_b)))
                            .then(pos_a.cmp(pos_b))
                    } else {
                        pos_a.cmp(pos_b)
                    }
                })
            })
            .map(|(_, (node, _))| *node)
            .collect();

        if reordered != layers[rank] {
            layers[rank] = reordered;
            changed = true;
        }
    }
    changed
}

/// Each node's position within its rank, centred on zero so ranks of
/// different widths are comparable.
fn centered_coordinates(layers: &[Vec<usize>]) -> Vec<f64> {
    let size = layers.iter().map(Vec::len).sum::<usize>();
    let mut coordinates = vec![0.0; size];
    for layer in layers {
        let center = (layer.len() as f64 - 1.0) / 2.0;
        for (slot, &node) in layer.iter().enumerate() {
            coordinates[node] = slot as f64 - center;
        }
    }
    coordinates
}

/// Weighted average position of `node`'s neighbours in the already-ordered
/// ranks, blended with the positions of siblings that share a parent.
fn barycenter(
    graph: &LayoutGraph,
    ranks: &[usize],
    coordinates: &[f64],
    node: usize,
    rank: usize,
    downward: bool,
) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for &(neighbor, weight) in graph.neighbors(node) {
        let neighbor_rank = ranks[neighbor];
        let ordered = if downward {
            neighbor_rank < rank
        } else {
            neighbor_rank > rank
        };
        if !ordered {
            continue;
        }
        // Long edges pull less than edges to the adjacent rank.
        let span = neighbor_rank.abs_diff(rank) as f64;
        weighted += weight / span * coordinates[neighbor];
        total += weight / span;
    }

    for sibling in siblings(graph, ranks, node, rank) {
        weighted += SIBLING_AFFINITY * coordinates[sibling];
        total += SIBLING_AFFINITY;
    }

    if total > 0.0 {
        weighted / total
    } else {
        coordinates[node]
    }
}

/// Other nodes of the same rank that share at least one parent with `node`.
fn siblings<'g>(
    graph: &'g LayoutGraph,
    ranks: &'g [usize],
    node: usize,
    rank: usize,
) -> impl Iterator<Item = usize> + 'g {
    graph
        .incoming(node)
        .iter()
        .flat_map(move |&(parent, _)| graph.outgoing(parent).iter().map(|&(child, _)| child))
        .filter(move |&child| child != node && ranks[child] == rank)
        .unique()
}

/// Counts crossings between edges joining adjacent ranks.
pub fn count_crossings(graph: &LayoutGraph, ranks: &[usize], layers: &[Vec<usize>]) -> usize {
    let mut slots = vec![0usize; ranks.len()];
    for layer in layers {
        for (slot, &node) in layer.iter().enumerate() {
            slots[node] = slot;
        }
    }
    let slots = &slots;

    let mut crossings = 0;
    for rank in 0..layers.len().saturating_sub(1) {
        let segments: Vec<(usize, usize)> = layers[rank]
            .iter()
            .flat_map(|&upper| {
                graph
                    .neighbors(upper)
                    .filter(move |&&(lower, _)| ranks[lower] == rank + 1)
                    .map(move |&(lower, _)| (slots[upper], slots[lower]))
            })
            .collect();

        crossings += segments
            .iter()
            .tuple_combinations()
            .filter(|((a_top, a_bottom), (b_top, b_bottom))| {
                matches!(
                    (a_top.cmp(b_top), a_bottom.cmp(b_bottom)),
                    (Ordering::Less, Ordering::Greater) | (Ordering::Greater, Ordering::Less)
                )
            })
            .count();
    }
    crossings
}
