use crate::graph::{Edge, FollowType, Node};
use ahash::AHashMap;

/// Edge priority used to keep important flows straight.
pub fn edge_weight(edge: &Edge) -> f64 {
    match edge.data.follow_type {
        FollowType::Trigger => 4.0,
        _ if edge.data.condition.is_some() => 3.0,
        FollowType::First => 2.0,
        FollowType::All => 1.0,
    }
}

/// Index-based adjacency over the nodes taking part in a layout.
///
/// Node `i` is the `i`-th node passed to [`LayoutGraph::new`]. Self-loops and
/// edges with an unknown endpoint are dropped; parallel edges are merged and
/// their weights summed.
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    ids: Vec<String>,
    labels: Vec<String>,
    index: AHashMap<String, usize>,
    outgoing: Vec<Vec<(usize, f64)>>,
    incoming: Vec<Vec<(usize, f64)>>,
}

impl LayoutGraph {
    pub fn new<'n, I>(nodes: I, edges: &[Edge]) -> Self
    where
        I: IntoIterator<Item = &'n Node>,
    {
        let mut ids = Vec::new();
        let mut labels = Vec::new();
        let mut index: AHashMap<String, usize> = AHashMap::new();
        for node in nodes {
            if index.contains_key(node.id.as_str()) {
                continue;
            }
            index.insert(node.id.clone(), ids.len());
            ids.push(node.id.clone());
            labels.push(node.label().to_string());
        }

        let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        for edge in edges {
            let (Some(&from), Some(&to)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            let weight = edge_weight(edge);
            add_weighted(&mut outgoing[from], to, weight);
            add_weighted(&mut incoming[to], from, weight);
        }

        Self {
            ids,
            labels,
            index,
            outgoing,
            incoming,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, node: usize) -> &str {
        &self.ids[node]
    }

    pub fn label(&self, node: usize) -> &str {
        &self.labels[node]
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn outgoing(&self, node: usize) -> &[(usize, f64)] {
        &self.outgoing[node]
    }

    pub fn incoming(&self, node: usize) -> &[(usize, f64)] {
        &self.incoming[node]
    }

    /// Every neighbour of `node` regardless of direction.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = &(usize, f64)> {
        self.incoming[node].iter().chain(self.outgoing[node].iter())
    }
}

fn add_weighted(list: &mut Vec<(usize, f64)>, node: usize, weight: f64) {
    match list.iter_mut().find(|(existing, _)| *existing == node) {
        Some((_, total)) => *total += weight,
        None => list.push((node, weight)),
    }
}
