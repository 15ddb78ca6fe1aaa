//! Rank assignment: the topological level of every node.

use super::graph::LayoutGraph;
use std::collections::VecDeque;
use tracing::trace;

/// Successor lists with cycle-closing edges removed.
pub(super) type Dag = Vec<Vec<(usize, f64)>>;

/// Assigns a rank to every node of `graph`, indexed like the graph.
///
/// Sources seed rank 0 and every other node sits one below its deepest
/// predecessor (longest path). Up to `passes` refinement passes then pull
/// nodes toward the weighted average of their neighbours without ever moving
/// a node above `rank(predecessor) + 1` or below `rank(successor) - 1`.
/// Edges that close a cycle are ignored; for every remaining edge `u -> v`,
/// `rank(v) >= rank(u) + 1`.
pub fn assign_ranks(graph: &LayoutGraph, passes: usize) -> Vec<usize> {
    if graph.is_empty() {
        return Vec::new();
    }
    let dag = acyclic_successors(graph);
    let order = topological_order(&dag);
    let mut ranks = longest_path_ranks(&dag, &order);
    optimize_ranks(&dag, &order, &mut ranks, passes);
    normalize(&mut ranks);
    ranks
}

/// Nodes that start the propagation: those without incoming edges, or, when
/// every node has one, those with the fewest.
pub(super) fn seeds(graph: &LayoutGraph) -> Vec<usize> {
    let in_degree = |node: usize| graph.incoming(node).len();
    let min_degree = (0..graph.len()).map(in_degree).min().unwrap_or(0);
    (0..graph.len())
        .filter(|&node| in_degree(node) == min_degree)
        .collect()
}

/// Drops every edge that points back to a node on the current DFS path.
///
/// The DFS starts from the seeds in order, then from any node not yet
/// visited, so the result is deterministic.
pub(super) fn acyclic_successors(graph: &LayoutGraph) -> Dag {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let n = graph.len();
    let mut marks = vec![Mark::Unvisited; n];
    let mut dag: Dag = vec![Vec::new(); n];
    let starts = seeds(graph).into_iter().chain(0..n);

    for start in starts {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut stack = vec![(start, 0usize)];
        marks[start] = Mark::OnPath;
        while let Some((node, child)) = stack.pop() {
            let Some(&(next, weight)) = graph.outgoing(node).get(child) else {
                marks[node] = Mark::Done;
                continue;
            };
            stack.push((node, child + 1));
            match marks[next] {
                Mark::OnPath => {
                    trace!(from = graph.id(node), to = graph.id(next), "Ignoring cycle edge for ranking");
                }
                Mark::Done => dag[node].push((next, weight)),
                Mark::Unvisited => {
                    dag[node].push((next, weight));
                    marks[next] = Mark::OnPath;
                    stack.push((next, 0));
                }
            }
        }
    }
    dag
}

fn predecessors(dag: &Dag) -> Dag {
    let mut preds: Dag = vec![Vec::new(); dag.len()];
    for (node, successors) in dag.iter().enumerate() {
        for &(next, weight) in successors {
            preds[next].push((node, weight));
        }
    }
    preds
}

fn topological_order(dag: &Dag) -> Vec<usize> {
    let mut in_degree = vec![0usize; dag.len()];
    for successors in dag {
        for &(next, _) in successors {
            in_degree[next] += 1;
        }
    }
    let mut queue: VecDeque<usize> = (0..dag.len()).filter(|&n| in_degree[n] == 0).collect();
    let mut order = Vec::with_capacity(dag.len());
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &(next, _) in &dag[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }
    order
}

fn longest_path_ranks(dag: &Dag, order: &[usize]) -> Vec<usize> {
    let mut ranks = vec![0usize; dag.len()];
    for &node in order {
        for &(next, _) in &dag[node] {
            ranks[next] = ranks[next].max(ranks[node] + 1);
        }
    }
    ranks
}

/// Shortens edges by moving nodes toward their neighbours' weighted rank.
fn optimize_ranks(dag: &Dag, order: &[usize], ranks: &mut [usize], passes: usize) {
    let preds = predecessors(dag);
    for pass in 0..passes {
        let mut changed = false;
        for &node in order {
            let lower = preds[node]
                .iter()
                .map(|&(p, _)| ranks[p] + 1)
                .max()
                .unwrap_or(0);
            let upper = dag[node]
                .iter()
                .map(|&(s, _)| ranks[s] - 1)
                .min()
                .unwrap_or(usize::MAX);

            let mut weighted = 0.0;
            let mut total = 0.0;
            for &(p, w) in &preds[node] {
                weighted += w * (ranks[p] + 1) as f64;
                total += w;
            }
            for &(s, w) in &dag[node] {
                weighted += w * (ranks[s] - 1) as f64;
                total += w;
            }
            if total <= 0.0 {
                continue;
            }

            let target = ((weighted / total).round().max(0.0) as usize).clamp(lower, upper.max(lower));
            if target != ranks[node] {
                ranks[node] = target;
                changed = true;
            }
        }
        if !changed {
            trace!(pass, "Rank optimization converged");
            break;
        }
    }
}

fn normalize(ranks: &mut [usize]) {
    let min = ranks.iter().copied().min().unwrap_or(0);
    if min > 0 {
        ranks.iter_mut().for_each(|rank| *rank -= min);
    }
}
