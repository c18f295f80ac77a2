use orx_priority_queue::*;

use crate::adjacency::{AdjacencyGraph, Cost, NodeId};

/// Unrestricted Dijkstra (U-turns allowed) from `start` to all nodes.
/// Returns distances indexed by node id, `f64::INFINITY` when unreachable.
pub fn dijkstra_all(graph: &AdjacencyGraph, start: NodeId) -> Vec<Cost> {
    let adj = graph.adjacency();
    let mut dist = vec![f64::INFINITY; adj.len()];
    let mut pq: BinaryHeapWithMap<NodeId, Cost> = BinaryHeapWithMap::new();

    dist[start] = 0.0;
    pq.decrease_key_or_push(&start, 0.0);

    while let Some((node_id, cost)) = pq.pop() {
        for &(next, w) in &adj[node_id] {
            let next_cost = cost + w;
            if next_cost < dist[next] {
                dist[next] = next_cost;
                pq.decrease_key_or_push(&next, next_cost);
            }
        }
    }
    dist
}
