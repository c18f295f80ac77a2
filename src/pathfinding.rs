//! Dijkstra-style search that never immediately reverses the edge it just used.
//!
//! The sweep keeps three pieces of state: the frontier (a [`MinPQueue`] keyed by tentative
//! distance), the settled distances, and the [`PathInfo`] map of best known path ends.
//! When a vertex is settled, edges leading back to the source of its last edge are skipped.
//! For the source itself, the caller may supply the edge it arrived by, which blocks the
//! first step from turning straight around.

use hashbrown::HashMap;
use std::collections::VecDeque;

use crate::graph::{Edge, PathEnd, PathInfo, Vertex};
use crate::min_pqueue::MinPQueue;

/// Shortest non-backtracking path from `src` to `dst`.
///
/// Returns `None` when no such path exists and `Some(vec![])` when `src == dst`. The first
/// edge never leads back to `previous_edge.src()`. Requires `previous_edge.dst() == src`.
pub fn shortest_non_backtracking_path<V: Vertex>(
    src: &V,
    dst: &V,
    previous_edge: Option<&V::Edge>,
) -> Option<Vec<V::Edge>> {
    let info = path_info(src, previous_edge);
    path_to(&info, src, dst)
}

/// Like [`shortest_non_backtracking_path`], but stops the sweep as soon as `dst` is settled.
pub fn find_non_backtracking_path<V: Vertex>(
    src: &V,
    dst: &V,
    previous_edge: Option<&V::Edge>,
) -> Option<Vec<V::Edge>> {
    let info = path_info_until(src, dst, previous_edge);
    path_to(&info, src, dst)
}

/// Compute a [`PathEnd`] for every vertex reachable from `src` along a non-backtracking path.
///
/// Always sweeps the whole reachable region. Requires `previous_edge.dst() == src`.
pub fn path_info<V: Vertex>(src: &V, previous_edge: Option<&V::Edge>) -> PathInfo<V> {
    sweep(src, previous_edge, None)
}

/// Like [`path_info`], but returns once `dst` is settled.
///
/// Entries for `dst` and every vertex on its path are final; other entries may still be
/// tentative, and vertices beyond the settled region are missing.
pub fn path_info_until<V: Vertex>(
    src: &V,
    dst: &V,
    previous_edge: Option<&V::Edge>,
) -> PathInfo<V> {
    sweep(src, previous_edge, Some(dst))
}

/// Rebuild the path from `src` to `dst` by following the backpointers in `info`.
///
/// `info` must come from a search rooted at `src`. Returns `None` if `dst` is not in it.
pub fn path_to<V: Vertex>(info: &PathInfo<V>, src: &V, dst: &V) -> Option<Vec<V::Edge>> {
    let mut path = VecDeque::new();
    let mut current = dst.clone();
    while current != *src {
        let edge = info.get(&current)?.last_edge()?.clone();
        current = edge.src();
        path.push_front(edge);
    }
    Some(path.into())
}

fn sweep<V: Vertex>(src: &V, previous_edge: Option<&V::Edge>, target: Option<&V>) -> PathInfo<V> {
    debug_assert!(
        previous_edge.map_or(true, |e| e.dst() == *src),
        "previous edge must end at the source"
    );

    // Populated on discovery, not on settlement.
    let mut info: PathInfo<V> = HashMap::new();
    let mut frontier = MinPQueue::new();
    let mut settled: HashMap<V, f64> = HashMap::new();

    info.insert(src.clone(), PathEnd::source());
    frontier.add_or_update(src.clone(), 0.0);

    while let Ok(vertex) = frontier.remove() {
        let distance = info.get(&vertex).map_or(0.0, PathEnd::distance);
        settled.insert(vertex.clone(), distance);
        if target == Some(&vertex) {
            break;
        }

        // The one neighbor this vertex may not step to.
        let came_from = if vertex == *src {
            previous_edge.map(Edge::src)
        } else {
            info.get(&vertex)
                .and_then(PathEnd::last_edge)
                .map(Edge::src)
        };

        for edge in vertex.outgoing_edges() {
            let neighbor = edge.dst();
            if came_from.as_ref() == Some(&neighbor) {
                continue;
            }

            let candidate = distance + edge.weight();
            if settled.get(&neighbor).is_some_and(|&d| d <= candidate) {
                continue;
            }

            let improves = info
                .get(&neighbor)
                .map_or(true, |end| candidate < end.distance());
            if improves {
                info.insert(neighbor.clone(), PathEnd::via(candidate, edge));
                frontier.add_or_update(neighbor, candidate);
            }
        }
    }

    tracing::debug!(
        settled = settled.len(),
        discovered = info.len(),
        early_exit = target.is_some(),
        "non-backtracking sweep finished"
    );
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::{AdjacencyGraph, Link, Node};
    use crate::baseline::dijkstra_all;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Strongly connected: three vertices, four directed edges.
    const GRAPH1: &str = "
        A -> B 2
        A -- C 6
        B -> C 3
    ";

    const GRAPH2: &str = "
        A -> B 9
        A -> C 14
        A -> D 15
        B -> E 23
        C -> E 17
        C -> D 5
        C -> F 30
        D -> F 20
        D -> G 37
        E -> F 3
        E -> G 20
        F -> G 16
    ";

    fn v<'g>(g: &'g AdjacencyGraph, label: &str) -> Node<'g> {
        g.vertex(label).unwrap()
    }

    fn e<'g>(g: &'g AdjacencyGraph, src: &str, dst: &str) -> Link<'g> {
        g.edge(v(g, src), v(g, dst)).unwrap()
    }

    fn cost(path: &[Link<'_>]) -> f64 {
        path.iter().map(Edge::weight).sum()
    }

    /// Check contiguity and endpoints, then return the visited labels.
    fn labels_along(path: &[Link<'_>], src: Node<'_>, dst: Node<'_>) -> Vec<String> {
        assert_eq!(path.first().unwrap().src(), src);
        assert_eq!(path.last().unwrap().dst(), dst);
        for pair in path.windows(2) {
            assert_eq!(pair[0].dst(), pair[1].src());
        }
        std::iter::once(src.label())
            .chain(path.iter().map(|l| l.dst().label()))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn strongly_connected_without_previous_edge() {
        let g = AdjacencyGraph::from_text(GRAPH1).unwrap();
        let (a, b, c) = (v(&g, "A"), v(&g, "B"), v(&g, "C"));

        let paths = path_info(&a, None);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[&a].distance(), 0.0);
        assert!(paths[&a].last_edge().is_none());
        assert_eq!(paths[&b].distance(), 2.0);
        assert_eq!(paths[&b].last_edge(), Some(&e(&g, "A", "B")));
        assert_eq!(paths[&c].distance(), 5.0);
        assert_eq!(paths[&c].last_edge(), Some(&e(&g, "B", "C")));

        let paths = path_info(&b, None);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[&a].distance(), 9.0);
        assert_eq!(paths[&a].last_edge(), Some(&e(&g, "C", "A")));
        assert_eq!(paths[&c].distance(), 3.0);

        let paths = path_info(&c, None);
        assert_eq!(paths[&a].distance(), 6.0);
        assert_eq!(paths[&b].distance(), 8.0);
        assert_eq!(paths[&b].last_edge(), Some(&e(&g, "A", "B")));
    }

    #[test]
    fn unreachable_vertices_are_absent() {
        let g = AdjacencyGraph::from_text("A -> B 1\nC -> D 1").unwrap();
        let paths = path_info(&v(&g, "A"), None);
        assert_eq!(paths.len(), 2);
        assert!(!paths.contains_key(&v(&g, "C")));
        assert!(!paths.contains_key(&v(&g, "D")));

        let g = AdjacencyGraph::from_text("B -> A 2").unwrap();
        let paths = path_info(&v(&g, "A"), None);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains_key(&v(&g, "A")));
    }

    #[test]
    fn previous_edge_blocks_only_the_u_turn() {
        let g = AdjacencyGraph::from_text(
            "
            A -> B 2
            B -> C 3
            C -> A 4
            ",
        )
        .unwrap();
        let (a, b, c) = (v(&g, "A"), v(&g, "B"), v(&g, "C"));
        let previous = e(&g, "C", "A");

        let paths = path_info(&a, Some(&previous));
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[&b].distance(), 2.0);
        assert_eq!(paths[&c].distance(), 5.0);
        assert_eq!(paths[&c].last_edge(), Some(&e(&g, "B", "C")));
    }

    #[test]
    fn previous_edge_forces_a_detour() {
        let g = AdjacencyGraph::from_text(
            "
            A -- B 1
            A -> C 1
            C -> B 5
            ",
        )
        .unwrap();
        let (a, b) = (v(&g, "A"), v(&g, "B"));
        let previous = e(&g, "B", "A");

        let path = shortest_non_backtracking_path(&a, &b, Some(&previous)).unwrap();
        assert_eq!(labels_along(&path, a, b), ["A", "C", "B"]);
        let path = shortest_non_backtracking_path(&a, &b, None).unwrap();
        assert_eq!(labels_along(&path, a, b), ["A", "B"]);
    }

    #[test]
    fn u_turns_are_never_taken() {
        let g = AdjacencyGraph::from_text(
            "
            A -> B 1
            B -> A 1
            A -> C 10
            C -> D 1
            ",
        )
        .unwrap();
        let paths = path_info(&v(&g, "A"), None);
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[&v(&g, "C")].distance(), 10.0);
        assert_eq!(paths[&v(&g, "D")].distance(), 11.0);
        assert_eq!(paths[&v(&g, "D")].last_edge(), Some(&e(&g, "C", "D")));
    }

    #[test]
    fn longer_path_beats_direct_edge() {
        let g = AdjacencyGraph::from_text(
            "
            A -> B 1
            B -> C 2
            C -> D 3
            D -> E 4
            A -> E 20
            ",
        )
        .unwrap();
        let paths = path_info(&v(&g, "A"), None);
        assert_eq!(paths.len(), 5);
        assert_eq!(paths[&v(&g, "E")].distance(), 10.0);
        assert_eq!(paths[&v(&g, "D")].distance(), 6.0);
        assert_eq!(paths[&v(&g, "C")].distance(), 3.0);
        assert_eq!(paths[&v(&g, "B")].distance(), 1.0);
    }

    #[test]
    fn multi_edge_path() {
        let g = AdjacencyGraph::from_text(GRAPH2).unwrap();
        let (a, g_) = (v(&g, "A"), v(&g, "G"));
        let path = shortest_non_backtracking_path(&a, &g_, None).unwrap();
        assert_eq!(labels_along(&path, a, g_), ["A", "C", "E", "F", "G"]);
        assert_eq!(cost(&path), 50.0);
    }

    #[test]
    fn single_edge_path() {
        let g = AdjacencyGraph::from_text("A -> B 5").unwrap();
        let (a, b) = (v(&g, "A"), v(&g, "B"));
        let path = shortest_non_backtracking_path(&a, &b, None).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].src(), a);
        assert_eq!(path[0].dst(), b);
        assert_eq!(path[0].weight(), 5.0);
    }

    #[test]
    fn same_source_and_destination_is_empty_path() {
        let g = AdjacencyGraph::from_text("A -> B 2\nB -> A 3").unwrap();
        let (a, b) = (v(&g, "A"), v(&g, "B"));
        assert_eq!(shortest_non_backtracking_path(&a, &a, None), Some(vec![]));
        let previous = e(&g, "B", "A");
        assert_eq!(
            shortest_non_backtracking_path(&a, &a, Some(&previous)),
            Some(vec![])
        );
        assert_eq!(shortest_non_backtracking_path(&b, &b, None), Some(vec![]));
    }

    #[test]
    fn no_path_at_all() {
        let g = AdjacencyGraph::from_text("B -> A 2").unwrap();
        assert_eq!(
            shortest_non_backtracking_path(&v(&g, "A"), &v(&g, "B"), None),
            None
        );
    }

    #[test]
    fn u_turn_rule_can_remove_the_only_path() {
        let g = AdjacencyGraph::from_text("A -> B 1\nB -> A 1").unwrap();
        let (a, b) = (v(&g, "A"), v(&g, "B"));
        let previous = e(&g, "B", "A");
        assert_eq!(shortest_non_backtracking_path(&a, &b, Some(&previous)), None);
        assert!(shortest_non_backtracking_path(&a, &b, None).is_some());
    }

    #[test]
    fn path_to_answers_many_destinations() {
        let g = AdjacencyGraph::from_text(GRAPH2).unwrap();
        let a = v(&g, "A");
        let info = path_info(&a, None);
        for dst in g.nodes() {
            let path = path_to(&info, &a, &dst).unwrap();
            assert_eq!(cost(&path), info[&dst].distance());
            if dst != a {
                labels_along(&path, a, dst);
            }
        }
    }

    #[test]
    fn early_exit_agrees_with_full_sweep() {
        let g = AdjacencyGraph::from_text(GRAPH2).unwrap();
        let a = v(&g, "A");
        for dst in g.nodes() {
            let full = shortest_non_backtracking_path(&a, &dst, None).unwrap();
            let early = find_non_backtracking_path(&a, &dst, None).unwrap();
            assert_eq!(cost(&full), cost(&early));
        }
        let partial = path_info_until(&a, &v(&g, "B"), None);
        assert!(!partial.contains_key(&v(&g, "G")));
    }

    const DIAMOND: &str = "
        A -> B 5
        A -> C 5
        B -> D 5
        C -> D 5
    ";

    /// Either route through the diamond is acceptable.
    fn assert_diamond_path(g: &AdjacencyGraph, path: &[Link<'_>]) {
        let (a, d) = (v(g, "A"), v(g, "D"));
        assert_eq!(path.len(), 2);
        assert_eq!(cost(path), 10.0);
        let labels = labels_along(path, a, d);
        assert!(labels[1] == "B" || labels[1] == "C", "went through {}", labels[1]);
    }

    #[test]
    fn tied_paths_return_either() {
        let g = AdjacencyGraph::from_text(DIAMOND).unwrap();
        let (a, d) = (v(&g, "A"), v(&g, "D"));

        let path = shortest_non_backtracking_path(&a, &d, None).unwrap();
        assert_diamond_path(&g, &path);
        assert_eq!(path_info(&a, None)[&d].distance(), 10.0);
    }

    #[test]
    fn tied_paths_with_early_exit() {
        let g = AdjacencyGraph::from_text(DIAMOND).unwrap();
        let (a, d) = (v(&g, "A"), v(&g, "D"));

        let path = find_non_backtracking_path(&a, &d, None).unwrap();
        assert_diamond_path(&g, &path);

        let info = path_info_until(&a, &d, None);
        assert_eq!(info[&d].distance(), 10.0);
        let path = path_to(&info, &a, &d).unwrap();
        assert_diamond_path(&g, &path);
    }

    #[test]
    fn zero_weight_cycle_terminates() {
        let g = AdjacencyGraph::from_text("A -> B 0\nB -> C 0\nC -> A 0\nC -> D 0").unwrap();
        let paths = path_info(&v(&g, "A"), None);
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[&v(&g, "D")].distance(), 0.0);
        assert!(paths[&v(&g, "A")].last_edge().is_none());
    }

    #[test]
    fn never_shorter_than_unrestricted_dijkstra() {
        let mut rng = StdRng::seed_from_u64(2110);
        for _ in 0..20 {
            let mut g = AdjacencyGraph::new();
            let n = 30;
            for i in 0..n {
                g.add_vertex(&format!("v{i}"));
            }
            for _ in 0..90 {
                let (s, d) = (rng.random_range(0..n), rng.random_range(0..n));
                if s != d {
                    g.add_edge(s, d, rng.random_range(0.0..10.0));
                }
            }
            let src = g.node(0);
            let unrestricted = dijkstra_all(&g, 0);
            let info = path_info(&src, None);
            for dst in g.nodes() {
                match info.get(&dst) {
                    Some(end) => {
                        assert!(end.distance() >= unrestricted[dst.id()] - 1e-9);
                        let path = path_to(&info, &src, &dst).unwrap();
                        for pair in path.windows(2) {
                            assert_eq!(pair[0].dst(), pair[1].src());
                            assert_ne!(pair[1].dst(), pair[0].src());
                        }
                    }
                    None => assert!(dst != src),
                }
            }
        }
    }

    #[test]
    fn searches_run_in_parallel() {
        let g = AdjacencyGraph::from_text(GRAPH2).unwrap();
        let labels = ["A", "B", "C", "D"];
        let totals: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = labels
                .iter()
                .map(|&label| {
                    let g = &g;
                    s.spawn(move || path_info(&v(g, label), None).len())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let sequential: Vec<usize> = labels
            .iter()
            .map(|&label| path_info(&v(&g, label), None).len())
            .collect();
        assert_eq!(totals, sequential);
    }
}
