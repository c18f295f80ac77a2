//! Shortest non-backtracking paths over weighted directed graphs.
//!
//! - [`MinPQueue`]: indexed binary min-heap with O(log n) decrease/increase-key.
//! - [`Vertex`] / [`Edge`]: the capability contracts a graph must implement to be searched.
//! - [`path_info`] / [`shortest_non_backtracking_path`]: Dijkstra that never takes an
//!   immediate U-turn, plus early-exit variants.
//! - [`AdjacencyGraph`]: a labelled adjacency-list graph implementing the contracts.

pub mod adjacency;
pub mod baseline;
pub mod error;
pub mod graph;
pub mod logging;
pub mod min_pqueue;
pub mod pathfinding;

pub use adjacency::{AdjacencyGraph, Link, Node};
pub use error::{EmptyQueue, GraphError};
pub use graph::{Edge, PathEnd, PathInfo, Vertex};
pub use min_pqueue::MinPQueue;
pub use pathfinding::{
    find_non_backtracking_path, path_info, path_info_until, path_to,
    shortest_non_backtracking_path,
};
