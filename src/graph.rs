//! Capability contracts the search runs against.
//!
//! Any graph representation can be searched as long as its vertex handles implement
//! [`Vertex`] and its edges implement [`Edge`]. See [`crate::adjacency`] for the
//! representation shipped with this crate.

use hashbrown::HashMap;
use std::hash::Hash;

/// A weighted, directed edge.
pub trait Edge {
    type Vertex;

    /// The vertex this edge leaves from.
    fn src(&self) -> Self::Vertex;

    /// The vertex this edge leads to.
    fn dst(&self) -> Self::Vertex;

    /// Must be non-negative; the search assumes it but does not check.
    fn weight(&self) -> f64;
}

/// A vertex handle that can enumerate the edges leaving it.
///
/// Handles are used as hash-map and queue keys, so they should be cheap to clone.
pub trait Vertex: Clone + Eq + Hash {
    type Edge: Edge<Vertex = Self> + Clone;

    /// All edges whose `src` is this vertex, in no particular order.
    fn outgoing_edges(&self) -> impl Iterator<Item = Self::Edge> + '_;
}

/// Best known non-backtracking path from the search source to one vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnd<E> {
    distance: f64,
    last_edge: Option<E>,
}

impl<E> PathEnd<E> {
    pub(crate) fn source() -> Self {
        Self {
            distance: 0.0,
            last_edge: None,
        }
    }

    pub(crate) fn via(distance: f64, last_edge: E) -> Self {
        Self {
            distance,
            last_edge: Some(last_edge),
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The final edge of the path; `None` only for the source itself.
    pub fn last_edge(&self) -> Option<&E> {
        self.last_edge.as_ref()
    }
}

/// Reachability map: every vertex reachable from the source, with its [`PathEnd`].
/// Vertices absent from the map are unreachable.
pub type PathInfo<V> = HashMap<V, PathEnd<<V as Vertex>::Edge>>;
