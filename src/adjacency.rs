//! Labelled adjacency-list graph implementing the [`Vertex`] / [`Edge`] contracts.
//!
//! Vertices are dense ids with string labels; each id owns a list of `(dst, weight)` pairs.
//! Searches run over borrowed [`Node`] handles, so a graph can be searched from many
//! threads at once as long as nobody mutates it.

use fnv::FnvHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::GraphError;
use crate::graph::{Edge, Vertex};

pub type NodeId = usize;
pub type Cost = f64;

#[derive(Debug, Default, Clone)]
pub struct AdjacencyGraph {
    labels: Vec<String>,
    ids: FnvHashMap<String, NodeId>,
    adj: Vec<Vec<(NodeId, Cost)>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.labels.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    /// Id of the vertex labelled `label`, inserting it if needed.
    pub fn add_vertex(&mut self, label: &str) -> NodeId {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.labels.len();
        self.labels.push(label.to_owned());
        self.ids.insert(label.to_owned(), id);
        self.adj.push(Vec::new());
        id
    }

    /// Add a directed edge. Panics if either id is out of range.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, weight: Cost) {
        assert!(src < self.adj.len(), "unknown source id {src}");
        assert!(dst < self.adj.len(), "unknown destination id {dst}");
        self.adj[src].push((dst, weight));
    }

    /// Add a pair of opposite directed edges with the same weight.
    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId, weight: Cost) {
        self.add_edge(a, b, weight);
        self.add_edge(b, a, weight);
    }

    pub fn vertex(&self, label: &str) -> Option<Node<'_>> {
        self.ids.get(label).map(|&id| self.node(id))
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        assert!(id < self.labels.len(), "unknown vertex id {id}");
        Node { graph: self, id }
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        (0..self.labels.len()).map(move |id| Node { graph: self, id })
    }

    /// The first edge from `src` to `dst`, if any.
    pub fn edge<'g>(&'g self, src: Node<'g>, dst: Node<'g>) -> Option<Link<'g>> {
        src.outgoing_edges().find(|e| e.dst == dst)
    }

    pub fn adjacency(&self) -> &[Vec<(NodeId, Cost)>] {
        &self.adj
    }

    /// Parse one edge per line: `A -> B [weight]` for a directed edge, `A -- B [weight]`
    /// for both directions. Weight defaults to 1. Blank lines and `#` comments are skipped.
    pub fn from_text(text: &str) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for (n, raw) in text.lines().enumerate() {
            let line = n + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            let tokens: Vec<&str> = content.split_whitespace().collect();
            let (src, connector, dst, weight) = match tokens.as_slice() {
                [src, connector, dst] => (*src, *connector, *dst, None),
                [src, connector, dst, weight] => (*src, *connector, *dst, Some(*weight)),
                _ => return Err(GraphError::Malformed { line }),
            };
            let weight = match weight {
                Some(text) => parse_weight(line, text)?,
                None => 1.0,
            };
            let (v, w) = (graph.add_vertex(src), graph.add_vertex(dst));
            match connector {
                "->" => graph.add_edge(v, w, weight),
                "--" => graph.add_undirected_edge(v, w, weight),
                other => {
                    return Err(GraphError::UnknownConnector {
                        line,
                        connector: other.to_owned(),
                    })
                }
            }
        }
        Ok(graph)
    }

    /// Read `src,dst,weight` records following a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut graph = Self::new();
        for (n, result) in rdr.records().enumerate() {
            let record = result?;
            // header is line 1
            let line = n + 2;
            let (Some(src), Some(dst), Some(weight)) = (record.get(0), record.get(1), record.get(2))
            else {
                return Err(GraphError::Malformed { line });
            };
            let weight = parse_weight(line, weight)?;
            let (v, w) = (graph.add_vertex(src), graph.add_vertex(dst));
            graph.add_edge(v, w, weight);
        }
        Ok(graph)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}

fn parse_weight(line: usize, text: &str) -> Result<Cost, GraphError> {
    let weight: Cost = text.parse().map_err(|_| GraphError::UnparsableWeight {
        line,
        text: text.to_owned(),
    })?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(GraphError::InvalidWeight { line, weight });
    }
    Ok(weight)
}

/// Vertex handle borrowed from an [`AdjacencyGraph`].
#[derive(Clone, Copy)]
pub struct Node<'g> {
    graph: &'g AdjacencyGraph,
    id: NodeId,
}

impl<'g> Node<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &'g str {
        &self.graph.labels[self.id]
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.graph, other.graph)
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'g> Vertex for Node<'g> {
    type Edge = Link<'g>;

    fn outgoing_edges(&self) -> impl Iterator<Item = Self::Edge> + '_ {
        let src = *self;
        self.graph.adj[self.id]
            .iter()
            .map(move |&(dst, weight)| Link {
                src,
                dst: Node {
                    graph: src.graph,
                    id: dst,
                },
                weight,
            })
    }
}

/// Edge handle borrowed from an [`AdjacencyGraph`].
#[derive(Clone, Copy, PartialEq)]
pub struct Link<'g> {
    src: Node<'g>,
    dst: Node<'g>,
    weight: Cost,
}

impl<'g> Edge for Link<'g> {
    type Vertex = Node<'g>;

    fn src(&self) -> Node<'g> {
        self.src
    }

    fn dst(&self) -> Node<'g> {
        self.dst
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.src, self.dst, self.weight)
    }
}
