use thiserror::Error;

/// Returned by queue observers and `remove` when the queue holds no elements.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("priority queue is empty")]
pub struct EmptyQueue;

/// Failures while building an [`AdjacencyGraph`](crate::AdjacencyGraph) from text or CSV.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("line {line}: expected `<src> -> <dst> [weight]` or `<src> -- <dst> [weight]`")]
    Malformed { line: usize },

    #[error("line {line}: unknown edge connector `{connector}` (use `->` or `--`)")]
    UnknownConnector { line: usize, connector: String },

    #[error("line {line}: cannot parse weight `{text}`")]
    UnparsableWeight { line: usize, text: String },

    #[error("line {line}: weight {weight} must be finite and non-negative")]
    InvalidWeight { line: usize, weight: f64 },

    #[error("unknown vertex `{0}`")]
    UnknownVertex(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
