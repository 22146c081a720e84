//! Storage seam consumed by the graph store.
//!
//! A backend owns persistence, embeddings and the similarity index. The
//! store only relies on these three primitives; everything else (traversal,
//! MMR, adapters) is built on top of them.

use anyhow::Result;

use crate::types::{Node, QueryOptions, ScoredNode};

/// Blocking storage backend. Implementations may do network or disk I/O in
/// every call; async callers reach them through [`crate::bridge`].
///
/// Nodes returned by `similarity` and `adjacent` should carry their stored
/// id. Id-less nodes are still yielded but are neither deduplicated nor
/// expanded.
pub trait GraphBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Up to `k` nodes ranked by similarity to `query`, best first
    fn similarity(&self, query: &str, k: usize, options: &QueryOptions) -> Result<Vec<ScoredNode>>;

    /// Nodes `b` with an edge `node_id -> b`, ranked by similarity to
    /// `query` and truncated to `limit` when given. The node itself is
    /// never included. Unknown ids have no neighbours.
    fn adjacent(
        &self,
        node_id: &str,
        query: &str,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<ScoredNode>>;

    /// Store nodes, returning their ids in input order. Nodes without an id
    /// get one assigned.
    fn persist(&self, nodes: Vec<Node>) -> Result<Vec<String>>;
}
