//! Lazy result sequences for traversal and MMR-traversal search.
//!
//! Both iterators run their similarity search when created and expand the
//! graph one step per pull. Expansion of a yielded node is deferred until
//! the following pull, so a consumer that stops early never pays for
//! neighbours it will not read.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

use crate::adapters::node_to_document;
use crate::backend::GraphBackend;
use crate::error::{GraphStoreError, Result};
use crate::params::{MmrTraversalParams, TraversalParams};
use crate::selection::MmrSelector;
use crate::types::{Document, Node, QueryOptions};

/// Lazily produced search results
pub type DocumentIter = Box<dyn Iterator<Item = Result<Document>> + Send>;

/// Breadth-first expansion from the similarity frontier.
///
/// Yields the frontier in similarity order, then nodes one hop away, and
/// so on up to `depth` hops. Each id is yielded at most once.
pub struct TraversalIter {
    backend: Arc<dyn GraphBackend>,
    query: String,
    max_depth: usize,
    options: QueryOptions,
    queue: VecDeque<(Node, usize)>,
    visited: HashSet<String>,
    pending: Option<(String, usize)>,
    failed: bool,
}

impl TraversalIter {
    pub fn start(
        backend: Arc<dyn GraphBackend>,
        query: &str,
        params: TraversalParams,
    ) -> Result<Self> {
        let frontier = backend.similarity(query, params.k, &params.options)?;
        debug!(
            "Traversal frontier: {} nodes from {} (depth {})",
            frontier.len(),
            backend.name(),
            params.depth
        );

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        for hit in frontier {
            if first_visit(&mut visited, &hit.node) {
                queue.push_back((hit.node, 0));
            }
        }

        Ok(Self {
            backend,
            query: query.to_string(),
            max_depth: params.depth,
            options: params.options,
            queue,
            visited,
            pending: None,
            failed: false,
        })
    }

    fn expand(&mut self, node_id: &str, depth: usize) -> Result<()> {
        let neighbours = self
            .backend
            .adjacent(node_id, &self.query, None, &self.options)?;
        for hit in neighbours {
            if first_visit(&mut self.visited, &hit.node) {
                self.queue.push_back((hit.node, depth + 1));
            }
        }
        Ok(())
    }
}

impl Iterator for TraversalIter {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some((id, depth)) = self.pending.take() {
            if let Err(e) = self.expand(&id, depth) {
                self.failed = true;
                return Some(Err(e));
            }
        }

        let (node, depth) = self.queue.pop_front()?;
        if depth < self.max_depth {
            if let Some(id) = node.id.clone() {
                self.pending = Some((id, depth));
            }
        }
        Some(Ok(node_to_document(node)))
    }
}

/// MMR selection over a candidate pool that grows as selected nodes are
/// expanded.
pub struct MmrTraversalIter {
    backend: Arc<dyn GraphBackend>,
    query: String,
    k: usize,
    max_depth: usize,
    adjacent_k: usize,
    options: QueryOptions,
    selector: MmrSelector,
    pending: Option<(String, usize)>,
    emitted: usize,
    failed: bool,
}

impl MmrTraversalIter {
    pub fn start(
        backend: Arc<dyn GraphBackend>,
        query: &str,
        params: MmrTraversalParams,
    ) -> Result<Self> {
        let mut selector = MmrSelector::new(params.lambda_mult, params.score_threshold);

        // Roots seed the pool with their neighbourhood but are never candidates themselves
        for root in &params.initial_roots {
            selector.mark_seen(root);
        }
        for root in &params.initial_roots {
            let neighbours =
                backend.adjacent(root, query, Some(params.adjacent_k), &params.options)?;
            selector.add_candidates(neighbours, 0);
        }
        if params.fetch_k > 0 {
            let hits = backend.similarity(query, params.fetch_k, &params.options)?;
            selector.add_candidates(hits, 0);
        }
        debug!(
            "MMR traversal: {} initial candidates ({} roots, fetch_k={}, lambda={})",
            selector.len(),
            params.initial_roots.len(),
            params.fetch_k,
            params.lambda_mult
        );

        Ok(Self {
            backend,
            query: query.to_string(),
            k: params.k,
            max_depth: params.depth,
            adjacent_k: params.adjacent_k,
            options: params.options,
            selector,
            pending: None,
            emitted: 0,
            failed: false,
        })
    }

    fn expand(&mut self, node_id: &str, depth: usize) -> Result<()> {
        let neighbours = self.backend.adjacent(
            node_id,
            &self.query,
            Some(self.adjacent_k),
            &self.options,
        )?;
        let added = self.selector.add_candidates(neighbours, depth + 1);
        debug!("Expanded {} at depth {}: {} new candidates", node_id, depth, added);
        Ok(())
    }
}

impl Iterator for MmrTraversalIter {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.emitted >= self.k {
            return None;
        }
        if let Some((id, depth)) = self.pending.take() {
            if let Err(e) = self.expand(&id, depth) {
                self.failed = true;
                return Some(Err(e));
            }
        }

        let best = self.selector.pop_best()?;
        self.emitted += 1;
        if best.depth < self.max_depth && self.emitted < self.k {
            if let Some(id) = best.node.id.clone() {
                self.pending = Some((id, best.depth));
            }
        }
        Some(Ok(node_to_document(best.node)))
    }
}

/// Id-less nodes cannot be deduplicated and always count as new
fn first_visit(visited: &mut HashSet<String>, node: &Node) -> bool {
    match node.id.as_deref() {
        Some(id) => visited.insert(id.to_string()),
        None => true,
    }
}

/// Collect a lazy sequence, stopping at the first error
pub fn collect_documents(iter: DocumentIter) -> Result<Vec<Document>> {
    iter.collect::<std::result::Result<Vec<_>, GraphStoreError>>()
}
