//! Brute-force in-memory backend

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::backend::GraphBackend;
use crate::embeddings::Embeddings;
use crate::links::has_edge;
use crate::scoring::cosine_similarity;
use crate::types::{Filter, Node, QueryOptions, ScoredNode};

struct StoredNode {
    node: Node,
    embedding: Vec<f32>,
}

/// Nodes in insertion order plus an id -> position index
#[derive(Default)]
struct NodeTable {
    nodes: Vec<StoredNode>,
    positions: HashMap<String, usize>,
}

impl NodeTable {
    fn get(&self, id: &str) -> Option<&StoredNode> {
        self.positions.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Insert, or replace in place when the id is already stored
    fn upsert(&mut self, id: String, stored: StoredNode) {
        match self.positions.get(&id) {
            Some(&pos) => self.nodes[pos] = stored,
            None => {
                self.positions.insert(id, self.nodes.len());
                self.nodes.push(stored);
            }
        }
    }
}

/// Keeps every node and its embedding in a vector and answers queries by
/// scanning it. Filters match when every filter key equals the node's
/// metadata value.
pub struct InMemoryBackend {
    embeddings: Arc<dyn Embeddings>,
    table: RwLock<NodeTable>,
}

impl InMemoryBackend {
    pub fn new(embeddings: Arc<dyn Embeddings>) -> Self {
        Self {
            embeddings,
            table: RwLock::new(NodeTable::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().map(|t| t.nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn rank(
        &self,
        query: &str,
        limit: Option<usize>,
        options: &QueryOptions,
        mut keep: impl FnMut(&StoredNode) -> bool,
    ) -> Result<Vec<ScoredNode>> {
        let query_embedding = self.embeddings.embed_query(query)?;
        let table = self.table.read().map_err(|_| anyhow!("node table lock poisoned"))?;

        let mut scored: Vec<ScoredNode> = table
            .nodes
            .iter()
            .filter(|s| matches_filter(&s.node, options.filter.as_ref()))
            .filter(|s| keep(s))
            .map(|s| ScoredNode {
                node: s.node.clone(),
                score: cosine_similarity(&query_embedding, &s.embedding),
                embedding: s.embedding.clone(),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        if let Some(limit) = limit {
            scored.truncate(limit);
        }
        Ok(scored)
    }
}

impl GraphBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    fn similarity(&self, query: &str, k: usize, options: &QueryOptions) -> Result<Vec<ScoredNode>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        self.rank(query, Some(k), options, |_| true)
    }

    fn adjacent(
        &self,
        node_id: &str,
        query: &str,
        limit: Option<usize>,
        options: &QueryOptions,
    ) -> Result<Vec<ScoredNode>> {
        let source_links = {
            let table = self.table.read().map_err(|_| anyhow!("node table lock poisoned"))?;
            match table.get(node_id) {
                Some(s) => s.node.links.clone(),
                None => return Ok(Vec::new()),
            }
        };
        if source_links.is_empty() || limit == Some(0) {
            return Ok(Vec::new());
        }

        let found = self.rank(query, limit, options, |s| {
            s.node.id.as_deref() != Some(node_id) && has_edge(&source_links, &s.node.links)
        })?;
        debug!("{} adjacent to {}", found.len(), node_id);
        Ok(found)
    }

    fn persist(&self, nodes: Vec<Node>) -> Result<Vec<String>> {
        let texts: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
        let vectors = self.embeddings.embed_documents(&texts)?;
        if vectors.len() != nodes.len() {
            anyhow::bail!(
                "embedding provider returned {} vectors for {} nodes",
                vectors.len(),
                nodes.len()
            );
        }

        let mut table = self.table.write().map_err(|_| anyhow!("node table lock poisoned"))?;
        let mut ids = Vec::with_capacity(nodes.len());
        for (mut node, embedding) in nodes.into_iter().zip(vectors) {
            let id = node
                .id
                .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
                .clone();
            table.upsert(id.clone(), StoredNode { node, embedding });
            ids.push(id);
        }
        Ok(ids)
    }
}

fn matches_filter(node: &Node, filter: Option<&Filter>) -> bool {
    filter.map_or(true, |f| {
        f.iter()
            .all(|(key, expected)| node.metadata.get(key).unwrap_or(&Value::Null) == expected)
    })
}
