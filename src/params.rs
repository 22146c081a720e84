//! Search types and retrieval parameters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::GraphStoreError;
use crate::types::{Filter, QueryOptions};

/// Closed set of retrieval strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Similarity,
    SimilarityScoreThreshold,
    Mmr,
    Traversal,
    MmrTraversal,
}

impl SearchType {
    pub const ALL: [SearchType; 5] = [
        SearchType::Similarity,
        SearchType::SimilarityScoreThreshold,
        SearchType::Mmr,
        SearchType::Traversal,
        SearchType::MmrTraversal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Similarity => "similarity",
            SearchType::SimilarityScoreThreshold => "similarity_score_threshold",
            SearchType::Mmr => "mmr",
            SearchType::Traversal => "traversal",
            SearchType::MmrTraversal => "mmr_traversal",
        }
    }

    /// "similarity, similarity_score_threshold, mmr, traversal, mmr_traversal"
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for SearchType {
    fn default() -> Self {
        SearchType::Traversal
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = GraphStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GraphStoreError::InvalidSearchType(s.to_string()))
    }
}

/// Parameter mapping accepted by `search` and the retriever.
///
/// Keys the core does not recognise are kept in `extra` and handed to
/// the backend untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchKwargs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjacent_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_mult: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_roots: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchKwargs {
    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn fetch_k(mut self, fetch_k: usize) -> Self {
        self.fetch_k = Some(fetch_k);
        self
    }

    pub fn adjacent_k(mut self, adjacent_k: usize) -> Self {
        self.adjacent_k = Some(adjacent_k);
        self
    }

    pub fn lambda_mult(mut self, lambda_mult: f32) -> Self {
        self.lambda_mult = Some(lambda_mult);
        self
    }

    pub fn score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = Some(score_threshold);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn initial_roots(mut self, roots: Vec<String>) -> Self {
        self.initial_roots = Some(roots);
        self
    }

    pub(crate) fn options(&self) -> QueryOptions {
        QueryOptions {
            filter: self.filter.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// Parameters of a traversal search
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalParams {
    /// Nodes fetched by the initial similarity search
    pub k: usize,
    /// Maximum edge hops from the similarity frontier
    pub depth: usize,
    pub options: QueryOptions,
}

impl Default for TraversalParams {
    fn default() -> Self {
        Self {
            k: 4,
            depth: 1,
            options: QueryOptions::default(),
        }
    }
}

impl From<&SearchKwargs> for TraversalParams {
    fn from(kwargs: &SearchKwargs) -> Self {
        let defaults = Self::default();
        Self {
            k: kwargs.k.unwrap_or(defaults.k),
            depth: kwargs.depth.unwrap_or(defaults.depth),
            options: kwargs.options(),
        }
    }
}

/// Parameters of an MMR-traversal search
#[derive(Debug, Clone, PartialEq)]
pub struct MmrTraversalParams {
    /// Ids whose neighbourhoods seed the candidate pool
    pub initial_roots: Vec<String>,
    pub k: usize,
    pub depth: usize,
    /// Candidates fetched by similarity; 0 skips the similarity search
    pub fetch_k: usize,
    /// Neighbours fetched per expansion
    pub adjacent_k: usize,
    /// 1.0 = pure similarity, 0.0 = maximum diversity
    pub lambda_mult: f32,
    /// Inclusive lower bound on query similarity
    pub score_threshold: f32,
    pub options: QueryOptions,
}

impl Default for MmrTraversalParams {
    fn default() -> Self {
        Self {
            initial_roots: Vec::new(),
            k: 4,
            depth: 2,
            fetch_k: 100,
            adjacent_k: 10,
            lambda_mult: 0.5,
            score_threshold: f32::NEG_INFINITY,
            options: QueryOptions::default(),
        }
    }
}

impl From<&SearchKwargs> for MmrTraversalParams {
    fn from(kwargs: &SearchKwargs) -> Self {
        let defaults = Self::default();
        Self {
            initial_roots: kwargs.initial_roots.clone().unwrap_or_default(),
            k: kwargs.k.unwrap_or(defaults.k),
            depth: kwargs.depth.unwrap_or(defaults.depth),
            fetch_k: kwargs.fetch_k.unwrap_or(defaults.fetch_k),
            adjacent_k: kwargs.adjacent_k.unwrap_or(defaults.adjacent_k),
            lambda_mult: kwargs.lambda_mult.unwrap_or(defaults.lambda_mult),
            score_threshold: kwargs.score_threshold.unwrap_or(defaults.score_threshold),
            options: kwargs.options(),
        }
    }
}

/// Defaults of the depth-0 MMR entry point
pub const DEFAULT_MMR_FETCH_K: usize = 20;
pub const DEFAULT_K: usize = 4;
