//! Graph store contract and its backend-driven implementation

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{documents_to_nodes, node_to_document, texts_to_nodes};
use crate::backend::GraphBackend;
use crate::error::Result;
use crate::params::{
    MmrTraversalParams, SearchKwargs, SearchType, TraversalParams, DEFAULT_K, DEFAULT_MMR_FETCH_K,
};
use crate::retriever::GraphStoreRetriever;
use crate::traversal::{collect_documents, DocumentIter, MmrTraversalIter, TraversalIter};
use crate::types::{Document, Metadata, Node, QueryOptions};

/// A vector store whose nodes are connected by links.
///
/// Implementors provide the four required operations; plain similarity and
/// plain MMR search are derived from them with `depth = 0`. All methods
/// block; wrap the store in [`crate::AsyncGraphStore`] to use it from async
/// code.
pub trait GraphStore: Send + Sync {
    /// Store nodes and return their ids in input order
    fn add_nodes(&self, nodes: Vec<Node>) -> Result<Vec<String>>;

    /// Similarity search for `k` roots, then breadth-first expansion up to
    /// `depth` hops.
    fn traversal_search(&self, query: &str, params: TraversalParams) -> Result<DocumentIter>;

    /// MMR selection over a pool grown by expanding selected nodes
    fn mmr_traversal_search(&self, query: &str, params: MmrTraversalParams)
        -> Result<DocumentIter>;

    /// Top `k` documents with their similarity scores
    fn similarity_search_with_scores(
        &self,
        query: &str,
        k: usize,
        options: &QueryOptions,
    ) -> Result<Vec<(Document, f32)>>;

    fn add_texts(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>> {
        let nodes = texts_to_nodes(texts, metadatas, ids)?;
        self.add_nodes(nodes)
    }

    fn add_documents(&self, documents: &[Document]) -> Result<Vec<String>> {
        let nodes = documents_to_nodes(documents)?;
        self.add_nodes(nodes)
    }

    /// Traversal search with `depth = 0`
    fn similarity_search(&self, query: &str, kwargs: &SearchKwargs) -> Result<Vec<Document>> {
        let params = TraversalParams {
            depth: 0,
            ..TraversalParams::from(kwargs)
        };
        collect_documents(self.traversal_search(query, params)?)
    }

    /// Similarity search keeping only scores at or above `score_threshold`
    fn similarity_search_with_relevance_scores(
        &self,
        query: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<(Document, f32)>> {
        let k = kwargs.k.unwrap_or(DEFAULT_K);
        let scored = self.similarity_search_with_scores(query, k, &kwargs.options())?;
        if scored.iter().any(|(_, s)| !(0.0..=1.0).contains(s)) {
            warn!("Relevance scores must be between 0 and 1, got {:?}",
                scored.iter().map(|(_, s)| *s).collect::<Vec<_>>());
        }
        Ok(match kwargs.score_threshold {
            Some(threshold) => scored.into_iter().filter(|(_, s)| *s >= threshold).collect(),
            None => scored,
        })
    }

    /// MMR-traversal search with `depth = 0`. An explicit `depth > 0` is
    /// ignored with a warning.
    fn max_marginal_relevance_search(
        &self,
        query: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        if kwargs.depth.unwrap_or(0) > 0 {
            warn!("'mmr' search started with depth > 0. Maybe you meant to do a 'mmr_traversal' search?");
        }
        let params = MmrTraversalParams {
            initial_roots: Vec::new(),
            depth: 0,
            fetch_k: kwargs.fetch_k.unwrap_or(DEFAULT_MMR_FETCH_K),
            ..MmrTraversalParams::from(kwargs)
        };
        collect_documents(self.mmr_traversal_search(query, params)?)
    }

    /// Run the search identified by `search_type`
    fn search(
        &self,
        query: &str,
        search_type: SearchType,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        debug!("search: type={}, query='{}'", search_type, query);
        match search_type {
            SearchType::Similarity => self.similarity_search(query, kwargs),
            SearchType::SimilarityScoreThreshold => Ok(self
                .similarity_search_with_relevance_scores(query, kwargs)?
                .into_iter()
                .map(|(doc, _)| doc)
                .collect()),
            SearchType::Mmr => self.max_marginal_relevance_search(query, kwargs),
            SearchType::Traversal => {
                collect_documents(self.traversal_search(query, TraversalParams::from(kwargs))?)
            }
            SearchType::MmrTraversal => collect_documents(
                self.mmr_traversal_search(query, MmrTraversalParams::from(kwargs))?,
            ),
        }
    }

    /// Like [`GraphStore::search`] with the search type given by name
    fn search_by_name(
        &self,
        query: &str,
        search_type: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        self.search(query, search_type.parse()?, kwargs)
    }

    fn as_retriever(
        self: Arc<Self>,
        search_type: SearchType,
        kwargs: SearchKwargs,
    ) -> Result<GraphStoreRetriever>
    where
        Self: Sized + 'static,
    {
        GraphStoreRetriever::new(self, search_type, kwargs)
    }
}

/// Shared, thread-safe handle to any graph store
pub type SharedGraphStore = Arc<dyn GraphStore>;

/// Graph store implementing traversal and MMR-traversal on top of a
/// [`GraphBackend`]
pub struct LinkGraphStore {
    backend: Arc<dyn GraphBackend>,
}

impl LinkGraphStore {
    pub fn new(backend: Arc<dyn GraphBackend>) -> Self {
        Self { backend }
    }

    /// Construct behind an `Arc`, ready to share with retrievers and the async facade
    pub fn shared(backend: Arc<dyn GraphBackend>) -> Arc<Self> {
        Arc::new(Self::new(backend))
    }

    pub fn backend(&self) -> &Arc<dyn GraphBackend> {
        &self.backend
    }
}

impl GraphStore for LinkGraphStore {
    fn add_nodes(&self, nodes: Vec<Node>) -> Result<Vec<String>> {
        let count = nodes.len();
        let ids = self.backend.persist(nodes)?;
        info!("Added {} nodes to {} backend", count, self.backend.name());
        Ok(ids)
    }

    fn traversal_search(&self, query: &str, params: TraversalParams) -> Result<DocumentIter> {
        info!("Traversal search: query='{}', k={}, depth={}", query, params.k, params.depth);
        let iter = TraversalIter::start(Arc::clone(&self.backend), query, params)?;
        Ok(Box::new(iter))
    }

    fn mmr_traversal_search(
        &self,
        query: &str,
        params: MmrTraversalParams,
    ) -> Result<DocumentIter> {
        info!(
            "MMR traversal search: query='{}', k={}, depth={}, fetch_k={}, adjacent_k={}",
            query, params.k, params.depth, params.fetch_k, params.adjacent_k
        );
        let iter = MmrTraversalIter::start(Arc::clone(&self.backend), query, params)?;
        Ok(Box::new(iter))
    }

    fn similarity_search_with_scores(
        &self,
        query: &str,
        k: usize,
        options: &QueryOptions,
    ) -> Result<Vec<(Document, f32)>> {
        let hits = self.backend.similarity(query, k, options)?;
        Ok(hits
            .into_iter()
            .map(|hit| (node_to_document(hit.node), hit.score))
            .collect())
    }
}
