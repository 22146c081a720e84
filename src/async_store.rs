//! Non-blocking facade over a [`GraphStore`]

use futures::TryStreamExt;
use std::sync::Arc;

use crate::adapters::{documents_to_nodes, texts_to_nodes};
use crate::bridge::{run_blocking, stream_blocking, stream_blocking_vec, ResultStream};
use crate::error::Result;
use crate::params::{MmrTraversalParams, SearchKwargs, SearchType, TraversalParams};
use crate::store::{GraphStore, SharedGraphStore};
use crate::types::{Document, Metadata, Node};

/// Async counterparts of every [`GraphStore`] operation.
///
/// Each method runs the synchronous implementation on the blocking pool
/// through [`crate::bridge`]; no search logic lives here.
#[derive(Clone)]
pub struct AsyncGraphStore {
    inner: SharedGraphStore,
}

impl AsyncGraphStore {
    pub fn new(inner: SharedGraphStore) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &SharedGraphStore {
        &self.inner
    }

    /// Stream of assigned ids, in input order
    pub fn aadd_nodes(&self, nodes: Vec<Node>) -> ResultStream<String> {
        let store = Arc::clone(&self.inner);
        stream_blocking_vec(move || store.add_nodes(nodes))
    }

    pub async fn aadd_texts(
        &self,
        texts: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        ids: Option<Vec<String>>,
    ) -> Result<Vec<String>> {
        let nodes = texts_to_nodes(texts, metadatas, ids)?;
        self.aadd_nodes(nodes).try_collect().await
    }

    pub async fn aadd_documents(&self, documents: &[Document]) -> Result<Vec<String>> {
        let nodes = documents_to_nodes(documents)?;
        self.aadd_nodes(nodes).try_collect().await
    }

    pub fn atraversal_search(&self, query: &str, params: TraversalParams) -> ResultStream<Document> {
        let store = Arc::clone(&self.inner);
        let query = query.to_string();
        stream_blocking(move || store.traversal_search(&query, params))
    }

    pub fn ammr_traversal_search(
        &self,
        query: &str,
        params: MmrTraversalParams,
    ) -> ResultStream<Document> {
        let store = Arc::clone(&self.inner);
        let query = query.to_string();
        stream_blocking(move || store.mmr_traversal_search(&query, params))
    }

    /// Async traversal search with `depth = 0`
    pub async fn asimilarity_search(
        &self,
        query: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        let params = TraversalParams {
            depth: 0,
            ..TraversalParams::from(kwargs)
        };
        self.atraversal_search(query, params).try_collect().await
    }

    pub async fn asimilarity_search_with_relevance_scores(
        &self,
        query: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<(Document, f32)>> {
        let store = Arc::clone(&self.inner);
        let query = query.to_string();
        let kwargs = kwargs.clone();
        run_blocking(move || store.similarity_search_with_relevance_scores(&query, &kwargs)).await
    }

    pub async fn amax_marginal_relevance_search(
        &self,
        query: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        let store = Arc::clone(&self.inner);
        let query = query.to_string();
        let kwargs = kwargs.clone();
        run_blocking(move || store.max_marginal_relevance_search(&query, &kwargs)).await
    }

    pub async fn asearch(
        &self,
        query: &str,
        search_type: SearchType,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        match search_type {
            SearchType::Similarity => self.asimilarity_search(query, kwargs).await,
            SearchType::SimilarityScoreThreshold => Ok(self
                .asimilarity_search_with_relevance_scores(query, kwargs)
                .await?
                .into_iter()
                .map(|(doc, _)| doc)
                .collect()),
            SearchType::Mmr => self.amax_marginal_relevance_search(query, kwargs).await,
            SearchType::Traversal => {
                self.atraversal_search(query, TraversalParams::from(kwargs))
                    .try_collect()
                    .await
            }
            SearchType::MmrTraversal => {
                self.ammr_traversal_search(query, MmrTraversalParams::from(kwargs))
                    .try_collect()
                    .await
            }
        }
    }

    pub async fn asearch_by_name(
        &self,
        query: &str,
        search_type: &str,
        kwargs: &SearchKwargs,
    ) -> Result<Vec<Document>> {
        self.asearch(query, search_type.parse()?, kwargs).await
    }
}

impl<S: GraphStore + 'static> From<Arc<S>> for AsyncGraphStore {
    fn from(store: Arc<S>) -> Self {
        Self::new(store)
    }
}
