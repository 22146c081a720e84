//! Retriever facade over a graph store

use async_trait::async_trait;
use futures::TryStreamExt;

use crate::async_store::AsyncGraphStore;
use crate::error::{GraphStoreError, Result};
use crate::params::{MmrTraversalParams, SearchKwargs, SearchType, TraversalParams};
use crate::store::SharedGraphStore;
use crate::traversal::collect_documents;
use crate::types::Document;

/// Anything that turns a query into relevant documents
#[async_trait]
pub trait Retriever: Send + Sync {
    fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>>;

    async fn aget_relevant_documents(&self, query: &str) -> Result<Vec<Document>>;
}

/// Retriever bound to one search type and one parameter mapping.
///
/// `traversal` and `mmr_traversal` go straight to the graph operations;
/// the other types use the plain vector-store behaviour of the store.
#[derive(Clone)]
pub struct GraphStoreRetriever {
    store: SharedGraphStore,
    async_store: AsyncGraphStore,
    search_type: SearchType,
    search_kwargs: SearchKwargs,
}

impl GraphStoreRetriever {
    pub fn new(
        store: SharedGraphStore,
        search_type: SearchType,
        search_kwargs: SearchKwargs,
    ) -> Result<Self> {
        if search_type == SearchType::SimilarityScoreThreshold
            && search_kwargs.score_threshold.is_none()
        {
            return Err(GraphStoreError::InvalidArgument(
                "`score_threshold` is not specified with a float value in `search_kwargs`"
                    .to_string(),
            ));
        }
        Ok(Self {
            async_store: AsyncGraphStore::new(SharedGraphStore::clone(&store)),
            store,
            search_type,
            search_kwargs,
        })
    }

    /// Traversal retriever with default parameters
    pub fn from_store(store: SharedGraphStore) -> Self {
        Self {
            async_store: AsyncGraphStore::new(SharedGraphStore::clone(&store)),
            store,
            search_type: SearchType::default(),
            search_kwargs: SearchKwargs::default(),
        }
    }

    /// Build from a search type name, rejecting names outside the allowed set
    pub fn from_name(
        store: SharedGraphStore,
        search_type: &str,
        search_kwargs: SearchKwargs,
    ) -> Result<Self> {
        Self::new(store, search_type.parse()?, search_kwargs)
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    pub fn search_kwargs(&self) -> &SearchKwargs {
        &self.search_kwargs
    }
}

#[async_trait]
impl Retriever for GraphStoreRetriever {
    fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        match self.search_type {
            SearchType::Traversal => collect_documents(
                self.store
                    .traversal_search(query, TraversalParams::from(&self.search_kwargs))?,
            ),
            SearchType::MmrTraversal => collect_documents(
                self.store
                    .mmr_traversal_search(query, MmrTraversalParams::from(&self.search_kwargs))?,
            ),
            other => self.store.search(query, other, &self.search_kwargs),
        }
    }

    async fn aget_relevant_documents(&self, query: &str) -> Result<Vec<Document>> {
        match self.search_type {
            SearchType::Traversal => {
                self.async_store
                    .atraversal_search(query, TraversalParams::from(&self.search_kwargs))
                    .try_collect()
                    .await
            }
            SearchType::MmrTraversal => {
                self.async_store
                    .ammr_traversal_search(query, MmrTraversalParams::from(&self.search_kwargs))
                    .try_collect()
                    .await
            }
            other => self.async_store.asearch(query, other, &self.search_kwargs).await,
        }
    }
}
