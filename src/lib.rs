//! linkgraph - Graph Vector Retrieval
//!
//! A vector store whose documents carry typed links to each other:
//! - Similarity search as the entry point into the graph
//! - Breadth-first traversal along link edges
//! - MMR selection that grows its candidate pool by following links
//! - Async streaming counterparts and a retriever facade

pub mod adapters;
pub mod async_store;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod links;
pub mod memory_backend;
pub mod params;
pub mod retriever;
pub mod scoring;
pub mod selection;
pub mod server;
pub mod store;
pub mod traversal;
pub mod types;

pub use types::*;
pub use adapters::{documents_to_nodes, node_to_document, nodes_to_documents, texts_to_nodes};
pub use async_store::AsyncGraphStore;
pub use backend::GraphBackend;
pub use embeddings::{Embeddings, HashingEmbeddings, HttpEmbeddings};
pub use error::{ArityMismatch, GraphStoreError, Result};
pub use links::{Direction, Link, METADATA_LINKS_KEY};
pub use memory_backend::InMemoryBackend;
pub use params::{MmrTraversalParams, SearchKwargs, SearchType, TraversalParams};
pub use retriever::{GraphStoreRetriever, Retriever};
pub use store::{GraphStore, LinkGraphStore, SharedGraphStore};
pub use traversal::DocumentIter;
