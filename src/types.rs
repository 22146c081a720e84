//! Core type definitions for linked content retrieval

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::links::Link;

/// Free-form metadata attached to nodes and documents
pub type Metadata = Map<String, Value>;

/// Opaque metadata predicate handed to the backend
pub type Filter = Map<String, Value>;

/// A retrievable unit of content and the links it carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Assigned by the backend on add when absent
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Node {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }
}

/// External content record. Links travel inside `metadata` under
/// [`crate::METADATA_LINKS_KEY`] as a JSON array of link objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub page_content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Node returned by the backend, with its query score and embedding
#[derive(Debug, Clone)]
pub struct ScoredNode {
    pub node: Node,
    /// Similarity to the query (higher is closer)
    pub score: f32,
    /// Used to measure redundancy between candidates during MMR
    pub embedding: Vec<f32>,
}

impl ScoredNode {
    /// Backend-assigned id; stored nodes always carry one
    pub fn id(&self) -> &str {
        self.node.id.as_deref().unwrap_or_default()
    }
}

/// Filter plus any caller parameters the core does not interpret
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filter: Option<Filter>,
    pub extra: Map<String, Value>,
}

impl QueryOptions {
    pub fn with_filter(filter: Option<Filter>) -> Self {
        Self {
            filter,
            extra: Map::new(),
        }
    }
}
