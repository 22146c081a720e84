//! Server configuration read from environment variables

use anyhow::{Context, Result};

use crate::params::SearchType;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_EMBEDDING_DIMS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// LINKGRAPH_PORT
    pub port: u16,
    /// LINKGRAPH_EMBEDDINGS_URL; hashing embeddings are used when unset
    pub embeddings_url: Option<String>,
    /// LINKGRAPH_EMBEDDING_DIMS
    pub embedding_dims: usize,
    /// LINKGRAPH_SEARCH_TYPE
    pub search_type: SearchType,
    /// `--demo`: seed the store with sample linked documents
    pub demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            embeddings_url: None,
            embedding_dims: DEFAULT_EMBEDDING_DIMS,
            search_type: SearchType::Traversal,
            demo: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.demo = std::env::args().any(|arg| arg == "--demo");
        Ok(config)
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("LINKGRAPH_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("Invalid LINKGRAPH_PORT: {}", v))?,
            None => defaults.port,
        };
        let embedding_dims = match lookup("LINKGRAPH_EMBEDDING_DIMS") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("Invalid LINKGRAPH_EMBEDDING_DIMS: {}", v))?,
            None => defaults.embedding_dims,
        };
        if embedding_dims == 0 {
            anyhow::bail!("LINKGRAPH_EMBEDDING_DIMS must be positive");
        }
        let search_type = match lookup("LINKGRAPH_SEARCH_TYPE") {
            Some(v) => v.parse::<SearchType>().context("Invalid LINKGRAPH_SEARCH_TYPE")?,
            None => defaults.search_type,
        };

        Ok(Self {
            port,
            embeddings_url: lookup("LINKGRAPH_EMBEDDINGS_URL").filter(|v| !v.trim().is_empty()),
            embedding_dims,
            search_type,
            demo: defaults.demo,
        })
    }
}
