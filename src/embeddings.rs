//! Embedding providers used by the in-memory backend

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::scoring::l2_normalize;

/// Turns text into vectors. Calls may block.
pub trait Embeddings: Send + Sync {
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut out = self.embed_documents(&[text.to_string()])?;
        out.pop().context("embedding provider returned no vector for query")
    }
}

/// Deterministic feature-hashing embedder.
///
/// Each lowercase alphanumeric token is hashed into one of `dims` buckets.
/// Useful offline and in demos; texts sharing words end up close together.
#[derive(Debug, Clone)]
pub struct HashingEmbeddings {
    dims: usize,
}

impl HashingEmbeddings {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dims as u64) as usize;
            v[bucket] += 1.0;
        }
        l2_normalize(&mut v);
        v
    }
}

impl Embeddings for HashingEmbeddings {
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// Request to the embedding service
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

/// Response from the embedding service
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Remote embedding service reached over HTTP (`POST {url}/embed`)
pub struct HttpEmbeddings {
    service_url: String,
    client: reqwest::blocking::Client,
}

impl HttpEmbeddings {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into().trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embed", self.service_url)
    }

    /// Health check
    pub fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.service_url);
        let response = self.client.get(&url).send()?;
        Ok(response.status().is_success())
    }
}

impl Embeddings for HttpEmbeddings {
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint();
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { texts })
            .send()
            .with_context(|| format!("Failed to call embedding service at {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Embedding service error ({}): {}", status, body);
        }

        let parsed: EmbedResponse = response
            .json()
            .context("Failed to parse embedding service response")?;

        if parsed.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Embedding service returned {} vectors for {} texts",
                parsed.embeddings.len(),
                texts.len()
            );
        }

        tracing::debug!("Embedded {} texts via {}", texts.len(), url);
        Ok(parsed.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::cosine_similarity;

    #[test]
    fn test_hashing_is_deterministic() {
        let e = HashingEmbeddings::new(64);
        let a = e.embed_query("Graph traversal in Rust").unwrap();
        let b = e.embed_query("graph TRAVERSAL in rust").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hashing_shared_words_are_closer() {
        let e = HashingEmbeddings::new(256);
        let q = e.embed_query("vector search").unwrap();
        let near = e.embed_query("fast vector search engine").unwrap();
        let far = e.embed_query("banana bread recipe").unwrap();
        assert!(cosine_similarity(&q, &near) > cosine_similarity(&q, &far));
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let e = HttpEmbeddings::new("http://127.0.0.1:8090/");
        assert_eq!(e.endpoint(), "http://127.0.0.1:8090/embed");
    }

    #[test]
    #[ignore] // Requires running embedding service
    fn test_http_embeddings_integration() {
        let e = HttpEmbeddings::new("http://127.0.0.1:8090");
        assert!(e.health_check().is_ok());
    }
}
