//! Error type shared by the store, adapters, bridge and retriever

use std::fmt;
use thiserror::Error;

use crate::params::SearchType;

/// Which parallel input sequence overran the others in `texts_to_nodes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityMismatch {
    TextsLongerThanMetadatas,
    TextsLongerThanIds,
    IdsLongerThanTexts,
    MetadatasLongerThanTexts,
}

impl fmt::Display for ArityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ArityMismatch::TextsLongerThanMetadatas => "texts iterable longer than metadatas",
            ArityMismatch::TextsLongerThanIds => "texts iterable longer than ids",
            ArityMismatch::IdsLongerThanTexts => "ids iterable longer than texts",
            ArityMismatch::MetadatasLongerThanTexts => "metadatas iterable longer than texts",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Error)]
pub enum GraphStoreError {
    #[error("{0}")]
    Arity(ArityMismatch),

    #[error("invalid links metadata: {0}")]
    InvalidLinks(String),

    #[error(
        "search_type of {0} not allowed. Expected search_type to be one of: {}",
        SearchType::allowed_list()
    )]
    InvalidSearchType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failures raised by the backend, passed through untouched
    #[error(transparent)]
    Backend(#[from] anyhow::Error),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl GraphStoreError {
    /// Caller-facing validation failures (as opposed to backend or worker failures)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GraphStoreError::Arity(_)
                | GraphStoreError::InvalidLinks(_)
                | GraphStoreError::InvalidSearchType(_)
                | GraphStoreError::InvalidArgument(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GraphStoreError>;
