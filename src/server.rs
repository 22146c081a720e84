//! HTTP server exposing the graph store

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    AsyncGraphStore, Document, GraphStoreError, GraphStoreRetriever, Retriever, SearchKwargs,
    SearchType, SharedGraphStore,
};

/// Shared handler state
pub struct AppState {
    pub store: SharedGraphStore,
    pub async_store: AsyncGraphStore,
    pub search_type: SearchType,
}

impl AppState {
    pub fn new(store: SharedGraphStore, search_type: SearchType) -> Arc<Self> {
        Arc::new(Self {
            async_store: AsyncGraphStore::new(SharedGraphStore::clone(&store)),
            store,
            search_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequestHttp {
    pub query: String,
    /// Falls back to the server's configured search type
    pub search_type: Option<String>,
    #[serde(default)]
    pub search_kwargs: SearchKwargs,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseHttp {
    pub search_type: SearchType,
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct AddDocumentsRequest {
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct AddDocumentsResponse {
    pub ids: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn into_http_error(context: &str, e: GraphStoreError) -> HandlerError {
    let status = if e.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        error!("{}: {:?}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: context.to_string(),
            details: Some(e.to_string()),
        }),
    )
}

/// Search handler
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequestHttp>,
) -> Result<Json<SearchResponseHttp>, HandlerError> {
    let search_type = match req.search_type.as_deref() {
        Some(name) => name
            .parse::<SearchType>()
            .map_err(|e| into_http_error("Invalid search type", e))?,
        None => state.search_type,
    };
    info!("Received search request: query='{}', type={}", req.query, search_type);

    let retriever = GraphStoreRetriever::new(
        SharedGraphStore::clone(&state.store),
        search_type,
        req.search_kwargs,
    )
    .map_err(|e| into_http_error("Invalid search parameters", e))?;

    let documents = retriever
        .aget_relevant_documents(&req.query)
        .await
        .map_err(|e| into_http_error("Search failed", e))?;

    info!("Search returned {} documents", documents.len());
    Ok(Json(SearchResponseHttp {
        search_type,
        documents,
    }))
}

/// Add documents handler
async fn add_documents_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddDocumentsRequest>,
) -> Result<Json<AddDocumentsResponse>, HandlerError> {
    let ids = state
        .async_store
        .aadd_documents(&req.documents)
        .await
        .map_err(|e| into_http_error("Adding documents failed", e))?;
    info!("Added {} documents", ids.len());
    Ok(Json(AddDocumentsResponse { ids }))
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "linkgraph".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create and configure the HTTP server
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/documents", post(add_documents_handler))
        .route("/search", post(search_handler))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("Starting linkgraph server on {}", addr);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashingEmbeddings, InMemoryBackend, LinkGraphStore};

    fn state() -> Arc<AppState> {
        let backend = Arc::new(InMemoryBackend::new(Arc::new(HashingEmbeddings::new(64))));
        AppState::new(LinkGraphStore::shared(backend), SearchType::Traversal)
    }

    #[tokio::test]
    async fn test_add_then_search() {
        let state = state();
        let added = add_documents_handler(
            State(Arc::clone(&state)),
            Json(AddDocumentsRequest {
                documents: vec![Document::new("graph retrieval").with_id("g")],
            }),
        )
        .await
        .unwrap();
        assert_eq!(added.0.ids, vec!["g".to_string()]);

        let found = search_handler(
            State(state),
            Json(SearchRequestHttp {
                query: "graph".into(),
                search_type: None,
                search_kwargs: SearchKwargs::default(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.0.search_type, SearchType::Traversal);
        assert_eq!(found.0.documents[0].id.as_deref(), Some("g"));
    }

    #[tokio::test]
    async fn test_bogus_search_type_is_bad_request() {
        let result = search_handler(
            State(state()),
            Json(SearchRequestHttp {
                query: "q".into(),
                search_type: Some("bogus".into()),
                search_kwargs: SearchKwargs::default(),
            }),
        )
        .await;
        let (status, body) = result.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0.details.unwrap().contains("mmr_traversal"));
    }
}
