/// API request handlers
use std::sync::Arc;

use axum::Json;

use crate::api::types::HealthResponse;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::ingest::IngestionService;
use crate::llm::ChatModel;
use crate::rag::RagService;
use crate::store::DocumentStore;
use crate::store::VectorIndex;
use crate::Result;

pub mod documents;
pub mod rag;

pub use documents::*;
pub use rag::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionService>,
    pub rag: Arc<RagService>,
}

impl AppState {
    /// Wire both services over the given backends
    ///
    /// # Errors
    /// - Invalid chunk settings
    pub fn new(
        config: &AppConfig,
        documents: Arc<dyn DocumentStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        let ingestion =
            IngestionService::new(config, documents, index.clone(), embedder.clone())?;
        let rag = RagService::new(config, embedder, index, chat_model);

        Ok(Self {
            ingestion: Arc::new(ingestion),
            rag: Arc::new(rag),
        })
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
