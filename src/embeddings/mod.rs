//! Embeddings generation module
//!
//! Text is turned into fixed-dimension vectors by an external service:
//! - OpenAI-compatible `/embeddings` endpoints (batched)
//! - Ollama `/api/embeddings` (one text per call, run concurrently)
//!
//! # Examples
//!
//! ```rust,no_run
//! use docrag::config::AppConfig;
//! use docrag::embeddings::Embedder;
//! use docrag::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use generator::EmbeddingService;
pub use text_preprocessing::preprocess_text_for_embedding;

use crate::errors::DocRagError;
use crate::errors::Result;

/// Upper bound on texts per batched request
pub const MAX_BATCH_SIZE: usize = 256;

/// Turns texts into embedding vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order, each of length [`Embedder::dimension`]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocRagError::EmbeddingError("No embedding in response".to_string()))
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub max_retries: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    #[must_use]
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let embeddings = &config.embeddings;
        let provider = EmbeddingProvider::detect(&embeddings.api_key);

        Self {
            provider,
            model: embeddings.model.clone(),
            dimension: embeddings.dimension,
            endpoint: embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key: if provider == EmbeddingProvider::OpenAI {
                Some(embeddings.api_key.clone())
            } else {
                None
            },
            batch_size: embeddings.batch_size.clamp(1, MAX_BATCH_SIZE),
            max_retries: embeddings.max_retries,
            timeout_secs: embeddings.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_embedding_config_from_app_config() {
        let mut app = AppConfig::default();
        app.embeddings.api_key = "sk-test".to_string();
        app.embeddings.endpoint = "https://api.openai.com/v1/".to_string();
        app.embeddings.batch_size = 10_000;

        let config = EmbeddingConfig::from_app_config(&app);
        assert_eq!(config.provider, EmbeddingProvider::OpenAI);
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.batch_size, MAX_BATCH_SIZE);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_ollama_key_selects_ollama() {
        let mut app = AppConfig::default();
        app.embeddings.api_key = "ollama".to_string();

        let config = EmbeddingConfig::from_app_config(&app);
        assert_eq!(config.provider, EmbeddingProvider::Ollama);
        assert!(config.api_key.is_none());
    }
}
