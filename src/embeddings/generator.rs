//! Embedding generation service with batching and dimension checks

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::client::EmbeddingClient;
use super::preprocess_text_for_embedding;
use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::DocRagError;
use crate::errors::Result;

/// Service for generating embeddings in bounded batches
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
            config.max_retries,
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    fn check_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        if let Some(bad) = embeddings
            .iter()
            .find(|e| e.len() != self.config.dimension)
        {
            return Err(DocRagError::EmbeddingError(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.config.dimension,
                bad.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let processed = texts
            .iter()
            .map(|t| preprocess_text_for_embedding(t))
            .collect::<Result<Vec<String>>>()?;

        let mut embeddings = Vec::with_capacity(processed.len());
        for batch in processed.chunks(self.config.batch_size) {
            debug!("Embedding batch of {} texts", batch.len());
            let batch_embeddings = self.client.generate_batch(batch).await?;
            self.check_dimensions(&batch_embeddings)?;
            embeddings.extend(batch_embeddings);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingProvider;

    fn service(dimension: usize) -> EmbeddingService {
        EmbeddingService::from_config(EmbeddingConfig {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            dimension,
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: Some("sk-test".to_string()),
            batch_size: 2,
            max_retries: 1,
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_dimension_check() {
        let service = service(3);
        assert!(service.check_dimensions(&[vec![0.0; 3], vec![1.0; 3]]).is_ok());
        assert!(service.check_dimensions(&[vec![0.0; 3], vec![1.0; 2]]).is_err());
        assert_eq!(service.dimension(), 3);
    }

    #[tokio::test]
    async fn test_whitespace_text_fails_before_network() {
        let service = service(3);
        let err = service
            .embed_batch(&["ok".to_string(), "   ".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DocRagError::EmbeddingError(_)));
    }
}
