//! Embedding API clients for OpenAI-compatible and Ollama endpoints

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::DocRagError;
use crate::errors::Result;
use crate::retry::RetryPolicy;

/// Ollama has no batch endpoint; this many single requests run at once
const OLLAMA_CONCURRENCY: usize = 16;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI` embeddings API and compatible servers
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

impl EmbeddingProvider {
    /// The literal key `ollama` selects a local Ollama server
    #[must_use]
    pub fn detect(api_key: &str) -> Self {
        if api_key.trim().eq_ignore_ascii_case("ollama") {
            Self::Ollama
        } else {
            Self::OpenAI
        }
    }
}

/// Client for generating embeddings from an external service
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    retry: RetryPolicy,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: EmbeddingProvider,
        model: String,
        endpoint: String,
        api_key: Option<String>,
        max_retries: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DocRagError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key,
            retry: RetryPolicy::new(max_retries),
            client,
        })
    }

    #[must_use]
    pub const fn provider(&self) -> EmbeddingProvider {
        self.provider
    }

    /// Generate embeddings for multiple texts
    ///
    /// # Errors
    /// - API request failures after retries are exhausted
    /// - Malformed responses or a response count that differs from the input count
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = match self.provider {
            EmbeddingProvider::OpenAI => self.generate_batch_openai(texts).await?,
            EmbeddingProvider::Ollama => {
                use futures::stream::StreamExt;
                use futures::stream::{
                    self,
                };

                let concurrency = texts.len().min(OLLAMA_CONCURRENCY);
                // Owned strings keep the stream future Send under async_trait
                let results: Vec<Result<Vec<f32>>> = stream::iter(texts.iter().cloned())
                    .map(|text| async move { self.generate_ollama(&text).await })
                    .buffered(concurrency)
                    .collect()
                    .await;

                results.into_iter().collect::<Result<Vec<_>>>()?
            }
        };

        if embeddings.len() != texts.len() {
            return Err(DocRagError::EmbeddingError(format!(
                "embedding service returned {} vectors for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings)
    }

    /// Generate embeddings in batch using `OpenAI` API
    async fn generate_batch_openai(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DocRagError::ConfigError("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIBatchRequest<'a> {
            input: &'a [String],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
            #[serde(default)]
            index: usize,
        }

        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI batch embeddings API: {} items", texts.len());

        let request = OpenAIBatchRequest {
            input: texts,
            model: &self.model,
        };

        let mut result: OpenAIResponse = self
            .retry
            .post_json(&self.client, &url, Some(api_key), &request)
            .await
            .map_err(|e| DocRagError::EmbeddingError(format!("OpenAI API error: {e}")))?;

        result.data.sort_by_key(|entry| entry.index);
        Ok(result.data.into_iter().map(|d| d.embedding).collect())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let result: OllamaResponse = self
            .retry
            .post_json(&self.client, &url, None, &request)
            .await
            .map_err(|e| DocRagError::EmbeddingError(format!("Ollama API error: {e}")))?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_detection() {
        assert_eq!(EmbeddingProvider::detect("ollama"), EmbeddingProvider::Ollama);
        assert_eq!(EmbeddingProvider::detect(" Ollama "), EmbeddingProvider::Ollama);
        assert_eq!(EmbeddingProvider::detect("sk-abc"), EmbeddingProvider::OpenAI);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "http://127.0.0.1:9".to_string(),
            Some("sk-test".to_string()),
            1,
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(client.generate_batch(&[]).await.unwrap().is_empty());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_ollama_batch_is_send_and_reports_connect_errors() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            "nomic-embed-text".to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
            0,
            Duration::from_secs(1),
        )
        .unwrap();
        let texts = vec!["one".to_string(), "two".to_string()];

        let batch = client.generate_batch(&texts);
        assert_send(&batch);
        assert!(batch.await.is_err());
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_openai_embedding() {
        let client = EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            "text-embedding-3-small".to_string(),
            "https://api.openai.com/v1".to_string(),
            std::env::var("OPENAI_API_KEY").ok(),
            3,
            Duration::from_secs(60),
        )
        .unwrap();

        let embedding = client
            .generate_batch(&["Hello, world!".to_string()])
            .await
            .unwrap();
        assert_eq!(embedding[0].len(), 1536);
    }
}
