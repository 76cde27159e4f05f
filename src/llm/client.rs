use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::ChatMessage;
use super::ChatModel;
use crate::config::AppConfig;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Ollama,
}

impl LlmProvider {
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

/// Chat completion client
pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    retry: RetryPolicy,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let llm = &config.llm;
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .map_err(|e| DocRagError::HttpError(e.to_string()))?;

        let provider = LlmProvider::detect(&llm.llm_key);
        info!("LLM service: {:?} model {}", provider, llm.llm_model);

        Ok(Self {
            provider,
            endpoint: llm.llm_endpoint.trim_end_matches('/').to_string(),
            api_key: llm.llm_key.clone(),
            model: llm.llm_model.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
            retry: RetryPolicy::new(llm.max_retries),
            client,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat_openai(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            temperature: f32,
            max_tokens: usize,
            messages: &'a [ChatMessage],
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: AssistantMessage,
        }

        #[derive(Deserialize)]
        struct AssistantMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API with {} messages", messages.len());

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages,
        };

        let response: ChatResponse = self
            .retry
            .post_json(&self.client, &url, Some(&self.api_key), &request)
            .await
            .map_err(|e| DocRagError::LlmError(format!("OpenAI API error: {e}")))?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| DocRagError::LlmError("No answer in response".to_string()))
    }

    async fn chat_ollama(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: OllamaMessage,
        }

        #[derive(Deserialize)]
        struct OllamaMessage {
            content: String,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response: OllamaResponse = self
            .retry
            .post_json(&self.client, &url, None, &request)
            .await
            .map_err(|e| DocRagError::LlmError(format!("Ollama API error: {e}")))?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl ChatModel for LlmService {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let answer = match self.provider {
            LlmProvider::OpenAI => self.chat_openai(messages).await?,
            LlmProvider::Ollama => self.chat_ollama(messages).await?,
        };
        Ok(answer.trim().to_string())
    }
}
