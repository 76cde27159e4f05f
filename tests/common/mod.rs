//! Shared fixtures: deterministic fake embedder and chat model over `MemoryStore`

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use docrag::api::AppState;
use docrag::embeddings::Embedder;
use docrag::llm::ChatMessage;
use docrag::llm::ChatModel;
use docrag::models::Document;
use docrag::models::DocumentStatus;
use docrag::store::MemoryStore;
use docrag::AppConfig;
use docrag::DocRagError;
use docrag::Result;
use tempfile::TempDir;

pub const DIMENSION: usize = 32;

/// Bag-of-words hashing embedder; texts sharing words land close together
#[derive(Debug, Default)]
pub struct HashEmbedder;

pub fn hash_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; DIMENSION];
    // Keeps every vector non-zero
    vector[0] = 0.1;
    for word in text.split_whitespace() {
        let mut hasher = DefaultHasher::new();
        word.to_lowercase().hash(&mut hasher);
        let slot = (hasher.finish() % (DIMENSION as u64 - 1)) as usize + 1;
        vector[slot] += 1.0;
    }
    vector
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

/// Embeds the first `succeed` texts, then fails every call
#[derive(Debug)]
pub struct FailingEmbedder {
    succeed: usize,
    embedded: AtomicUsize,
}

impl FailingEmbedder {
    pub fn after(succeed: usize) -> Self {
        Self {
            succeed,
            embedded: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let before = self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        if before + texts.len() > self.succeed {
            return Err(DocRagError::EmbeddingError(
                "embedding service unavailable".to_string(),
            ));
        }
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

/// Stalls on its first call, then either fails it or embeds normally.
/// Later calls return at once.
#[derive(Debug)]
pub struct StallingEmbedder {
    delay: Duration,
    fail_first: bool,
    stalled: AtomicBool,
}

impl StallingEmbedder {
    pub fn new(delay: Duration, fail_first: bool) -> Self {
        Self {
            delay,
            fail_first,
            stalled: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Embedder for StallingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
            if self.fail_first {
                return Err(DocRagError::EmbeddingError("embedding timed out".to_string()));
            }
        }
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

/// Records every prompt and answers with a fixed string
#[derive(Debug)]
pub struct RecordingChat {
    answer: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingChat {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Vec<ChatMessage> {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for RecordingChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.answer.clone())
    }
}

/// Always fails, to exercise generation errors
#[derive(Debug, Default)]
pub struct BrokenChat;

#[async_trait]
impl ChatModel for BrokenChat {
    async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(DocRagError::LlmError("upstream returned 500".to_string()))
    }
}

/// Config with small limits and uploads under a temporary directory
pub fn test_config(upload_dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "postgres://unused".to_string();
    config.llm.llm_key = "test-key".to_string();
    config.embeddings.api_key = "test-key".to_string();
    config.embeddings.dimension = DIMENSION;
    config.embeddings.batch_size = 1;
    config.ingestion.upload_dir = upload_dir.path().to_path_buf();
    config.ingestion.chunk_size = 200;
    config.ingestion.chunk_overlap = 50;
    config.ingestion.max_upload_bytes = 64 * 1024;
    config.retrieval.top_k = 4;
    config.retrieval.max_top_k = 10;
    config
}

pub struct Harness {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub chat: Arc<RecordingChat>,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_embedder(Arc::new(HashEmbedder))
    }

    pub fn with_embedder(embedder: Arc<dyn Embedder>) -> Self {
        let upload_dir = TempDir::new().unwrap();
        let config = test_config(&upload_dir);
        let store = Arc::new(MemoryStore::new());
        let chat = Arc::new(RecordingChat::answering("The answer is 42."));
        let state = AppState::new(&config, store.clone(), store.clone(), embedder, chat.clone())
            .unwrap();

        Self {
            config,
            store,
            chat,
            state,
            upload_dir,
        }
    }

    /// Number of files currently in the upload directory
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Poll until the named document leaves `pending`
pub async fn wait_until_settled(harness: &Harness, filename: &str) -> Document {
    for _ in 0..200 {
        let settled = harness
            .state
            .ingestion
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.filename == filename && d.status != DocumentStatus::Pending);
        if let Some(document) = settled {
            return document;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{filename} never left pending");
}

/// `n` distinct words: "word0 word1 ..."
pub fn words(n: usize) -> String {
    (0..n)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}
