//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::RagPrompts;
use crate::models::ChatTurn;
use crate::models::SegmentHit;
use crate::rag::ContextAssembler;
use crate::rag::Retriever;
use crate::store::VectorIndex;

/// A question plus its retrieval options
#[derive(Debug, Clone, Default)]
pub struct AskQuery {
    pub question: String,
    /// Falls back to `retrieval.top_k`
    pub top_k: Option<usize>,
    /// Restrict retrieval to one document
    pub document_id: Option<Uuid>,
    /// Earlier turns, oldest first
    pub history: Vec<ChatTurn>,
}

impl AskQuery {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }
}

/// A segment the answer was grounded on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub segment_id: Uuid,
    pub document_id: Uuid,
    pub filename: String,
    pub ordinal: i32,
    pub score: f32,
}

impl From<&SegmentHit> for Citation {
    fn from(hit: &SegmentHit) -> Self {
        Self {
            segment_id: hit.segment_id,
            document_id: hit.document_id,
            filename: hit.filename.clone(),
            ordinal: hit.ordinal,
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagResponse {
    pub answer: String,
    /// Ids of the segments placed in the prompt, in rank order
    pub sources: Vec<Uuid>,
    pub citations: Vec<Citation>,
}

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    context_assembler: ContextAssembler,
    chat_model: Arc<dyn ChatModel>,
    default_top_k: usize,
    max_top_k: usize,
    max_history_turns: usize,
}

impl RagService {
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, index),
            context_assembler: ContextAssembler::new(config.retrieval.max_context_chars),
            chat_model,
            default_top_k: config.retrieval.top_k,
            max_top_k: config.retrieval.max_top_k,
            max_history_turns: config.retrieval.max_history_turns,
        }
    }

    /// Answer a single question with no history
    pub async fn query(&self, question: &str) -> Result<RagResponse> {
        self.ask(AskQuery::new(question)).await
    }

    /// Answer a question from the indexed documents.
    ///
    /// When nothing is retrieved the LLM is not called and a fixed answer
    /// with no sources is returned.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty question or `top_k` of zero
    /// - `GenerationFailed` when embedding the question or calling the LLM fails
    /// - `RetrievalFailed` when the vector search fails
    pub async fn ask(&self, query: AskQuery) -> Result<RagResponse> {
        let question = query.question.trim();
        if question.is_empty() {
            return Err(DocRagError::InvalidInput("question must not be empty".to_string()));
        }
        let top_k = match query.top_k {
            Some(0) => {
                return Err(DocRagError::InvalidInput("top_k must be positive".to_string()));
            }
            Some(k) => k.min(self.max_top_k),
            None => self.default_top_k,
        };

        info!("Processing RAG query: {}", question);

        debug!("Step 1: Retrieving segments (top_k={})", top_k);
        let hits = self
            .retriever
            .semantic_search(question, top_k, query.document_id)
            .await?;

        if hits.is_empty() {
            info!("No relevant segments found; skipping generation");
            return Ok(RagResponse {
                answer: RagPrompts::no_context_answer().to_string(),
                sources: Vec::new(),
                citations: Vec::new(),
            });
        }

        debug!("Step 2: Assembling context from {} hits", hits.len());
        let (context, used) = self.context_assembler.assemble(&hits);

        debug!("Step 3: Generating answer");
        let messages = self.build_messages(question, &context, &query.history);
        let answer = self
            .chat_model
            .chat(&messages)
            .await
            .map_err(|e| DocRagError::GenerationFailed(e.to_string()))?;

        info!("RAG query completed with {} sources", used.len());

        Ok(RagResponse {
            answer,
            sources: used.iter().map(|hit| hit.segment_id).collect(),
            citations: used.into_iter().map(Citation::from).collect(),
        })
    }

    fn build_messages(&self, question: &str, context: &str, history: &[ChatTurn]) -> Vec<ChatMessage> {
        let recent = &history[history.len().saturating_sub(self.max_history_turns)..];

        let mut messages = Vec::with_capacity(2 + recent.len() * 2);
        messages.push(ChatMessage::system(RagPrompts::system()));
        for turn in recent {
            messages.push(ChatMessage::user(turn.question.clone()));
            messages.push(ChatMessage::assistant(turn.answer.clone()));
        }

        let values = HashMap::from([("context", context), ("question", question)]);
        messages.push(ChatMessage::user(RagPrompts::context_qa().render(&values)));
        messages
    }
}
