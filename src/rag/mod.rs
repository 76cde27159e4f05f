//! RAG (Retrieval-Augmented Generation) module
//!
//! Answers questions from uploaded documents:
//! - Semantic retrieval of segments by vector similarity
//! - Bounded context assembly from the ranked segments
//! - LLM-based answer generation with optional conversation history
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use docrag::config::AppConfig;
//! use docrag::database::Database;
//! use docrag::embeddings::EmbeddingService;
//! use docrag::llm::LlmService;
//! use docrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let database = Arc::new(Database::from_config(&config).await?);
//!     let service = RagService::new(
//!         &config,
//!         Arc::new(EmbeddingService::new(&config)?),
//!         database,
//!         Arc::new(LlmService::new(&config)?),
//!     );
//!
//!     let response = service.query("What does the contract say about renewal?").await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} segments", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::AskQuery;
pub use pipeline::Citation;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use retriever::Retriever;
