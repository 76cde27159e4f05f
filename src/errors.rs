use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DocRagError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Document already exists: {0}")]
    DuplicateDocument(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Text extraction failed: {0}")]
    ExtractionError(String),

    /// Extraction, chunking, embedding or storage failed for one document.
    /// The document has been marked `failed`.
    #[error("Ingestion failed for document {document_id}: {reason}")]
    IngestionFailed { document_id: Uuid, reason: String },

    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocRagError {
    /// Short machine-readable name of the error class
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "storage_failure",
            Self::NotFound(_) => "not_found",
            Self::DuplicateDocument(_) => "duplicate_document",
            Self::UnsupportedFileType(_) => "unsupported_file_type",
            Self::InvalidInput(_) => "invalid_input",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::ExtractionError(_) => "extraction_failure",
            Self::IngestionFailed { .. } => "ingestion_failure",
            Self::RetrievalFailed(_) => "retrieval_failure",
            Self::GenerationFailed(_) => "generation_failure",
            Self::EmbeddingError(_) => "embedding_failure",
            Self::LlmError(_) => "llm_failure",
            Self::HttpError(_) => "http_failure",
            Self::ConfigError(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::TomlParsing(_) => "config_error",
            Self::Io(_) => "storage_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, DocRagError>;
