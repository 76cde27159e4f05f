//! Document ingestion: extract, chunk, embed, index
//!
//! [`IngestionService::ingest`] takes an uploaded file from raw bytes to an
//! `indexed` document, or leaves it `failed` with no segments stored.

pub mod chunker;
pub mod extract;
pub mod pipeline;

pub use chunker::reassemble;
pub use chunker::Chunker;
pub use chunker::TextSegment;
pub use extract::DocumentKind;
pub use pipeline::IngestionService;
