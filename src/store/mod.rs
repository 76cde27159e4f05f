//! Storage seams for documents and their segment embeddings
//!
//! Two traits split persistence the way the service uses it:
//! - [`DocumentStore`] owns document metadata and status transitions
//! - [`VectorIndex`] owns `(segment, embedding, document)` tuples and answers
//!   nearest-neighbour queries
//!
//! [`crate::database::Database`] implements both on Postgres + pgvector.
//! [`MemoryStore`] implements both in-process for tests and local runs.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::models::Document;
use crate::models::EmbeddedSegment;
use crate::models::NewDocument;
use crate::models::SegmentHit;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a `pending` document. Fails with `DuplicateDocument` when the
    /// filename is taken.
    async fn create_document(&self, new: &NewDocument) -> Result<Document>;

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>>;

    async fn find_by_filename(&self, filename: &str) -> Result<Option<Document>>;

    /// All documents, oldest upload first
    async fn list_documents(&self) -> Result<Vec<Document>>;

    async fn mark_indexed(&self, id: Uuid, segment_count: i32) -> Result<()>;

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()>;

    /// Remove a document and every segment derived from it.
    /// Returns the removed record, or `None` if the id was unknown.
    async fn delete_document(&self, id: Uuid) -> Result<Option<Document>>;

    /// Mark documents stuck in `pending` (left behind by an interrupted
    /// process) as failed. Returns how many were touched.
    async fn recover_interrupted(&self) -> Result<u64>;
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Atomically replace the segment set of one document
    async fn insert(&self, document_id: Uuid, segments: &[EmbeddedSegment]) -> Result<()>;

    /// Top-`k` segments of indexed documents by cosine similarity.
    ///
    /// Results are ordered by non-increasing score; ties are broken by
    /// segment id so a given call is deterministic. `scope` restricts the
    /// search to one document.
    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        scope: Option<Uuid>,
    ) -> Result<Vec<SegmentHit>>;

    /// Remove every segment of a document, returning the number removed
    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64>;

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64>;
}
