//! In-process document store and vector index using cosine similarity.
//!
//! Everything lives behind one `tokio::sync::RwLock`, so writes to a
//! document's segment set are serialised against each other and against
//! deletes. Suitable for tests and small local runs; data is lost on exit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DocumentStore;
use super::VectorIndex;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::models::Document;
use crate::models::DocumentStatus;
use crate::models::EmbeddedSegment;
use crate::models::NewDocument;
use crate::models::SegmentHit;

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    segments: HashMap<Uuid, Vec<EmbeddedSegment>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored segments across all documents
    pub async fn total_segments(&self) -> usize {
        self.inner.read().await.segments.values().map(Vec::len).sum()
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude and -1.0
/// (the lowest rank) when a component is NaN
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a * norm_b);
    if similarity.is_nan() {
        -1.0
    } else {
        similarity
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, new: &NewDocument) -> Result<Document> {
        let mut inner = self.inner.write().await;
        if inner.documents.values().any(|d| d.filename == new.filename) {
            return Err(DocRagError::DuplicateDocument(new.filename.clone()));
        }

        let now = Utc::now();
        let document = Document {
            id: new.id,
            filename: new.filename.clone(),
            filepath: new.filepath.clone(),
            byte_size: new.byte_size,
            checksum: new.checksum.clone(),
            status: DocumentStatus::Pending,
            error: None,
            segment_count: 0,
            uploaded_at: now,
            updated_at: now,
        };
        inner.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.inner.read().await.documents.get(&id).cloned())
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<Document>> {
        Ok(self
            .inner
            .read()
            .await
            .documents
            .values()
            .find(|d| d.filename == filename)
            .cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> =
            self.inner.read().await.documents.values().cloned().collect();
        documents.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(documents)
    }

    async fn mark_indexed(&self, id: Uuid, segment_count: i32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let document = inner
            .documents
            .get_mut(&id)
            .ok_or(DocRagError::NotFound(id))?;
        document.status = DocumentStatus::Indexed;
        document.segment_count = segment_count;
        document.error = None;
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let document = inner
            .documents
            .get_mut(&id)
            .ok_or(DocRagError::NotFound(id))?;
        document.status = DocumentStatus::Failed;
        document.segment_count = 0;
        document.error = Some(reason.to_string());
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> Result<Option<Document>> {
        let mut inner = self.inner.write().await;
        let removed = inner.documents.remove(&id);
        if removed.is_some() {
            inner.segments.remove(&id);
        }
        Ok(removed)
    }

    async fn recover_interrupted(&self) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let mut touched = 0;
        for document in inner.documents.values_mut() {
            if document.status == DocumentStatus::Pending {
                document.status = DocumentStatus::Failed;
                document.error = Some("ingestion interrupted".to_string());
                document.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl VectorIndex for MemoryStore {
    async fn insert(&self, document_id: Uuid, segments: &[EmbeddedSegment]) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.documents.contains_key(&document_id) {
            return Err(DocRagError::NotFound(document_id));
        }
        inner.segments.insert(document_id, segments.to_vec());
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        scope: Option<Uuid>,
    ) -> Result<Vec<SegmentHit>> {
        let inner = self.inner.read().await;

        let mut hits: Vec<SegmentHit> = inner
            .segments
            .iter()
            .filter(|(document_id, _)| scope.map_or(true, |s| s == **document_id))
            .filter_map(|(document_id, segments)| {
                inner
                    .documents
                    .get(document_id)
                    .filter(|d| d.status == DocumentStatus::Indexed)
                    .map(|d| (d, segments))
            })
            .flat_map(|(document, segments)| {
                segments.iter().map(move |segment| SegmentHit {
                    segment_id: segment.id,
                    document_id: document.id,
                    filename: document.filename.clone(),
                    ordinal: segment.ordinal,
                    text: segment.text.clone(),
                    score: cosine_similarity(&segment.embedding, query_embedding),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.segment_id.cmp(&b.segment_id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .segments
            .remove(&document_id)
            .map_or(0, |segments| segments.len() as u64))
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .segments
            .get(&document_id)
            .map_or(0, |segments| segments.len() as i64))
    }
}
