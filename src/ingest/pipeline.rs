//! Upload -> store file -> extract -> chunk -> embed -> index

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashSet;
use sha2::Digest;
use sha2::Sha256;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use super::chunker::Chunker;
use super::chunker::TextSegment;
use super::extract::extract_text;
use super::extract::sanitize_filename;
use super::extract::DocumentKind;
use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::models::Document;
use crate::models::DocumentStatus;
use crate::models::EmbeddedSegment;
use crate::models::NewDocument;
use crate::store::DocumentStore;
use crate::store::VectorIndex;

/// Removes a filename from the in-flight set when the upload finishes
struct InFlight<'a> {
    set: &'a DashSet<String>,
    filename: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.filename);
    }
}

/// Extract, chunk, embed and index one stored document.
///
/// Owns its handles so it can run as a detached task: once a document row
/// exists, dropping the caller's future must not leave it `pending`.
#[derive(Clone)]
struct Indexer {
    documents: Arc<dyn DocumentStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    chunker: Chunker,
    embed_batch_size: usize,
}

pub struct IngestionService {
    documents: Arc<dyn DocumentStore>,
    index: Arc<dyn VectorIndex>,
    indexer: Indexer,
    upload_dir: PathBuf,
    max_upload_bytes: usize,
    in_flight: DashSet<String>,
}

impl IngestionService {
    /// # Errors
    /// - Invalid chunk settings
    pub fn new(
        config: &AppConfig,
        documents: Arc<dyn DocumentStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let indexer = Indexer {
            documents: documents.clone(),
            index: index.clone(),
            embedder,
            chunker: Chunker::new(config.ingestion.chunk_size, config.ingestion.chunk_overlap)?,
            embed_batch_size: config.embeddings.batch_size.max(1),
        };

        Ok(Self {
            documents,
            index,
            indexer,
            upload_dir: config.ingestion.upload_dir.clone(),
            max_upload_bytes: config.ingestion.max_upload_bytes,
            in_flight: DashSet::new(),
        })
    }

    #[must_use]
    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Ingest one uploaded file and return the indexed document.
    ///
    /// # Errors
    /// - `UnsupportedFileType`, `InvalidInput`, `PayloadTooLarge` before anything is stored
    /// - `DuplicateDocument` when the filename is pending or indexed
    /// - `IngestionFailed` once the document exists; it is left `failed` with no segments
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<Document> {
        let filename = sanitize_filename(filename)?;
        let kind = DocumentKind::from_filename(&filename)?;
        if bytes.is_empty() {
            return Err(DocRagError::InvalidInput("uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(DocRagError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let _guard = self.claim(&filename)?;
        self.replace_failed(&filename).await?;

        let id = Uuid::new_v4();
        let filepath = self.store_file(id, &filename, bytes).await?;
        let new_document = NewDocument {
            id,
            filename: filename.clone(),
            filepath: filepath.to_string_lossy().into_owned(),
            byte_size: i64::try_from(bytes.len()).unwrap_or(i64::MAX),
            checksum: hex::encode(Sha256::digest(bytes)),
        };

        if let Err(e) = self.documents.create_document(&new_document).await {
            remove_file_quietly(&filepath).await;
            return Err(e);
        }
        info!("Stored {} as document {} ({} bytes)", filename, id, bytes.len());

        // Detached so a dropped request still ends `indexed` or `failed`
        let task = tokio::spawn(self.indexer.clone().run(id, kind, bytes.to_vec()));
        match task.await {
            Ok(Ok(count)) => {
                info!("Indexed document {} with {} segments", id, count);
                self.documents
                    .get_document(id)
                    .await?
                    .ok_or(DocRagError::NotFound(id))
            }
            Ok(Err(e)) => Err(e),
            Err(join_error) => {
                let reason = format!("indexing task aborted: {join_error}");
                self.indexer.fail(id, &reason).await?;
                Err(DocRagError::IngestionFailed {
                    document_id: id,
                    reason,
                })
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        self.documents.list_documents().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Document> {
        self.documents
            .get_document(id)
            .await?
            .ok_or(DocRagError::NotFound(id))
    }

    /// Delete a document, its segments and its stored file
    pub async fn delete(&self, id: Uuid) -> Result<Document> {
        if self.documents.get_document(id).await?.is_none() {
            return Err(DocRagError::NotFound(id));
        }

        let removed_segments = self.index.delete_by_document(id).await?;
        let document = self
            .documents
            .delete_document(id)
            .await?
            .ok_or(DocRagError::NotFound(id))?;
        remove_file_quietly(Path::new(&document.filepath)).await;

        info!(
            "Deleted document {} ({}) and {} segments",
            id, document.filename, removed_segments
        );
        Ok(document)
    }

    fn claim(&self, filename: &str) -> Result<InFlight<'_>> {
        if !self.in_flight.insert(filename.to_string()) {
            return Err(DocRagError::DuplicateDocument(filename.to_string()));
        }
        Ok(InFlight {
            set: &self.in_flight,
            filename: filename.to_string(),
        })
    }

    /// A failed document with this name is dropped so it can be retried;
    /// any other existing document is a duplicate.
    async fn replace_failed(&self, filename: &str) -> Result<()> {
        let Some(existing) = self.documents.find_by_filename(filename).await? else {
            return Ok(());
        };

        if existing.status != DocumentStatus::Failed {
            return Err(DocRagError::DuplicateDocument(filename.to_string()));
        }

        debug!("Replacing failed document {} ({})", existing.id, filename);
        self.index.delete_by_document(existing.id).await?;
        self.documents.delete_document(existing.id).await?;
        remove_file_quietly(Path::new(&existing.filepath)).await;
        Ok(())
    }

    async fn store_file(&self, id: Uuid, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(format!("{id}-{filename}"));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

impl Indexer {
    /// Index the document, or mark it `failed` with no segments
    async fn run(self, id: Uuid, kind: DocumentKind, bytes: Vec<u8>) -> Result<i32> {
        match self.index_document(id, kind, &bytes).await {
            Ok(count) => Ok(count),
            Err(e) => {
                let reason = e.to_string();
                warn!("Ingestion of document {} failed: {}", id, reason);
                self.fail(id, &reason).await?;
                Err(DocRagError::IngestionFailed {
                    document_id: id,
                    reason,
                })
            }
        }
    }

    async fn fail(&self, id: Uuid, reason: &str) -> Result<()> {
        if let Err(cleanup) = self.index.delete_by_document(id).await {
            warn!("Failed to remove segments of {}: {}", id, cleanup);
        }
        self.documents.mark_failed(id, reason).await
    }

    async fn index_document(&self, id: Uuid, kind: DocumentKind, bytes: &[u8]) -> Result<i32> {
        let owned = bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || extract_text(kind, &owned))
            .await
            .map_err(|e| DocRagError::ExtractionError(format!("extraction task failed: {e}")))??;

        let segments = self.chunker.chunk(&text);
        if segments.is_empty() {
            return Err(DocRagError::ExtractionError(
                "no text could be extracted from the file".to_string(),
            ));
        }
        debug!("Document {} split into {} segments", id, segments.len());

        let embedded = self.embed_segments(segments).await?;
        let count = i32::try_from(embedded.len())
            .map_err(|_| DocRagError::InvalidInput("document has too many segments".to_string()))?;

        self.index.insert(id, &embedded).await?;
        self.documents.mark_indexed(id, count).await?;
        Ok(count)
    }

    async fn embed_segments(&self, segments: Vec<TextSegment>) -> Result<Vec<EmbeddedSegment>> {
        let mut embedded = Vec::with_capacity(segments.len());

        for batch in segments.chunks(self.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != texts.len() {
                return Err(DocRagError::EmbeddingError(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embeddings.len()
                )));
            }

            for (segment, embedding) in batch.iter().zip(embeddings) {
                embedded.push(EmbeddedSegment {
                    id: Uuid::new_v4(),
                    ordinal: to_i32(segment.ordinal)?,
                    start_offset: to_i32(segment.start)?,
                    end_offset: to_i32(segment.end)?,
                    text: segment.text.clone(),
                    embedding,
                });
            }
        }

        Ok(embedded)
    }
}

fn to_i32(value: usize) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| DocRagError::InvalidInput(format!("offset {value} out of range")))
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
