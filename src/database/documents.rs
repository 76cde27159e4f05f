use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use super::Database;
use crate::errors::DocRagError;
use crate::models::Document;
use crate::models::DocumentStatus;
use crate::models::NewDocument;
use crate::store::DocumentStore;
use crate::Result;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    filename: String,
    filepath: String,
    byte_size: i64,
    checksum: String,
    status: String,
    error: Option<String>,
    segment_count: i32,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DocRagError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            filename: row.filename,
            filepath: row.filepath,
            byte_size: row.byte_size,
            checksum: row.checksum,
            status: row.status.parse()?,
            error: row.error,
            segment_count: row.segment_count,
            uploaded_at: row.uploaded_at,
            updated_at: row.updated_at,
        })
    }
}

const DOCUMENT_COLUMNS: &str = "id, filename, filepath, byte_size, checksum, status, error, \
                                segment_count, uploaded_at, updated_at";

#[async_trait]
impl DocumentStore for Database {
    async fn create_document(&self, new: &NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r"
            INSERT INTO documents (id, filename, filepath, byte_size, checksum, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DOCUMENT_COLUMNS}
            "
        ))
        .bind(new.id)
        .bind(&new.filename)
        .bind(&new.filepath)
        .bind(new.byte_size)
        .bind(&new.checksum)
        .bind(DocumentStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DocRagError::DuplicateDocument(new.filename.clone())
            }
            other => DocRagError::Database(other),
        })?;

        row.try_into()
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE filename = $1"
        ))
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY uploaded_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    async fn mark_indexed(&self, id: Uuid, segment_count: i32) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET status = $2, segment_count = $3, error = NULL, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(DocumentStatus::Indexed.as_str())
        .bind(segment_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocRagError::NotFound(id));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET status = $2, segment_count = 0, error = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(DocumentStatus::Failed.as_str())
        .bind(reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DocRagError::NotFound(id));
        }
        Ok(())
    }

    async fn delete_document(&self, id: Uuid) -> Result<Option<Document>> {
        // Segments go with the row via ON DELETE CASCADE
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "DELETE FROM documents WHERE id = $1 RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Document::try_from).transpose()
    }

    async fn recover_interrupted(&self) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET status = $1, error = 'ingestion interrupted', updated_at = NOW()
            WHERE status = $2
            ",
        )
        .bind(DocumentStatus::Failed.as_str())
        .bind(DocumentStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
