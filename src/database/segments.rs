use async_trait::async_trait;
use uuid::Uuid;

use super::Database;
use crate::errors::DocRagError;
use crate::models::EmbeddedSegment;
use crate::models::SegmentHit;
use crate::store::VectorIndex;
use crate::Result;

#[async_trait]
impl VectorIndex for Database {
    /// Replace a document's segments in one transaction
    async fn insert(&self, document_id: Uuid, segments: &[EmbeddedSegment]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE id = $1)",
        )
        .bind(document_id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(DocRagError::NotFound(document_id));
        }

        sqlx::query("DELETE FROM segments WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;

        for segment in segments {
            sqlx::query(
                r"
                INSERT INTO segments
                (id, document_id, ordinal, start_offset, end_offset, text, embedding)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(segment.id)
            .bind(document_id)
            .bind(segment.ordinal)
            .bind(segment.start_offset)
            .bind(segment.end_offset)
            .bind(&segment.text)
            .bind(pgvector::Vector::from(segment.embedding.clone()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(
            "Stored {} segments for document {}",
            segments.len(),
            document_id
        );
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        k: usize,
        scope: Option<Uuid>,
    ) -> Result<Vec<SegmentHit>> {
        #[derive(sqlx::FromRow)]
        struct RawHit {
            segment_id: Uuid,
            document_id: Uuid,
            filename: String,
            ordinal: i32,
            text: String,
            similarity: f64, // FLOAT8 from the distance operator
        }

        let query_embedding = pgvector::Vector::from(query_embedding.to_vec());
        let limit = i64::try_from(k).unwrap_or(i64::MAX);

        let raw_hits = sqlx::query_as::<_, RawHit>(
            r"
            SELECT
                s.id AS segment_id,
                s.document_id,
                d.filename,
                s.ordinal,
                s.text,
                1 - (s.embedding <=> $1::vector) AS similarity
            FROM segments s
            INNER JOIN documents d ON s.document_id = d.id
            WHERE d.status = 'indexed'
              AND ($3::uuid IS NULL OR s.document_id = $3)
            ORDER BY s.embedding <=> $1::vector, s.id
            LIMIT $2
            ",
        )
        .bind(&query_embedding)
        .bind(limit)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        Ok(raw_hits
            .into_iter()
            .map(|r| SegmentHit {
                segment_id: r.segment_id,
                document_id: r.document_id,
                filename: r.filename,
                ordinal: r.ordinal,
                text: r.text,
                score: r.similarity as f32,
            })
            .collect())
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM segments WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_for_document(&self, document_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM segments WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
