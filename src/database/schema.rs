use super::Database;
use crate::errors::DocRagError;
use crate::Result;

impl Database {
    /// Check if database schema is initialized
    /// Returns true if all required tables exist
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        for table_name in ["documents", "segments"] {
            let exists = sqlx::query_scalar::<_, bool>(
                r"
                SELECT EXISTS (
                    SELECT FROM information_schema.tables
                    WHERE table_schema = 'public'
                    AND table_name = $1
                )
                ",
            )
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                tracing::debug!("Missing required table: {}", table_name);
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Verify database schema or return helpful error
    pub async fn verify_schema_or_error(&self) -> Result<()> {
        if !self.is_schema_initialized().await? {
            return Err(DocRagError::ConfigError(
                "Database schema not initialized. Run `docrag init` first.".to_string(),
            ));
        }
        Ok(())
    }

    /// Initialize database schema
    ///
    /// Idempotent. `dimension` fixes the width of the embedding column;
    /// `index_lists` creates an ivfflat cosine index with that many lists.
    pub async fn init_schema(&self, dimension: usize, index_lists: Option<usize>) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                filename TEXT NOT NULL UNIQUE,
                filepath TEXT NOT NULL,
                byte_size BIGINT NOT NULL,
                checksum VARCHAR(64) NOT NULL,
                status VARCHAR(16) NOT NULL DEFAULT 'pending',
                error TEXT,
                segment_count INTEGER NOT NULL DEFAULT 0,
                uploaded_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Dimension is a config integer, not user input
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS segments (
                id UUID PRIMARY KEY,
                document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                ordinal INTEGER NOT NULL,
                start_offset INTEGER NOT NULL,
                end_offset INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding VECTOR({dimension}) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                UNIQUE (document_id, ordinal)
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_segments_document_id ON segments(document_id)",
        )
        .execute(&self.pool)
        .await?;

        if let Some(lists) = index_lists {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_segments_embedding ON segments \
                 USING ivfflat (embedding vector_cosine_ops) WITH (lists = {lists})"
            ))
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Database schema initialized (embedding dimension {dimension})");
        Ok(())
    }
}
