//! Runs against a real Postgres with pgvector. Needs a scratch database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use std::sync::Arc;

use common::hash_embedding;
use common::HashEmbedder;
use common::RecordingChat;
use common::DIMENSION;
use docrag::api::AppState;
use docrag::database::Database;
use docrag::models::DocumentStatus;
use docrag::store::DocumentStore;
use docrag::store::VectorIndex;
use docrag::Result;
use sqlx::PgPool;
use tempfile::TempDir;

async fn setup_test_db() -> Result<Database> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await?;
    let db = Database::new(pool);
    db.init_schema(DIMENSION, None).await?;
    Ok(db)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at Postgres with pgvector"]
async fn test_postgres_ingest_search_delete() -> Result<()> {
    let db = Arc::new(setup_test_db().await?);
    assert!(db.is_schema_initialized().await?);

    let upload_dir = TempDir::new().unwrap();
    let config = common::test_config(&upload_dir);
    let state = AppState::new(
        &config,
        db.clone(),
        db.clone(),
        Arc::new(HashEmbedder),
        Arc::new(RecordingChat::answering("ok")),
    )?;

    let filename = format!("pg-{}.txt", uuid::Uuid::new_v4());
    let document = state
        .ingestion
        .ingest(&filename, common::words(500).as_bytes())
        .await?;
    assert_eq!(document.status, DocumentStatus::Indexed);
    assert_eq!(db.count_for_document(document.id).await?, 3);

    let hits = db
        .search(&hash_embedding("word1 word2 word3"), 2, Some(document.id))
        .await?;
    assert_eq!(hits.len(), 2);
    assert!(hits[0].score >= hits[1].score);

    let duplicate = state.ingestion.ingest(&filename, b"again").await;
    assert!(matches!(duplicate, Err(docrag::DocRagError::DuplicateDocument(_))));

    state.ingestion.delete(document.id).await?;
    assert!(db.get_document(document.id).await?.is_none());
    assert_eq!(db.count_for_document(document.id).await?, 0);
    Ok(())
}
