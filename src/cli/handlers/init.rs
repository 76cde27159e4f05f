//! Database initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::AppConfig;
use crate::Result;

/// Handle database initialization command
pub async fn handle_init_command(config: &AppConfig, skip_indexes: bool) -> Result<()> {
    print_info("🗄️  Initializing docrag database...");

    let database = Database::from_config(config).await?;

    let index_lists = if skip_indexes || !config.vector_indexes_enabled() {
        print_info("⏭️  Skipping vector index creation");
        None
    } else {
        Some(config.vector_index_lists())
    };

    if let Err(e) = database
        .init_schema(config.embedding_dimension(), index_lists)
        .await
    {
        if e.to_string().contains("vector") || e.to_string().contains("extension") {
            print_warning(&format!("⚠️  Could not enable pgvector extension: {e}"));
            print_warning("Run as a database superuser:");
            println!("  psql -c 'CREATE EXTENSION IF NOT EXISTS vector;'");
        }
        return Err(e);
    }

    print_success(&format!(
        "Schema ready (embedding dimension {})",
        config.embedding_dimension()
    ));
    print_info("ℹ️  To start the API server, run:");
    println!("   docrag serve");

    Ok(())
}
