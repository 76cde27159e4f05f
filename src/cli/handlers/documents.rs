//! Document management handlers: upload, list, delete, config

use std::path::Path;

use uuid::Uuid;

use crate::api::connect_state;
use crate::cli::output::print_config;
use crate::cli::output::print_document;
use crate::cli::output::print_document_list;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::errors::DocRagError;
use crate::AppConfig;
use crate::Result;

pub async fn handle_upload_command(config: &AppConfig, path: &Path) -> Result<()> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DocRagError::InvalidInput(format!("not a file path: {}", path.display())))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;

    let (_database, state) = connect_state(config).await?;

    print_info(&format!("📥 Uploading {} ({} bytes)...", filename, bytes.len()));
    let document = state.ingestion.ingest(&filename, &bytes).await?;

    print_success(&format!("Indexed {} segments", document.segment_count));
    print_document(&document);
    Ok(())
}

pub async fn handle_list_command(config: &AppConfig) -> Result<()> {
    let (_database, state) = connect_state(config).await?;
    let documents = state.ingestion.list().await?;
    print_document_list(&documents);
    Ok(())
}

pub async fn handle_delete_command(config: &AppConfig, id: Uuid) -> Result<()> {
    let (_database, state) = connect_state(config).await?;
    let document = state.ingestion.delete(id).await?;
    print_success(&format!("Deleted {} ({})", document.filename, document.id));
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    Ok(())
}
