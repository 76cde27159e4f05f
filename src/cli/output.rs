//! CLI output formatting utilities

use crate::models::Document;
use crate::rag::RagResponse;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// Returns the string with a "..." suffix if it was truncated.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

pub fn print_document_list(documents: &[Document]) {
    if documents.is_empty() {
        print_info("No documents uploaded yet");
        return;
    }

    println!("📋 {} document(s):", documents.len());
    for document in documents {
        println!(
            "  - {} | {} | {} | {} segments | {}",
            document.id,
            truncate_str(&document.filename, 40),
            document.status,
            document.segment_count,
            document.uploaded_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(error) = &document.error {
            println!("      error: {}", truncate_str(error, 100));
        }
    }
}

pub fn print_document(document: &Document) {
    println!("📄 {}", document.filename);
    println!("  ID: {}", document.id);
    println!("  Status: {}", document.status);
    println!("  Segments: {}", document.segment_count);
    println!("  Size: {} bytes", document.byte_size);
    println!("  SHA-256: {}", document.checksum);
    if let Some(error) = &document.error {
        println!("  Error: {error}");
    }
}

pub fn print_answer(response: &RagResponse) {
    println!("{}", response.answer);
    if !response.citations.is_empty() {
        println!();
        println!("📚 Sources:");
        for (idx, citation) in response.citations.iter().enumerate() {
            println!(
                "  [{}] {} (part {}) score {:.3}",
                idx + 1,
                citation.filename,
                citation.ordinal + 1,
                citation.score
            );
        }
    }
}

/// Print configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    let config = config.redacted();
    println!("📋 docrag Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", config.database_url());
    println!("  Max connections: {}", config.max_connections());
    println!("  Min connections: {}", config.min_connections());
    println!("  Connection timeout: {}s", config.connection_timeout());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!();

    println!("🧠 Embeddings:");
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embeddings.model);
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!("  Key: {}", config.embeddings.api_key);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm.llm_endpoint);
    println!("  Model: {}", config.llm.llm_model);
    println!("  Key: {}", config.llm.llm_key);
    println!();

    println!("📥 Ingestion:");
    println!("  Upload dir: {}", config.ingestion.upload_dir.display());
    println!(
        "  Chunk size/overlap: {}/{} words",
        config.ingestion.chunk_size, config.ingestion.chunk_overlap
    );
    println!("  Max upload: {} bytes", config.ingestion.max_upload_bytes);
    println!();

    println!("🔎 Retrieval:");
    println!(
        "  top_k: {} (max {})",
        config.retrieval.top_k, config.retrieval.max_top_k
    );
    println!("  Max context: {} chars", config.retrieval.max_context_chars);
    println!();

    println!("⚡ Performance:");
    println!("  Vector indexes: {}", config.vector_indexes_enabled());
    println!("  Vector index lists: {}", config.vector_index_lists());
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!(
        "  Auth token: {}",
        config.server.auth_token.as_deref().unwrap_or("(disabled)")
    );
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
