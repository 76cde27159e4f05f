//! Plain-text extraction from uploaded files

use std::path::Path;

use tracing::debug;

use crate::errors::DocRagError;
use crate::errors::Result;

/// Supported upload formats, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Text),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(DocRagError::UnsupportedFileType(filename.to_string())),
        }
    }
}

/// Strip any directory part from a client-supplied filename
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(DocRagError::InvalidInput(format!(
            "invalid filename: {raw:?}"
        )));
    }
    Ok(name.to_string())
}

/// Extract text from file bytes. PDF parsing is CPU-bound; run it off the
/// async executor.
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf_text(bytes)?,
        DocumentKind::Text | DocumentKind::Markdown => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                DocRagError::ExtractionError(format!("file is not valid UTF-8: {e}"))
            })?;
            text.trim_start_matches('\u{feff}').to_string()
        }
    };

    debug!("Extracted {} chars from {:?} file", text.len(), kind);
    Ok(text)
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed files
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocRagError::ExtractionError(format!(
            "failed to read PDF: {e}"
        ))),
        Err(_) => Err(DocRagError::ExtractionError(
            "PDF parser crashed on this file".to_string(),
        )),
    }
}
