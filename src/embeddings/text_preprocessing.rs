//! Text preprocessing utilities for embedding generation

use tracing::debug;

use crate::errors::DocRagError;

/// Normalise text before it is sent for embedding.
///
/// Collapses runs of whitespace (newlines, tabs, CR) into single spaces and
/// replaces control characters. Fails when nothing but whitespace remains.
pub fn preprocess_text_for_embedding(text: &str) -> Result<String, DocRagError> {
    let sanitized = sanitize_text(&normalize_whitespace(text));

    if sanitized.trim().is_empty() {
        return Err(DocRagError::EmbeddingError(
            "Text contains only whitespace after preprocessing".to_string(),
        ));
    }

    debug!(
        "Preprocessed text: {} -> {} chars",
        text.len(),
        sanitized.len()
    );
    Ok(sanitized)
}

/// Normalize whitespace and newlines
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        let out = preprocess_text_for_embedding("  alpha\r\n\tbeta \n\n gamma ").unwrap();
        assert_eq!(out, "alpha beta gamma");
    }

    #[test]
    fn test_replaces_control_characters() {
        let out = preprocess_text_for_embedding("a\u{0007}b").unwrap();
        assert_eq!(out, "a b");
    }

    #[test]
    fn test_whitespace_only_is_rejected() {
        assert!(preprocess_text_for_embedding(" \n\t ").is_err());
        assert!(preprocess_text_for_embedding("").is_err());
    }
}
