//! API request and response types

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::models::ChatTurn;
use crate::models::Document;
use crate::models::DocumentStatus;
use crate::rag::AskQuery;
use crate::rag::Citation;
use crate::rag::RagResponse;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

/// Result of `POST /upload`
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub filename: String,
    pub status: DocumentStatus,
    pub segments: i32,
}

impl From<Document> for UploadResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            status: document.status,
            segments: document.segment_count,
        }
    }
}

/// `POST /ask` body
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub document_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

impl From<AskRequest> for AskQuery {
    fn from(req: AskRequest) -> Self {
        Self {
            question: req.question,
            top_k: req.top_k,
            document_id: req.document_id,
            history: req.history,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub sources: Vec<Uuid>,
    pub citations: Vec<Citation>,
}

impl From<RagResponse> for AskResponse {
    fn from(response: RagResponse) -> Self {
        Self {
            answer: response.answer,
            sources: response.sources,
            citations: response.citations,
        }
    }
}

/// Row of `GET /documents`
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    pub segments: i32,
}

impl From<Document> for DocumentSummary {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            status: document.status,
            uploaded_at: document.uploaded_at,
            segments: document.segment_count,
        }
    }
}

/// `GET /documents/{id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: Uuid,
    pub filename: String,
    pub status: DocumentStatus,
    pub error: Option<String>,
    pub byte_size: i64,
    pub checksum: String,
    pub segments: i32,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentDetail {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            status: document.status,
            error: document.error,
            byte_size: document.byte_size,
            checksum: document.checksum,
            segments: document.segment_count,
            uploaded_at: document.uploaded_at,
            updated_at: document.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_request_optional_fields() {
        let req: AskRequest = serde_json::from_str(r#"{"question": "what?"}"#).unwrap();
        assert_eq!(req.question, "what?");
        assert!(req.top_k.is_none());
        assert!(req.document_id.is_none());
        assert!(req.history.is_empty());
    }

    #[test]
    fn test_ask_request_with_history() {
        let req: AskRequest = serde_json::from_str(
            r#"{"question": "and then?", "top_k": 2,
                "history": [{"question": "first?", "answer": "yes"}]}"#,
        )
        .unwrap();
        let query = AskQuery::from(req);
        assert_eq!(query.top_k, Some(2));
        assert_eq!(query.history.len(), 1);
    }
}
