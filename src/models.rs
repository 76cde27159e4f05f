use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::DocRagError;

/// Processing status of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Stored, ingestion still running (or interrupted)
    Pending,
    /// Every segment embedded and stored
    Indexed,
    /// Ingestion failed; safe to re-upload
    Failed,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Indexed => "indexed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = DocRagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "indexed" => Ok(Self::Indexed),
            "failed" => Ok(Self::Failed),
            other => Err(DocRagError::InvalidInput(format!(
                "unknown document status: {other}"
            ))),
        }
    }
}

/// An uploaded source document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    pub filepath: String,
    pub byte_size: i64,
    /// Hex-encoded SHA-256 of the uploaded bytes
    pub checksum: String,
    pub status: DocumentStatus,
    pub error: Option<String>,
    pub segment_count: i32,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a document record in `pending` state
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub filename: String,
    pub filepath: String,
    pub byte_size: i64,
    pub checksum: String,
}

/// A bounded slice of a document's extracted text together with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedSegment {
    pub id: Uuid,
    pub ordinal: i32,
    pub start_offset: i32,
    pub end_offset: i32,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A segment returned by nearest-neighbour search
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentHit {
    pub segment_id: Uuid,
    pub document_id: Uuid,
    pub filename: String,
    pub ordinal: i32,
    pub text: String,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

/// One earlier question/answer exchange supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
}
