//! Error responses: every failure is returned as JSON `{error, kind}`

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use tracing::error;
use tracing::warn;

use crate::api::types::ErrorBody;
use crate::errors::DocRagError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }
}

/// HTTP status for each error class
#[must_use]
pub const fn status_for(err: &DocRagError) -> StatusCode {
    match err {
        DocRagError::NotFound(_) => StatusCode::NOT_FOUND,
        DocRagError::DuplicateDocument(_) => StatusCode::CONFLICT,
        DocRagError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        DocRagError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DocRagError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        DocRagError::ExtractionError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DocRagError::IngestionFailed { .. }
        | DocRagError::GenerationFailed(_)
        | DocRagError::EmbeddingError(_)
        | DocRagError::LlmError(_)
        | DocRagError::HttpError(_) => StatusCode::BAD_GATEWAY,
        DocRagError::RetrievalFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
        DocRagError::Database(_)
        | DocRagError::ConfigError(_)
        | DocRagError::Serialization(_)
        | DocRagError::TomlParsing(_)
        | DocRagError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DocRagError> for ApiError {
    fn from(err: DocRagError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!("Request failed: {}", err);
        } else {
            warn!("Request rejected: {}", err);
        }
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "invalid_input", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        let kind = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "payload_too_large"
        } else {
            "invalid_input"
        };
        Self::new(status, kind, err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            kind: self.kind.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DocRagError::NotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DocRagError::DuplicateDocument("a.pdf".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DocRagError::UnsupportedFileType("a.png".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status_for(&DocRagError::PayloadTooLarge { size: 2, limit: 1 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&DocRagError::GenerationFailed("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&DocRagError::RetrievalFailed("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&DocRagError::Io(std::io::Error::other("disk"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_keeps_kind() {
        let api: ApiError = DocRagError::InvalidInput("empty".into()).into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.kind, "invalid_input");
        assert!(api.message.contains("empty"));
    }
}
