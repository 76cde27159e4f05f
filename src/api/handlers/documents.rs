/// Document upload and management handlers
use axum::extract::rejection::PathRejection;
use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::State;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::types::DeleteResponse;
use crate::api::types::DocumentDetail;
use crate::api::types::DocumentSummary;
use crate::api::types::UploadResponse;
use crate::errors::DocRagError;

/// POST /upload (multipart field `file`)
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(ToString::to_string)
            .ok_or_else(|| DocRagError::InvalidInput("file field has no filename".to_string()))?;
        let bytes = field.bytes().await?;
        info!("POST /upload: {} ({} bytes)", filename, bytes.len());

        let document = state.ingestion.ingest(&filename, &bytes).await?;
        return Ok(Json(document.into()));
    }

    Err(DocRagError::InvalidInput("missing multipart field `file`".to_string()).into())
}

/// GET /documents
pub async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<Vec<DocumentSummary>>> {
    let documents = state.ingestion.list().await?;
    Ok(Json(documents.into_iter().map(DocumentSummary::from).collect()))
}

/// GET /documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DocumentDetail>> {
    let Path(id) = id?;
    let document = state.ingestion.get(id).await?;
    Ok(Json(document.into()))
}

/// DELETE /documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeleteResponse>> {
    let Path(id) = id?;
    info!("DELETE /documents/{}", id);

    let document = state.ingestion.delete(id).await?;
    Ok(Json(DeleteResponse {
        detail: format!("Document {} deleted", document.filename),
    }))
}
