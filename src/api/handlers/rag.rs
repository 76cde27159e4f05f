/// Question-answering handler
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::error::ApiResult;
use crate::api::types::AskRequest;
use crate::api::types::AskResponse;

/// POST /ask
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AskResponse>> {
    let Json(req) = payload?;
    info!("POST /ask: {}", req.question);

    let response = state.rag.ask(req.into()).await?;
    Ok(Json(response.into()))
}
