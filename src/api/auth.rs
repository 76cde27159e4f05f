use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::api::error::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub expected_token: String,
}

/// Bearer token authentication middleware
///
/// Missing header is 401, a non-bearer scheme is 403, a wrong token is 401.
pub async fn bearer_auth_middleware(
    State(state): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return ApiError::unauthorized("Not authenticated").into_response();
    };

    let Some((scheme, token)) = header.to_str().ok().and_then(|h| h.split_once(' ')) else {
        return ApiError::forbidden("Invalid authentication scheme").into_response();
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return ApiError::forbidden("Invalid authentication scheme").into_response();
    }

    if token.trim() != state.expected_token {
        return ApiError::unauthorized("Invalid or expired token").into_response();
    }

    next.run(request).await
}
