//! Adds the cause of server errors to response bodies outside production
//!
//! Handlers never put internal details in the body themselves. [`ApiError`]
//! leaves them in an [`InternalErrorDetail`] extension and this middleware
//! decides whether the client gets to see them.
//!
//! [`ApiError`]: crate::error::ApiError

use crate::{
    app::AppState,
    error::{ErrorResponse, InternalErrorDetail, INTERNAL_ERROR_MESSAGE},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

pub async fn expose_error_details(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    if state.config.is_production() {
        return response;
    }

    let Some(InternalErrorDetail(cause)) = response
        .extensions()
        .get::<InternalErrorDetail>()
        .cloned()
    else {
        return response;
    };

    let (parts, _) = response.into_parts();
    let body = ErrorResponse {
        error: INTERNAL_ERROR_MESSAGE.to_string(),
        details: None,
        stack: Some(cause),
    };

    (parts, Json(body)).into_response()
}
