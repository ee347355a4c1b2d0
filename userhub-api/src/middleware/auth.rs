//! Bearer-token authentication for protected routes
//!
//! [`require_auth`] is installed with `route_layer` on every protected router.
//! On success it stores the resolved [`User`] in the request extensions, where
//! handlers pick it up through the [`CurrentUser`] extractor.

use crate::{app::AppState, error::ApiError};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use userhub_shared::{auth::middleware::authenticate, models::user::User};

/// Rejects requests without a valid token for an active account
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state.db, req.headers(), state.jwt_secret()).await?;

    tracing::debug!(user_id = user.id, "Request authenticated");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// The account behind the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
    }
}
