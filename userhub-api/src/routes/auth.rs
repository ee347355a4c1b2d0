//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /api/auth/register` - Create an account and get a token
//! - `POST /api/auth/login` - Exchange credentials for a token
//! - `GET /api/auth/me` - Current account (token)
//! - `POST /api/auth/logout` - Stateless logout (token)
//!
//! Tokens are not tracked server-side, so logout only acknowledges the call
//! and the client discards its token.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    middleware::auth::CurrentUser,
    routes::{users::NewAccountRequest, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use userhub_shared::{
    auth::{jwt::require_secret, password::verify_password_async},
    models::user::User,
};

const EMAIL_REGISTERED: &str = "User already exists with this email";

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,

    /// Bearer token for the `Authorization` header
    pub token: String,

    pub user: User,
}

/// Response for `GET /auth/me`
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "ada.lovelace@example.com",
///   "password": "secret1",
///   "firstName": "Ada",
///   "lastName": "Lovelace"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields or validation failed
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Signing secret unset or server error
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewAccountRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let new_user = req.into_new_user(&state, EMAIL_REGISTERED).await?;

    // Nothing is persisted if a token could not be issued afterwards
    require_secret(state.jwt_secret())?;

    let user = User::create(&state.db, new_user)
        .await
        .map_err(|err| match ApiError::from(err) {
            ApiError::Conflict(_) => ApiError::Conflict(EMAIL_REGISTERED.to_string()),
            other => other,
        })?;
    let token = state.issue_token(&user)?;

    tracing::info!(user_id = user.id, email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user,
        }),
    ))
}

/// Log in with e-mail and password
///
/// Unknown e-mails and wrong passwords get the same message.
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing
/// - `401 Unauthorized`: Invalid credentials or deactivated account
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (email, password) = match (req.email, req.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Email and password are required".to_string(),
            ))
        }
    };

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = User::find_by_email(&state.db, email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        tracing::info!(user_id = user.id, "Login refused for deactivated account");
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }

    if !verify_password_async(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = user.id, "Login failed");
        return Err(invalid());
    }

    let token = state.issue_token(&user)?;

    tracing::info!(user_id = user.id, email = %user.email, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

/// Current account
pub async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user })
}

/// Logout
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<MessageResponse> {
    tracing::info!(user_id = user.id, "User logged out");
    Json(MessageResponse::new("Logout successful"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_tolerates_missing_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@example.com"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@example.com"));
        assert!(req.password.is_none());
    }

    #[test]
    fn test_me_response_shape() {
        let now = chrono::Utc::now();
        let body = serde_json::to_value(MeResponse {
            user: User {
                id: 3,
                email: "grace.hopper@example.com".to_string(),
                password_hash: "$argon2id$hash".to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        })
        .unwrap();

        assert_eq!(body["user"]["firstName"], "Grace");
        assert!(body["user"].get("passwordHash").is_none());
    }
}
