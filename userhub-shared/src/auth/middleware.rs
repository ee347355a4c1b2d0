//! Resolving the account behind an `Authorization` header
//!
//! [`authenticate`] runs the bearer-token checks in a fixed order and returns
//! the active account the token belongs to. The HTTP layer wraps it into an
//! axum middleware; keeping the checks here lets them be exercised without a
//! router.
//!
//! # Order of checks
//!
//! 1. Bearer token present, otherwise [`AuthError::MissingToken`]
//! 2. Signing secret configured, otherwise [`AuthError::SecretNotConfigured`]
//! 3. Token signature and shape, otherwise [`AuthError::InvalidToken`]
//! 4. Token not expired, otherwise [`AuthError::TokenExpired`]
//! 5. Account exists and is active, otherwise [`AuthError::UserNotFound`]

use axum::http::{header, HeaderMap, StatusCode};
use sqlx::PgPool;
use tracing::debug;

use super::jwt::{require_secret, validate_token, JwtError};
use crate::models::user::User;

/// Error type for request authentication
///
/// The `Display` text of every variant is the message returned to clients.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Access token required")]
    MissingToken,

    /// The server has no signing secret
    #[error("JWT secret not configured")]
    SecretNotConfigured,

    /// Signature, format or issuer is wrong
    #[error("Invalid token")]
    InvalidToken,

    /// Token is past its expiration
    #[error("Token expired")]
    TokenExpired,

    /// Token subject is unknown or deactivated
    #[error("Invalid token or user not found")]
    UserNotFound,

    /// Account lookup failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    /// HTTP status associated with this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::SecretNotConfigured | AuthError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret => AuthError::SecretNotConfigured,
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::CreateError(_) | JwtError::Invalid(_) => AuthError::InvalidToken,
        }
    }
}

/// Extracts the bearer token from request headers
///
/// The scheme is matched case-insensitively. A header with another scheme, an
/// empty token or non-ASCII bytes counts as no token.
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use userhub_shared::auth::middleware::bearer_token;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
/// assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
/// ```
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verifies the bearer token on a request and loads its account
///
/// # Errors
///
/// See the module documentation for the order in which failures are reported.
pub async fn authenticate(
    pool: &PgPool,
    headers: &HeaderMap,
    secret: Option<&str>,
) -> Result<User, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
    let secret = require_secret(secret)?;
    let claims = validate_token(token, secret)?;

    match User::find_by_id(pool, claims.sub).await? {
        Some(user) if user.is_active => Ok(user),
        Some(_) => {
            debug!(user_id = claims.sub, "Token presented for deactivated account");
            Err(AuthError::UserNotFound)
        }
        None => {
            debug!(user_id = claims.sub, "Token presented for unknown account");
            Err(AuthError::UserNotFound)
        }
    }
}
