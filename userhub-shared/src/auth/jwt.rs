//! Bearer token generation and validation
//!
//! Tokens are HS256-signed JWTs carrying the account id (`sub`) and e-mail.
//! They are valid for a fixed window (7 days unless configured otherwise).
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256)
//! - **Validation**: signature, expiration, not-before and issuer
//! - **Secret Management**: secrets should be at least 32 bytes
//!
//! # Example
//!
//! ```
//! use userhub_shared::auth::jwt::{create_token, validate_token, Claims};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let claims = Claims::new(42, "user@example.com");
//! let token = create_token(&claims, "your-secret-key")?;
//!
//! let validated = validate_token(&token, "your-secret-key")?;
//! assert_eq!(validated.sub, 42);
//! assert_eq!(validated.email, "user@example.com");
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim written into and required from every token
pub const ISSUER: &str = "userhub";

/// Default validity window for issued tokens (7 days)
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// No signing secret is configured
    #[error("JWT secret not configured")]
    MissingSecret,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, format, issuer or claim shape is invalid
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (account id)
/// - `iss`: Issuer (always "userhub")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: Account e-mail at the time of issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: i32,

    /// Account e-mail (custom claim)
    pub email: String,

    /// Issuer - always "userhub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims with the default 7 day expiration
    ///
    /// ```
    /// use userhub_shared::auth::jwt::Claims;
    ///
    /// let claims = Claims::new(1, "user@example.com");
    /// assert!(!claims.is_expired());
    /// ```
    pub fn new(user_id: i32, email: impl Into<String>) -> Self {
        Self::with_expiration(user_id, email, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    /// Creates claims that expire `expires_in` from now
    ///
    /// A negative duration produces claims that are already expired, which is
    /// handy in tests.
    pub fn with_expiration(user_id: i32, email: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;
        // nbf must not lie after exp
        let not_before = now.min(expiration);

        Self {
            sub: user_id,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: not_before.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims into a token using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues a bearer token for an account
///
/// This is the entry point used by login and registration. The secret is
/// optional because the server may be started without one; in that case no
/// token can be issued.
///
/// # Errors
///
/// - `JwtError::MissingSecret` if `secret` is `None` or empty
/// - `JwtError::CreateError` if encoding fails
pub fn generate_token(
    user_id: i32,
    email: &str,
    secret: Option<&str>,
    expires_in: Duration,
) -> Result<String, JwtError> {
    let secret = require_secret(secret)?;
    let claims = Claims::with_expiration(user_id, email, expires_in);
    create_token(&claims, secret)
}

/// Returns the secret or `JwtError::MissingSecret` when it is absent or blank
pub fn require_secret(secret: Option<&str>) -> Result<&str, JwtError> {
    match secret {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(JwtError::MissingSecret),
    }
}

/// Validates a token and extracts its claims
///
/// Verifies signature, expiration, not-before and issuer. Expiration is
/// reported as `JwtError::Expired`; every other failure is `JwtError::Invalid`.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, "test@example.com");

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());

        let time_left = claims.time_until_expiration().unwrap();
        assert!(time_left.num_hours() >= DEFAULT_TOKEN_TTL_HOURS - 1);
        assert!(time_left.num_hours() <= DEFAULT_TOKEN_TTL_HOURS);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(1, "test@example.com");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 1);
        assert_eq!(validated.email, "test@example.com");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_generate_token_roundtrip() {
        let token = generate_token(12, "a@example.com", Some(SECRET), Duration::hours(1)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, 12);
        assert_eq!(claims.email, "a@example.com");
    }

    #[test]
    fn test_generate_token_without_secret() {
        let result = generate_token(1, "test@example.com", None, Duration::hours(1));
        assert!(matches!(result, Err(JwtError::MissingSecret)));

        let result = generate_token(1, "test@example.com", Some(""), Duration::hours(1));
        assert!(matches!(result, Err(JwtError::MissingSecret)));
        assert_eq!(JwtError::MissingSecret.to_string(), "JWT secret not configured");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, "test@example.com");
        let token = create_token(&claims, "secret1").expect("Should create token");

        let result = validate_token(&token, "wrong-secret");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired one hour ago
        let claims = Claims::with_expiration(1, "test@example.com", Duration::seconds(-3600));

        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage_token() {
        let result = validate_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(JwtError::Invalid(_))));

        let result = validate_token("", SECRET);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = Claims::new(1, "test@example.com");
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_require_secret() {
        assert_eq!(require_secret(Some("abc")).unwrap(), "abc");
        assert!(require_secret(None).is_err());
        assert!(require_secret(Some("")).is_err());
    }
}
