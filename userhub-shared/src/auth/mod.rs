//! Authentication utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and verification
//! - [`jwt`]: Bearer token issuance and validation
//! - [`middleware`]: Resolving the account behind an `Authorization` header
//!
//! # Example
//!
//! ```
//! use userhub_shared::auth::password::{hash_password, verify_password};
//! use userhub_shared::auth::jwt::{generate_token, validate_token, DEFAULT_TOKEN_TTL_HOURS};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let secret = "an-example-secret-that-is-32-bytes!";
//! let ttl = chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS);
//! let token = generate_token(7, "user@example.com", Some(secret), ttl)?;
//! assert_eq!(validate_token(&token, secret)?.sub, 7);
//! # Ok(())
//! # }
//! ```

pub mod jwt;
pub mod middleware;
pub mod password;
