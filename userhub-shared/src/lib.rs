//! # UserHub Shared Library
//!
//! Types and business logic shared by the UserHub API server.
//!
//! ## Module Organization
//!
//! - `models`: The `users` table and its queries
//! - `auth`: Password hashing, token issuance/verification, request authentication
//! - `db`: Connection pool, migrations and demo-data seeding

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the UserHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
