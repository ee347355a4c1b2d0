//! Middleware for the API server
//!
//! - `auth`: bearer-token check for protected routes
//! - `error_detail`: server error causes in development responses
//! - `security`: hardening response headers

pub mod auth;
pub mod error_detail;
pub mod security;
