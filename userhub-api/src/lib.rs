//! # UserHub API Server Library
//!
//! REST backend for account administration: registration and login with
//! bearer tokens, plus authenticated user management.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with JSON rejections
//! - `middleware`: Token check, security headers, error detail exposure
//! - `routes`: API route handlers
//! - `server`: Listener and graceful shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod server;
