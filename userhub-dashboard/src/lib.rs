//! # UserHub Dashboard
//!
//! Terminal client for the UserHub API.
//!
//! - `client`: typed HTTP client with token persistence
//! - `token`: token file storage
//! - `types`: request and response bodies
//! - `view`: tables, stats and local filtering
//! - `error`: client errors

pub mod client;
pub mod error;
pub mod token;
pub mod types;
pub mod view;

pub use client::UserHubClient;
pub use error::DashboardError;
