//! Health check endpoint
//!
//! # Endpoint
//!
//! ```text
//! GET /api/health
//! ```
//!
//! # Response
//!
//! Always `200 OK`; database trouble is reported in the body.
//!
//! ```json
//! {
//!   "status": "OK",
//!   "message": "Server is running",
//!   "timestamp": "2025-09-13T10:00:00.000Z",
//!   "version": "0.1.0",
//!   "database": "connected"
//! }
//! ```

use crate::app::AppState;
use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use userhub_shared::db::pool::health_check as ping_database;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "OK" while the process serves requests
    pub status: String,

    pub message: String,

    /// RFC 3339 timestamp with milliseconds
    pub timestamp: String,

    /// Application version
    pub version: String,

    /// "connected" or "disconnected"
    pub database: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match ping_database(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
