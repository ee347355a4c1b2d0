//! Dashboard client errors

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The server answered with a non-2xx status
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// No stored token for a route that needs one
    #[error("Not logged in, run `userhub login` first")]
    NotAuthenticated,
}

impl DashboardError {
    /// Builds an API error from a failed response body
    ///
    /// Uses the server's `{"error": ...}` message when present, otherwise the
    /// status text.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("error")?.as_str().map(str::to_string))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        DashboardError::Api { status, message }
    }

    /// True for 401 responses
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DashboardError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_server_message() {
        let err = DashboardError::from_response(
            StatusCode::CONFLICT,
            r#"{"error":"Email already in use"}"#,
        );
        assert_eq!(err.to_string(), "Email already in use (409 Conflict)");
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_falls_back_to_status_text() {
        let err = DashboardError::from_response(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            DashboardError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unauthorized() {
        let err = DashboardError::from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Token expired"}"#,
        );
        assert!(err.is_unauthorized());
    }
}
