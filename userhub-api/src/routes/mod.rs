//! API route handlers
//!
//! - `health`: liveness and database connectivity
//! - `auth`: registration, login, current user, logout
//! - `users`: account administration and self-service

pub mod auth;
pub mod health;
pub mod users;

use serde::Serialize;

/// Body for responses that only carry a message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Returns the value unless it is missing or only whitespace
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("a".to_string())), Some("a".to_string()));
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(None), None);
    }
}
