//! Request and response bodies of the UserHub API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Account status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }

    pub fn matches(self, user: &User) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => user.is_active,
            StatusFilter::Inactive => !user.is_active,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing parameters for `GET /api/users`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl UserQuery {
    /// Query string pairs, skipping unset and blank values
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of users
#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub count: usize,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageEnvelope {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserMessage {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
    pub database: String,
}

/// Fields for registration and account creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update of any account; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Update of the caller's own profile
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_from_api_json() {
        let user: User = serde_json::from_value(json!({
            "id": 4,
            "email": "ada.lovelace@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "isActive": true,
            "createdAt": "2025-09-13T10:00:00.000Z",
            "updatedAt": "2025-09-13T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(user.full_name(), "Ada Lovelace");
        assert!(user.is_active);
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let query = UserQuery {
            search: Some("  ".to_string()),
            status: Some(StatusFilter::Inactive),
            page: Some(2),
            limit: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![("status", "inactive".to_string()), ("page", "2".to_string())]
        );
        assert!(UserQuery::default().to_pairs().is_empty());
    }

    #[test]
    fn test_changes_omit_unset_fields() {
        let body = serde_json::to_value(UserChanges {
            is_active: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"isActive": false}));
    }
}
