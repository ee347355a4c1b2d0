//! User administration and self-service endpoints
//!
//! Every route here sits behind the bearer-token check.
//!
//! # Endpoints
//!
//! - `GET /api/users` - Paged listing with search and status filter
//! - `POST /api/users` - Create an account
//! - `PUT /api/users/profile` - Update own names and e-mail
//! - `PUT /api/users/password` - Change own password
//! - `DELETE /api/users/account` - Deactivate own account
//! - `GET /api/users/:id` - Fetch one account
//! - `PUT /api/users/:id` - Partial update
//! - `DELETE /api/users/:id` - Hard delete another account

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult, ValidationErrorDetail},
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::auth::CurrentUser,
    routes::{non_blank, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use userhub_shared::{
    auth::password::{
        hash_password_async, validate_password_length, verify_password_async, MIN_PASSWORD_LENGTH,
    },
    models::user::{CreateUser, StatusFilter, UpdateUser, User, UserFilter},
};
use validator::Validate;

/// Page size when `limit` is absent
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest accepted `limit`
pub const MAX_PAGE_SIZE: i64 = 100;

const EMAIL_IN_USE: &str = "Email already in use";
const USER_NOT_FOUND: &str = "User not found";

/// Account fields shared by registration and `POST /users`
///
/// Fields are optional at the JSON level so a missing field reports
/// `All fields are required` rather than a deserialization error.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAccountRequest {
    #[validate(
        email(message = "Email must be a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters long")
    )]
    pub email: Option<String>,

    pub password: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "First name must be between 1 and 50 characters"
    ))]
    pub first_name: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name must be between 1 and 50 characters"
    ))]
    pub last_name: Option<String>,
}

impl NewAccountRequest {
    /// Checks the request and hashes the password
    ///
    /// Order: required fields, e-mail conflict (reported with
    /// `conflict_message`), field validation.
    pub(crate) async fn into_new_user(
        self,
        state: &AppState,
        conflict_message: &str,
    ) -> ApiResult<CreateUser> {
        let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
            non_blank(self.email),
            non_blank(self.password),
            non_blank(self.first_name),
            non_blank(self.last_name),
        ) else {
            return Err(ApiError::BadRequest("All fields are required".to_string()));
        };

        let email = email.trim().to_string();
        let first_name = first_name.trim().to_string();
        let last_name = last_name.trim().to_string();

        if User::find_by_email(&state.db, &email).await?.is_some() {
            return Err(ApiError::Conflict(conflict_message.to_string()));
        }

        let checked = NewAccountRequest {
            email: Some(email.clone()),
            password: None,
            first_name: Some(first_name.clone()),
            last_name: Some(last_name.clone()),
        };
        let mut details = checked
            .validate()
            .err()
            .map(|errors| validation_details(&errors))
            .unwrap_or_default();
        if let Err(message) = validate_password_length(&password) {
            details.push(ValidationErrorDetail {
                field: "password".to_string(),
                message,
            });
        }
        if !details.is_empty() {
            details.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(ApiError::Validation(details));
        }

        let password_hash = hash_password_async(password).await?;

        Ok(CreateUser {
            email,
            password_hash,
            first_name,
            last_name,
            is_active: true,
        })
    }
}

/// Body of `PUT /users/:id`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(
        email(message = "Email must be a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters long")
    )]
    pub email: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "First name must be between 1 and 50 characters"
    ))]
    pub first_name: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name must be between 1 and 50 characters"
    ))]
    pub last_name: Option<String>,

    pub is_active: Option<bool>,
}

/// Body of `PUT /users/profile`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(
        email(message = "Email must be a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters long")
    )]
    pub email: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "First name must be between 1 and 50 characters"
    ))]
    pub first_name: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Last name must be between 1 and 50 characters"
    ))]
    pub last_name: Option<String>,
}

impl ProfileRequest {
    /// Drops blank values and trims the rest
    fn without_blanks(self) -> Self {
        let clean = |value: Option<String>| non_blank(value).map(|v| v.trim().to_string());
        Self {
            email: clean(self.email),
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
        }
    }
}

/// Body of `PUT /users/password`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Query string of `GET /users`
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListUsersQuery {
    /// Page number, at least 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    fn filter(&self) -> UserFilter {
        let limit = self.limit();
        UserFilter {
            search: self.search.clone(),
            status: self.status.unwrap_or_default(),
            limit,
            offset: (self.page() - 1).saturating_mul(limit),
        }
    }
}

/// Paging metadata for listings
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

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };

        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// Response of `GET /users`
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,

    /// Number of users on this page
    pub count: usize,

    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

impl UserResponse {
    fn new(message: &str, user: User) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            user,
        })
    }
}

/// Fails with 409 if `email` belongs to an account other than `id`
async fn ensure_email_free(state: &AppState, email: Option<&str>, id: i32) -> ApiResult<()> {
    if let Some(email) = email {
        if User::email_taken_by_other(&state.db, email, id).await? {
            return Err(ApiError::Conflict(EMAIL_IN_USE.to_string()));
        }
    }
    Ok(())
}

/// List accounts, newest first
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let filter = query.filter();

    let users = User::list(&state.db, &filter).await?;
    let total = User::count_matching(&state.db, &filter).await?;

    Ok(Json(ListUsersResponse {
        count: users.len(),
        pagination: Pagination::new(query.page(), filter.limit, total),
        users,
    }))
}

/// Fetch one account
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<UserBody>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(UserBody { user }))
}

/// Create an active account on someone else's behalf
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiJson(req): ApiJson<NewAccountRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let new_user = req.into_new_user(&state, EMAIL_IN_USE).await?;
    let user = User::create(&state.db, new_user).await?;

    tracing::info!(user_id = user.id, actor_id = actor.id, "User created");

    Ok((
        StatusCode::CREATED,
        UserResponse::new("User created successfully", user),
    ))
}

/// Partial update of any account
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let existing = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    let email_change = req.email.as_deref().filter(|email| *email != existing.email);
    ensure_email_free(&state, email_change, id).await?;

    req.validate()?;

    let changes = UpdateUser {
        email: req.email,
        password_hash: None,
        first_name: req.first_name,
        last_name: req.last_name,
        is_active: req.is_active,
    };

    let user = User::update(&state.db, id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = user.id, actor_id = actor.id, "User updated");

    Ok(UserResponse::new("User updated successfully", user))
}

/// Update the caller's own names and e-mail
///
/// Blank values leave the field unchanged.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let req = req.without_blanks();

    let email_change = req.email.as_deref().filter(|email| *email != current.email);
    ensure_email_free(&state, email_change, current.id).await?;

    req.validate()?;

    let changes = UpdateUser {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
        ..UpdateUser::default()
    };

    let user = if changes.is_empty() {
        current
    } else {
        User::update(&state.db, current.id, changes)
            .await?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?
    };

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(UserResponse::new("Profile updated successfully", user))
}

/// Change the caller's password after re-checking the current one
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (Some(current_password), Some(new_password)) = (
        req.current_password.filter(|p| !p.is_empty()),
        req.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    };

    if !verify_password_async(current_password, current.password_hash.clone()).await? {
        tracing::info!(user_id = current.id, "Password change refused");
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "New password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    validate_password_length(&new_password).map_err(ApiError::BadRequest)?;

    let password_hash = hash_password_async(new_password).await?;
    let changes = UpdateUser {
        password_hash: Some(password_hash),
        ..UpdateUser::default()
    };
    User::update(&state.db, current.id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = current.id, "Password changed");

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Hard delete another account
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    if id == current.id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = id, actor_id = current.id, "User deleted");

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Deactivate the caller's own account
///
/// Existing tokens stop working on the next request.
pub async fn deactivate_account(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    if !User::set_active(&state.db, current.id, false).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = current.id, "Account deactivated");

    Ok(Json(MessageResponse::new("Account deactivated successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_middle_page() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(p.has_previous_page);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next_page);
        assert!(p.has_previous_page);
    }

    #[test]
    fn test_pagination_exact_fit() {
        assert_eq!(Pagination::new(1, 5, 25).total_pages, 5);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_previous_page);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let value = serde_json::to_value(Pagination::new(1, 10, 11)).unwrap();
        assert_eq!(value["currentPage"], 1);
        assert_eq!(value["totalPages"], 2);
        assert_eq!(value["itemsPerPage"], 10);
        assert_eq!(value["hasNextPage"], true);
        assert_eq!(value["hasPreviousPage"], false);
    }

    #[test]
    fn test_query_defaults() {
        let query = ListUsersQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);

        let filter = query.filter();
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.status, StatusFilter::All);
    }

    #[test]
    fn test_query_clamps() {
        let query = ListUsersQuery {
            page: Some(0),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let query = ListUsersQuery {
            page: Some(3),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(query.limit(), 1);
        assert_eq!(query.filter().offset, 2);
    }

    #[test]
    fn test_query_parses_status() {
        let query: ListUsersQuery =
            serde_json::from_str(r#"{"status":"inactive","page":2}"#).unwrap();
        assert_eq!(query.status, Some(StatusFilter::Inactive));
        assert_eq!(query.filter().offset, 10);
    }

    #[test]
    fn test_profile_request_drops_blanks() {
        let req = ProfileRequest {
            email: Some("  ".to_string()),
            first_name: Some(" Ada ".to_string()),
            last_name: None,
        }
        .without_blanks();

        assert!(req.email.is_none());
        assert_eq!(req.first_name.as_deref(), Some("Ada"));
        assert!(req.validate().is_ok());
    }

    fn long_valid_email() -> String {
        let label = "c".repeat(60);
        format!("{}@{}.{}.{}.{}.com", "b".repeat(60), label, label, label, label)
    }

    #[test]
    fn test_long_email_rejected_on_update_and_profile() {
        let email = long_valid_email();
        assert!(email.len() > 255);

        let update = UpdateUserRequest {
            email: Some(email.clone()),
            ..Default::default()
        };
        let details = validation_details(&update.validate().unwrap_err());
        assert_eq!(details[0].field, "email");
        assert_eq!(details[0].message, "Email must be at most 255 characters long");

        let profile = ProfileRequest {
            email: Some(email),
            ..Default::default()
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_update_request_validation_messages() {
        let req = UpdateUserRequest {
            email: Some("not-an-email".to_string()),
            last_name: Some("x".repeat(51)),
            ..Default::default()
        };

        let details = validation_details(&req.validate().unwrap_err());
        let messages: Vec<_> = details.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Email must be a valid email address",
                "Last name must be between 1 and 50 characters",
            ]
        );
    }
}
