//! Typed HTTP client for the UserHub API
//!
//! The client keeps the bearer token in a [`TokenStore`] so that it survives
//! between CLI invocations. Any 401 answer clears the stored token, since it is
//! either expired or belongs to an account that can no longer log in.
//!
//! # Example
//!
//! ```no_run
//! use userhub_dashboard::{client::UserHubClient, token::TokenStore, types::UserQuery};
//!
//! # async fn example() -> Result<(), userhub_dashboard::error::DashboardError> {
//! let mut client = UserHubClient::new("http://localhost:4001", TokenStore::default())?;
//! client.login("john.doe@example.com", "password123").await?;
//!
//! let page = client.list_users(&UserQuery::default()).await?;
//! println!("{} users", page.pagination.total_items);
//! # Ok(())
//! # }
//! ```

use crate::{
    error::DashboardError,
    token::TokenStore,
    types::{
        AuthResponse, Health, MessageEnvelope, NewAccount, PasswordChange, ProfileChanges, User,
        UserChanges, UserEnvelope, UserMessage, UserPage, UserQuery,
    },
};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};

pub struct UserHubClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
    token: Option<String>,
}

impl UserHubClient {
    /// Creates a client for the server at `base_url`, loading any saved token
    pub fn new(base_url: &str, tokens: TokenStore) -> Result<Self, DashboardError> {
        let token = tokens.load()?;
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            token,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, DashboardError> {
        let token = self.token.as_deref().ok_or(DashboardError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    fn store_token(&mut self, token: String) -> Result<(), DashboardError> {
        self.tokens.save(&token)?;
        self.token = Some(token);
        Ok(())
    }

    fn forget_token(&mut self) -> Result<(), DashboardError> {
        self.token = None;
        self.tokens.clear()
    }

    async fn send<T: DeserializeOwned>(
        &mut self,
        builder: RequestBuilder,
    ) -> Result<T, DashboardError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = DashboardError::from_response(status, &body);

        if error.is_unauthorized() && self.token.is_some() {
            tracing::debug!("Server rejected the stored token, clearing it");
            self.forget_token()?;
        }

        Err(error)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &mut self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T, DashboardError> {
        self.send(builder.json(body)).await
    }

    /// Logs in and stores the issued token
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, DashboardError> {
        let builder = self.request(Method::POST, "/auth/login");
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthResponse = self.send_json(builder, &body).await?;

        self.store_token(auth.token)?;
        Ok(auth.user)
    }

    /// Registers an account and stores the issued token
    pub async fn register(&mut self, account: &NewAccount) -> Result<User, DashboardError> {
        let builder = self.request(Method::POST, "/auth/register");
        let auth: AuthResponse = self.send_json(builder, account).await?;

        self.store_token(auth.token)?;
        Ok(auth.user)
    }

    /// Tells the server and drops the local token
    ///
    /// The token is dropped even if the server call fails.
    pub async fn logout(&mut self) -> Result<String, DashboardError> {
        let result = match self.authorized(Method::POST, "/auth/logout") {
            Ok(builder) => self
                .send::<MessageEnvelope>(builder)
                .await
                .map(|body| body.message),
            Err(e) => Err(e),
        };
        self.forget_token()?;
        result
    }

    pub async fn me(&mut self) -> Result<User, DashboardError> {
        let builder = self.authorized(Method::GET, "/auth/me")?;
        let body: UserEnvelope = self.send(builder).await?;
        Ok(body.user)
    }

    pub async fn health(&mut self) -> Result<Health, DashboardError> {
        let builder = self.request(Method::GET, "/health");
        self.send(builder).await
    }

    pub async fn list_users(&mut self, query: &UserQuery) -> Result<UserPage, DashboardError> {
        let builder = self.authorized(Method::GET, "/users")?.query(&query.to_pairs());
        self.send(builder).await
    }

    pub async fn get_user(&mut self, id: i32) -> Result<User, DashboardError> {
        let builder = self.authorized(Method::GET, &format!("/users/{}", id))?;
        let body: UserEnvelope = self.send(builder).await?;
        Ok(body.user)
    }

    pub async fn create_user(&mut self, account: &NewAccount) -> Result<User, DashboardError> {
        let builder = self.authorized(Method::POST, "/users")?;
        let body: UserMessage = self.send_json(builder, account).await?;
        tracing::debug!(message = %body.message, "User created");
        Ok(body.user)
    }

    pub async fn update_user(
        &mut self,
        id: i32,
        changes: &UserChanges,
    ) -> Result<User, DashboardError> {
        let builder = self.authorized(Method::PUT, &format!("/users/{}", id))?;
        let body: UserMessage = self.send_json(builder, changes).await?;
        Ok(body.user)
    }

    pub async fn update_profile(
        &mut self,
        changes: &ProfileChanges,
    ) -> Result<User, DashboardError> {
        let builder = self.authorized(Method::PUT, "/users/profile")?;
        let body: UserMessage = self.send_json(builder, changes).await?;
        Ok(body.user)
    }

    pub async fn change_password(
        &mut self,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, DashboardError> {
        let builder = self.authorized(Method::PUT, "/users/password")?;
        let change = PasswordChange {
            current_password,
            new_password,
        };
        let body: MessageEnvelope = self.send_json(builder, &change).await?;
        Ok(body.message)
    }

    pub async fn delete_user(&mut self, id: i32) -> Result<String, DashboardError> {
        let builder = self.authorized(Method::DELETE, &format!("/users/{}", id))?;
        let body: MessageEnvelope = self.send(builder).await?;
        Ok(body.message)
    }

    /// Deactivates the caller's account and drops the now useless token
    pub async fn deactivate_account(&mut self) -> Result<String, DashboardError> {
        let builder = self.authorized(Method::DELETE, "/users/account")?;
        let body: MessageEnvelope = self.send(builder).await?;
        self.forget_token()?;
        Ok(body.message)
    }
}
