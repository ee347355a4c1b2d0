//! Application state and router builder
//!
//! # Example
//!
//! ```no_run
//! use userhub_api::{app::AppState, config::Config};
//! use userhub_shared::db::pool::create_pool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = create_pool(config.pool_config()).await?;
//! let state = AppState::new(pool, config);
//! let app = userhub_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{
        auth::require_auth, error_detail::expose_error_details, security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use userhub_shared::{
    auth::jwt::{generate_token, JwtError},
    models::user::User,
};

/// Shared application state
///
/// Cloned into every handler via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Token signing secret, if configured
    pub fn jwt_secret(&self) -> Option<&str> {
        self.config.jwt.secret.as_deref()
    }

    /// Issues a bearer token for `user`
    pub fn issue_token(&self, user: &User) -> Result<String, JwtError> {
        generate_token(user.id, &user.email, self.jwt_secret(), self.config.token_ttl())
    }
}

/// Builds the complete router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /api
/// ├── GET    /health
/// ├── /auth
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── GET  /me          (token)
/// │   └── POST /logout      (token)
/// └── /users                (token)
///     ├── GET    /
///     ├── POST   /
///     ├── PUT    /profile
///     ├── PUT    /password
///     ├── DELETE /account
///     ├── GET    /:id
///     ├── PUT    /:id
///     └── DELETE /:id
/// ```
///
/// Static segments under `/users` win over `/:id`.
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, error detail
/// exposure, then the token check on protected routes only.
pub fn build_router(state: AppState) -> Router {
    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/logout", post(routes::auth::logout))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/profile", put(routes::users::update_profile))
        .route("/password", put(routes::users::change_password))
        .route("/account", axum::routing::delete(routes::users::deactivate_account))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/users", user_routes);

    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            expose_error_details,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.is_production()))
        .with_state(state)
}

/// Builds the CORS layer from the configured origins
///
/// `*` allows any origin without credentials; explicit origins are allowed
/// with credentials.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
