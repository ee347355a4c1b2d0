//! Configuration management for the API server
//!
//! Configuration is read from environment variables, after loading a `.env`
//! file if one is present.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 4001)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
//!   (default: the local dashboard origins on ports 3000-3003)
//! - `APP_ENV`: `development`, `production` or `test` (default: development)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `JWT_SECRET`: Token signing secret, at least 32 characters (optional)
//! - `JWT_EXPIRES_IN_HOURS`: Token validity window (default: 168)
//! - `SHUTDOWN_TIMEOUT_SECS`: Grace period before a forced exit (default: 30)
//! - `SEED_USERS`: Insert demo accounts into an empty table (default: false)
//!
//! # Example
//!
//! ```no_run
//! use userhub_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::{env, fmt, str::FromStr, time::Duration};
use userhub_shared::auth::jwt::DEFAULT_TOKEN_TTL_HOURS;

/// Shortest accepted `JWT_SECRET`
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Origins allowed when `CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:3003",
];

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Insert demo accounts on start when the table is empty
    pub seed_users: bool,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => anyhow::bail!(
                "APP_ENV must be development, production or test, got {:?}",
                other
            ),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
            Environment::Test => write!(f, "test"),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,

    /// Deployment environment
    pub environment: Environment,

    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret. Without one the server still starts, but token
    /// issuance and protected routes answer with a server error.
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: Option<String>,

    /// Token validity window in hours
    pub expires_in_hours: i64,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing, a numeric variable does
    /// not parse, `APP_ENV` is unknown or `JWT_SECRET` is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(var("API_PORT"), "API_PORT", 4001u16)?;

        let cors_origins = match var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let environment = match var("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let shutdown_timeout_secs =
            parse_or(var("SHUTDOWN_TIMEOUT_SECS"), "SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections =
            parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10u32)?;

        let secret = var("JWT_SECRET");
        if let Some(secret) = &secret {
            if secret.chars().count() < MIN_JWT_SECRET_LENGTH {
                anyhow::bail!(
                    "JWT_SECRET must be at least {} characters long",
                    MIN_JWT_SECRET_LENGTH
                );
            }
        }
        let expires_in_hours = parse_or(
            var("JWT_EXPIRES_IN_HOURS"),
            "JWT_EXPIRES_IN_HOURS",
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if expires_in_hours <= 0 {
            anyhow::bail!("JWT_EXPIRES_IN_HOURS must be positive");
        }

        let seed_users = match var("SEED_USERS") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow::anyhow!("SEED_USERS must be true or false"))?,
            None => false,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                environment,
                shutdown_timeout_secs,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            jwt: JwtConfig {
                secret,
                expires_in_hours,
            },
            seed_users,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when running with `APP_ENV=production`
    pub fn is_production(&self) -> bool {
        self.api.environment.is_production()
    }

    /// Grace period before a forced shutdown
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.api.shutdown_timeout_secs)
    }

    /// Token validity window
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt.expires_in_hours)
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> userhub_shared::db::pool::DatabaseConfig {
        userhub_shared::db::pool::DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..Default::default()
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/userhub")]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:4001");
        assert_eq!(config.api.cors_origins.len(), 4);
        assert_eq!(config.api.cors_origins[0], "http://localhost:3000");
        assert_eq!(config.api.environment, Environment::Development);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        assert_eq!(config.database.max_connections, 10);
        assert!(config.jwt.secret.is_none());
        assert_eq!(config.token_ttl(), chrono::Duration::days(7));
        assert!(!config.seed_users);
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/userhub"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "8080"),
            ("CORS_ORIGINS", "https://admin.example.com, https://ops.example.com"),
            ("APP_ENV", "production"),
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRES_IN_HOURS", "1"),
            ("SHUTDOWN_TIMEOUT_SECS", "5"),
            ("SEED_USERS", "true"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["https://admin.example.com", "https://ops.example.com"]
        );
        assert!(config.is_production());
        assert_eq!(config.jwt.secret.as_deref(), Some(SECRET));
        assert_eq!(config.token_ttl(), chrono::Duration::hours(1));
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert!(config.seed_users);
    }

    #[test]
    fn test_database_url_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/userhub"),
            ("JWT_SECRET", "too-short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_blank_secret_means_unset() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/userhub"),
            ("JWT_SECRET", "   "),
        ])
        .unwrap();
        assert!(config.jwt.secret.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("DATABASE_URL", "x"), ("API_PORT", "not-a-port")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("APP_ENV", "staging")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("SEED_USERS", "maybe")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("JWT_EXPIRES_IN_HOURS", "0")]).is_err());
    }

    #[test]
    fn test_secret_not_serialized() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/userhub"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(SECRET));
    }
}
