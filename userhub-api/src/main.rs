//! # UserHub API Server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/userhub JWT_SECRET=... cargo run -p userhub-api
//! cargo run -p userhub-api -- --seed
//! ```
//!
//! `LOG_FORMAT=json` switches log output to JSON lines.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userhub_api::{
    app::{build_router, AppState},
    config::Config,
    server,
};
use userhub_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
    seed::seed_demo_users,
};

/// UserHub API server
#[derive(Debug, Parser)]
#[command(name = "userhub-api", version, about)]
struct Args {
    /// Insert demo accounts if the users table is empty
    #[arg(long)]
    seed: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "userhub_api=debug,userhub_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.api.environment,
        "UserHub API server starting"
    );

    if config.jwt.secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; login, registration and protected routes will fail");
    }

    let pool = create_pool(config.pool_config())
        .await
        .context("Failed to connect to the database")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    if args.seed || config.seed_users {
        let inserted = seed_demo_users(&pool)
            .await
            .context("Failed to seed demo users")?;
        tracing::info!(inserted, "Seeding finished");
    }

    let address = config.bind_address();
    let shutdown_timeout = config.shutdown_timeout();
    let app = build_router(AppState::new(pool.clone(), config));

    // A timed-out drain still holds connections, so the pool is only closed
    // after a clean stop
    server::run(app, &address, shutdown_timeout).await?;

    close_pool(pool).await;
    Ok(())
}
