//! Database layer
//!
//! - `pool`: connection pool creation and health checks
//! - `migrations`: embedded schema migrations
//! - `seed`: demo accounts for local development

pub mod migrations;
pub mod pool;
pub mod seed;
