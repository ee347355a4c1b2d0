//! Database models
//!
//! - `user`: User accounts, the only table the service owns

pub mod user;
