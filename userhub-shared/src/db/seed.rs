//! Demo accounts for local development
//!
//! Seeding only happens on an empty `users` table, so it is safe to run on
//! every start.

use sqlx::PgPool;
use tracing::info;

use crate::auth::password::{hash_password_async, PasswordError};
use crate::models::user::{CreateUser, User};

/// Password shared by every demo account
pub const DEMO_PASSWORD: &str = "password123";

/// First and last names of the demo accounts, oldest first
pub const DEMO_NAMES: [(&str, &str); 25] = [
    ("John", "Doe"),
    ("Jane", "Smith"),
    ("Michael", "Johnson"),
    ("Sarah", "Wilson"),
    ("David", "Brown"),
    ("Emily", "Davis"),
    ("James", "Miller"),
    ("Lisa", "Garcia"),
    ("Robert", "Martinez"),
    ("Jennifer", "Anderson"),
    ("William", "Taylor"),
    ("Amanda", "Thomas"),
    ("Christopher", "White"),
    ("Michelle", "Harris"),
    ("Daniel", "Clark"),
    ("Stephanie", "Lewis"),
    ("Matthew", "Walker"),
    ("Nicole", "Hall"),
    ("Anthony", "Allen"),
    ("Kimberly", "Young"),
    ("Joshua", "King"),
    ("Ashley", "Wright"),
    ("Andrew", "Lopez"),
    ("Megan", "Hill"),
    ("Kevin", "Green"),
];

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Demo e-mail for a name pair, e.g. `john.doe@example.com`
pub fn demo_email(first_name: &str, last_name: &str) -> String {
    format!(
        "{}.{}@example.com",
        first_name.to_lowercase(),
        last_name.to_lowercase()
    )
}

/// Inserts the demo accounts if the table is empty
///
/// Returns the number of accounts inserted (0 when seeding was skipped).
/// All inserts happen in one transaction.
pub async fn seed_demo_users(pool: &PgPool) -> Result<usize, SeedError> {
    let existing = User::count(pool).await?;
    if existing > 0 {
        info!(existing, "Users table is not empty, skipping seed");
        return Ok(0);
    }

    let password_hash = hash_password_async(DEMO_PASSWORD.to_string()).await?;

    let users = demo_users(&password_hash);
    let count = users.len();

    let mut tx = pool.begin().await?;
    for user in users {
        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.is_active)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(count, "Seeded demo users");
    Ok(count)
}

/// Builds the demo account inputs without touching the database
pub fn demo_users(password_hash: &str) -> Vec<CreateUser> {
    DEMO_NAMES
        .iter()
        .map(|(first_name, last_name)| CreateUser {
            email: demo_email(first_name, last_name),
            password_hash: password_hash.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_active: true,
        })
        .collect()
}
