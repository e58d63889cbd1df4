// src/db.rs

use std::time::Duration;

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    config::Config,
    error::AppError,
    models::user::Role,
    repository::users::{self, NewUser},
    utils::hash::hash_password,
};

const CONNECT_RETRIES: u32 = 5;

/// Opens the pool, retrying while the database is not reachable yet.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options: SqliteConnectOptions = database_url.parse()?;
    let options = options.create_if_missing(true).foreign_keys(true);

    let mut retry_count = 0;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count > CONNECT_RETRIES {
                    return Err(e);
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

/// Starts a transaction that holds the write lock from its first statement.
///
/// Use it when a transaction reads before it writes. A deferred one fails
/// with SQLITE_BUSY if another connection writes between the two.
pub async fn begin_immediate(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Creates the configured admin account unless the username or email is taken.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(email), Some(password)) = (
        &config.admin_username,
        &config.admin_email,
        &config.admin_password,
    ) else {
        return Ok(());
    };

    if users::find_by_username(pool, username).await?.is_some()
        || users::find_by_email(pool, email).await?.is_some()
    {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", username);
    let hashed_password = hash_password(password)?;
    let admin = NewUser {
        username: username.as_str(),
        email: email.as_str(),
        password: Some(hashed_password.as_str()),
        ..Default::default()
    };
    users::create(pool, &admin, Role::Admin).await?;
    tracing::info!("Admin user created successfully.");
    Ok(())
}
