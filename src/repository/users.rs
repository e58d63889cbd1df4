use chrono::Utc;
use sqlx::SqliteExecutor;

use crate::models::user::{Role, User};

const USER_COLUMNS: &str =
    "id, username, email, password, google_id, github_id, role, created_at";

/// Fields for inserting a user; `password` is already hashed.
#[derive(Debug, Default)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: Option<&'a str>,
    pub google_id: Option<&'a str>,
    pub github_id: Option<&'a str>,
}

/// Which OAuth provider column to match or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderColumn {
    Google,
    GitHub,
}

impl ProviderColumn {
    fn column(self) -> &'static str {
        match self {
            ProviderColumn::Google => "google_id",
            ProviderColumn::GitHub => "github_id",
        }
    }
}

pub async fn create<'e>(
    db: impl SqliteExecutor<'e>,
    user: &NewUser<'_>,
    role: Role,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password, google_id, github_id, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.password)
    .bind(user.google_id)
    .bind(user.github_id)
    .bind(role.as_str())
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn find_by_id<'e>(db: impl SqliteExecutor<'e>, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_username<'e>(
    db: impl SqliteExecutor<'e>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn find_by_provider_id<'e>(
    db: impl SqliteExecutor<'e>,
    provider: ProviderColumn,
    provider_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {} = ?",
        provider.column()
    ))
    .bind(provider_id)
    .fetch_optional(db)
    .await
}

/// Attaches a provider id to an existing account that has none yet.
pub async fn link_provider<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    provider: ProviderColumn,
    provider_id: &str,
) -> Result<bool, sqlx::Error> {
    let column = provider.column();
    let result = sqlx::query(&format!(
        "UPDATE users SET {column} = ? WHERE id = ? AND {column} IS NULL"
    ))
    .bind(provider_id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Every account except admins, newest first.
pub async fn list_non_admins<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role != 'admin' ORDER BY id DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn set_role<'e>(
    db: impl SqliteExecutor<'e>,
    user_id: i64,
    role: Role,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
