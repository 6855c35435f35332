//! Repository for user data access operations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use crate::entities::User;
use crate::stores::UserDirectory;
use crate::types::time::{format_timestamp, parse_timestamp};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> DatabaseResult<User> {
        let created_at: String = row.try_get("created_at")?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: parse_timestamp("created_at", &created_at)?,
        })
    }

    pub async fn create(&self, name: &str, email: &str) -> DatabaseResult<User> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO users (name, email, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(format_timestamp(&now))
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!(user_id = id, %email, "created new user");

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    /// Return the user with `email`, creating it when missing.
    pub async fn ensure(&self, name: &str, email: &str) -> DatabaseResult<User> {
        match self.find_by_email(email).await? {
            Some(user) => Ok(user),
            None => self.create(name, email).await,
        }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_user(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query("SELECT id, name, email, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
