//! Repository for conversation data access operations.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

use crate::entities::Conversation;
use crate::stores::ConversationStore;
use crate::types::time::{format_timestamp, parse_timestamp};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

fn ordered_pair(first: i64, second: i64) -> (i64, i64) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> DatabaseResult<Conversation> {
        let created_at: String = row.try_get("created_at")?;
        Ok(Conversation {
            id: row.try_get("id")?,
            user_one_id: row.try_get("user_one_id")?,
            user_two_id: row.try_get("user_two_id")?,
            created_at: parse_timestamp("created_at", &created_at)?,
        })
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn find_conversation(&self, id: i64) -> DatabaseResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, user_one_id, user_two_id, created_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_by_participants(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> DatabaseResult<Option<Conversation>> {
        let (one, two) = ordered_pair(first_user_id, second_user_id);
        let row = sqlx::query(
            "SELECT id, user_one_id, user_two_id, created_at FROM conversations
             WHERE user_one_id = ? AND user_two_id = ?",
        )
        .bind(one)
        .bind(two)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert_conversation(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> DatabaseResult<Conversation> {
        let (one, two) = ordered_pair(first_user_id, second_user_id);
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO conversations (user_one_id, user_two_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(one)
        .bind(two)
        .bind(format_timestamp(&now))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(conversation_id = id, user_one_id = one, user_two_id = two, "created new conversation");

        Ok(Conversation {
            id,
            user_one_id: one,
            user_two_id: two,
            created_at: now,
        })
    }

    async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT id, user_one_id, user_two_id, created_at FROM conversations
             WHERE user_one_id = ? OR user_two_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }
}
