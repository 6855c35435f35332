//! Repository for message data access operations.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

use crate::entities::{Message, NewMessage, Sender};
use crate::stores::MessageStore;
use crate::types::time::{format_timestamp, parse_timestamp};
use crate::types::DatabaseResult;

const SELECT_MESSAGE: &str = "SELECT m.id, m.conversation_id, m.sender_id, m.content, m.is_read, m.sent_at,
        u.id AS sender_user_id, u.name AS sender_name, u.email AS sender_email
     FROM messages m
     LEFT JOIN users u ON u.id = m.sender_id";

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> DatabaseResult<Message> {
        let sent_at: String = row.try_get("sent_at")?;
        let sender_user_id: Option<i64> = row.try_get("sender_user_id")?;

        let sender = match sender_user_id {
            Some(id) => Some(Sender {
                id,
                name: row.try_get("sender_name")?,
                email: row.try_get("sender_email")?,
            }),
            None => None,
        };

        Ok(Message {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            sender_id: row.try_get("sender_id")?,
            content: row.try_get("content")?,
            read: row.try_get("is_read")?,
            sent_at: parse_timestamp("sent_at", &sent_at)?,
            sender,
        })
    }

    fn map_rows(rows: Vec<SqliteRow>) -> DatabaseResult<Vec<Message>> {
        rows.iter().map(Self::map_row).collect()
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn insert(&self, message: NewMessage) -> DatabaseResult<Message> {
        let sent_at = format_timestamp(&message.sent_at);

        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, content, is_read, sent_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(&sent_at)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id,
            conversation_id = message.conversation_id,
            sender_id = message.sender_id,
            "created new message"
        );

        let row = sqlx::query(&format!("{SELECT_MESSAGE} WHERE m.id = ?"))
            .bind(message_id)
            .fetch_one(&self.pool)
            .await?;

        Self::map_row(&row)
    }

    async fn find_recent(&self, conversation_id: i64, limit: u32) -> DatabaseResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "{SELECT_MESSAGE} WHERE m.conversation_id = ?
             ORDER BY m.sent_at DESC, m.id DESC LIMIT ?"
        ))
        .bind(conversation_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn find_page(
        &self,
        conversation_id: i64,
        page: u32,
        page_size: u32,
    ) -> DatabaseResult<Vec<Message>> {
        let offset = i64::from(page) * i64::from(page_size);

        let rows = sqlx::query(&format!(
            "{SELECT_MESSAGE} WHERE m.conversation_id = ?
             ORDER BY m.sent_at DESC, m.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(conversation_id)
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!(conversation_id, page, page_size, count = rows.len(), "loaded message page");
        Self::map_rows(rows)
    }

    async fn find_unread_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "{SELECT_MESSAGE} WHERE m.conversation_id = ? AND m.sender_id != ? AND m.is_read = 0
             ORDER BY m.sent_at ASC, m.id ASC"
        ))
        .bind(conversation_id)
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        Self::map_rows(rows)
    }

    async fn count_unread_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages
             WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(conversation_id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn mark_read_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1
             WHERE conversation_id = ? AND sender_id != ? AND is_read = 0",
        )
        .bind(conversation_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected();
        info!(conversation_id, recipient_id, updated, "marked messages as read");
        Ok(updated)
    }
}
