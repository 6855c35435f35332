//! Storage ports consumed by the chat services.
//!
//! The SQLite repositories in [`crate::repos`] implement these traits; tests and
//! alternative backends can provide their own.

use async_trait::async_trait;

use crate::entities::{Conversation, Message, NewMessage, User};
use crate::types::DatabaseResult;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message and return it with its assigned id and joined sender.
    async fn insert(&self, message: NewMessage) -> DatabaseResult<Message>;

    /// Newest first, at most `limit` rows.
    async fn find_recent(&self, conversation_id: i64, limit: u32) -> DatabaseResult<Vec<Message>>;

    /// Newest first; `page` is zero based.
    async fn find_page(
        &self,
        conversation_id: i64,
        page: u32,
        page_size: u32,
    ) -> DatabaseResult<Vec<Message>>;

    /// Unread messages in the conversation not sent by `recipient_id`, oldest first.
    async fn find_unread_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<Vec<Message>>;

    async fn count_unread_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<u64>;

    /// Flip `read` for every unread message not sent by `recipient_id`.
    /// Returns the number of rows changed.
    async fn mark_read_for_recipient(
        &self,
        conversation_id: i64,
        recipient_id: i64,
    ) -> DatabaseResult<u64>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: i64) -> DatabaseResult<Option<User>>;
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find_conversation(&self, id: i64) -> DatabaseResult<Option<Conversation>>;

    /// Order of the two ids does not matter.
    async fn find_by_participants(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> DatabaseResult<Option<Conversation>>;

    async fn insert_conversation(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> DatabaseResult<Conversation>;

    async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Conversation>>;
}
