//! Message service: creation, history and read tracking.

use std::sync::Arc;

use chrono::Utc;
use courier_config::MessagesConfig;
use courier_database::{
    Conversation, ConversationStore, Message, MessageStore, NewMessage, User, UserDirectory,
};
use tracing::{debug, info};

use crate::types::{ChatError, ChatResult};
use crate::utils::Validator;

/// Size of the default history window.
pub const RECENT_HISTORY_LIMIT: u32 = 20;

pub struct MessageService {
    messages: Arc<dyn MessageStore>,
    conversations: Arc<dyn ConversationStore>,
    users: Arc<dyn UserDirectory>,
    limits: MessagesConfig,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        conversations: Arc<dyn ConversationStore>,
        users: Arc<dyn UserDirectory>,
        limits: MessagesConfig,
    ) -> Self {
        Self {
            messages,
            conversations,
            users,
            limits,
        }
    }

    pub fn limits(&self) -> &MessagesConfig {
        &self.limits
    }

    async fn require_conversation(&self, conversation_id: i64) -> ChatResult<Conversation> {
        self.conversations
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| ChatError::not_found("conversation", conversation_id))
    }

    async fn require_user(&self, user_id: i64) -> ChatResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| ChatError::not_found("user", user_id))
    }

    /// Persist a new unread message stamped with the current time.
    ///
    /// Content is stored verbatim. The sender is not required to be a
    /// participant of the conversation.
    pub async fn send_message(
        &self,
        conversation_id: i64,
        sender_id: i64,
        content: impl Into<String>,
    ) -> ChatResult<Message> {
        let content = content.into();
        Validator::message_content(&content, self.limits.max_content_length)?;

        self.require_conversation(conversation_id).await?;
        self.require_user(sender_id).await?;

        let message = self
            .messages
            .insert(NewMessage {
                conversation_id,
                sender_id,
                content,
                sent_at: Utc::now(),
            })
            .await?;

        info!(
            message_id = message.id,
            conversation_id,
            sender_id,
            "message sent"
        );
        Ok(message)
    }

    /// The newest messages of a conversation, most recent first.
    pub async fn list_recent_messages(&self, conversation_id: i64) -> ChatResult<Vec<Message>> {
        self.require_conversation(conversation_id).await?;
        let messages = self
            .messages
            .find_recent(conversation_id, RECENT_HISTORY_LIMIT)
            .await?;
        debug!(conversation_id, count = messages.len(), "loaded recent messages");
        Ok(messages)
    }

    /// One page of history, most recent first. `page` is zero based.
    pub async fn list_messages_paged(
        &self,
        conversation_id: i64,
        page: u32,
        page_size: u32,
    ) -> ChatResult<Vec<Message>> {
        Validator::page_size(page_size, self.limits.max_page_size)?;
        self.require_conversation(conversation_id).await?;

        Ok(self
            .messages
            .find_page(conversation_id, page, page_size)
            .await?)
    }

    /// Mark every message in the conversation not sent by `user_id` as read.
    /// Returns how many messages changed state.
    pub async fn mark_read(&self, conversation_id: i64, user_id: i64) -> ChatResult<u64> {
        self.require_conversation(conversation_id).await?;
        self.require_user(user_id).await?;

        let updated = self
            .messages
            .mark_read_for_recipient(conversation_id, user_id)
            .await?;

        info!(conversation_id, user_id, updated, "messages marked as read");
        Ok(updated)
    }

    /// Unread messages addressed to `user_id`, oldest first.
    pub async fn unread_messages(
        &self,
        conversation_id: i64,
        user_id: i64,
    ) -> ChatResult<Vec<Message>> {
        self.require_conversation(conversation_id).await?;
        Ok(self
            .messages
            .find_unread_for_recipient(conversation_id, user_id)
            .await?)
    }

    pub async fn unread_count(&self, conversation_id: i64, user_id: i64) -> ChatResult<u64> {
        Ok(self
            .messages
            .count_unread_for_recipient(conversation_id, user_id)
            .await?)
    }
}
