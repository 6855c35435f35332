//! Conversation service: two-party conversations and per-user summaries.

use std::sync::Arc;

use courier_database::{Conversation, ConversationStore, MessageStore, UserDirectory};
use tracing::{debug, info};

use crate::types::{ChatError, ChatResult, ConversationSummary};
use crate::utils::Validator;

pub struct ConversationService {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    users: Arc<dyn UserDirectory>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            conversations,
            messages,
            users,
        }
    }

    async fn require_user(&self, user_id: i64) -> ChatResult<()> {
        match self.users.find_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ChatError::not_found("user", user_id)),
        }
    }

    /// Open a conversation between two users, reusing an existing one for the same pair.
    pub async fn create_conversation(
        &self,
        first_user_id: i64,
        second_user_id: i64,
    ) -> ChatResult<Conversation> {
        Validator::distinct_participants(first_user_id, second_user_id)?;
        self.require_user(first_user_id).await?;
        self.require_user(second_user_id).await?;

        if let Some(existing) = self
            .conversations
            .find_by_participants(first_user_id, second_user_id)
            .await?
        {
            return Ok(existing);
        }

        match self
            .conversations
            .insert_conversation(first_user_id, second_user_id)
            .await
        {
            Ok(conversation) => {
                info!(conversation_id = conversation.id, "conversation opened");
                Ok(conversation)
            }
            // A concurrent request may have opened the same pair first.
            Err(error) => match self
                .conversations
                .find_by_participants(first_user_id, second_user_id)
                .await?
            {
                Some(existing) => {
                    debug!(conversation_id = existing.id, "conversation opened concurrently");
                    Ok(existing)
                }
                None => Err(error.into()),
            },
        }
    }

    pub async fn get_conversation(&self, conversation_id: i64) -> ChatResult<Conversation> {
        self.conversations
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| ChatError::not_found("conversation", conversation_id))
    }

    pub async fn list_for_user(&self, user_id: i64) -> ChatResult<Vec<Conversation>> {
        self.require_user(user_id).await?;
        Ok(self.conversations.list_for_user(user_id).await?)
    }

    /// Summaries for every conversation of `user_id`, most recently active first.
    pub async fn summaries_for_user(&self, user_id: i64) -> ChatResult<Vec<ConversationSummary>> {
        let conversations = self.list_for_user(user_id).await?;
        let mut ranked = Vec::with_capacity(conversations.len());

        for conversation in conversations {
            let other_user_id = conversation.other_participant(user_id);
            let other = self.users.find_user(other_user_id).await?;
            let last = self
                .messages
                .find_recent(conversation.id, 1)
                .await?
                .into_iter()
                .next();
            let unread_count = self
                .messages
                .count_unread_for_recipient(conversation.id, user_id)
                .await?;

            let activity = last
                .as_ref()
                .map(|message| message.sent_at)
                .unwrap_or(conversation.created_at);

            let summary = ConversationSummary {
                conversation_id: conversation.id,
                other_user_id,
                other_user_name: other.as_ref().map(|user| user.name.clone()),
                other_user_email: other.as_ref().map(|user| user.email.clone()),
                last_message: last.as_ref().map(|message| message.content.clone()),
                last_message_at: last.as_ref().map(|message| message.sent_at),
                unread_count,
            };
            ranked.push((activity, summary));
        }

        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(ranked.into_iter().map(|(_, summary)| summary).collect())
    }
}
