//! Response and delivery payload types.

use chrono::{DateTime, Utc};
use courier_database::{Conversation, Message, Sender};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SenderSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Sender> for SenderSummary {
    fn from(sender: &Sender) -> Self {
        Self {
            id: sender.id,
            name: sender.name.clone(),
            email: sender.email.clone(),
        }
    }
}

/// What subscribers of a conversation topic receive for each new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub id: i64,
    pub content: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
    pub sender: SenderSummary,
}

/// A created message as returned by `POST /api/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
    pub sender: Option<SenderSummary>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            read: message.read,
            sent_at: message.sent_at,
            sender: message.sender.as_ref().map(SenderSummary::from),
        }
    }
}

/// Flattened history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListEntry {
    pub id: i64,
    pub content: String,
    pub read: bool,
    pub sent_at: DateTime<Utc>,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
}

impl From<&Message> for MessageListEntry {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            read: message.read,
            sent_at: message.sent_at,
            sender_id: message.sender_id,
            sender_name: message.sender.as_ref().map(|sender| sender.name.clone()),
            sender_email: message.sender.as_ref().map(|sender| sender.email.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: i64,
    pub first_user_id: i64,
    pub second_user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            first_user_id: conversation.user_one_id,
            second_user_id: conversation.user_two_id,
            created_at: conversation.created_at,
        }
    }
}

/// A conversation as seen by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: i64,
    pub other_user_id: i64,
    pub other_user_name: Option<String>,
    pub other_user_email: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: u64,
}
