//! Shared request, response and error types.

pub mod errors;
pub mod requests;
pub mod responses;

pub use errors::{ChatError, ChatResult};
pub use requests::{
    CreateConversationRequest, MarkReadRequest, SendMessageRequest, TypingNotification,
};
pub use responses::{
    ConversationResponse, ConversationSummary, DeliveryPayload, MessageListEntry,
    MessageResponse, SenderSummary,
};
