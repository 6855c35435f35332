//! # Courier Chats Crate
//!
//! Chat business logic: sending and listing messages, read tracking,
//! two-party conversations, and the mapping from stored messages to the
//! payloads delivered to subscribers.
//!
//! Services receive their storage ports as `Arc<dyn ...>` so the same logic
//! runs against SQLite in production and against fakes in tests.
//!
//! ```ignore
//! use std::sync::Arc;
//! use courier_chats::MessageService;
//! use courier_database::{ConversationRepository, MessageRepository, UserRepository};
//!
//! let service = MessageService::new(
//!     Arc::new(MessageRepository::new(pool.clone())),
//!     Arc::new(ConversationRepository::new(pool.clone())),
//!     Arc::new(UserRepository::new(pool)),
//!     config.messages.clone(),
//! );
//! let message = service.send_message(1, 10, "hola").await?;
//! ```

pub mod services;
pub mod types;
pub mod utils;

pub use services::{ConversationService, MessageService, TransformService, RECENT_HISTORY_LIMIT};
pub use types::{
    ChatError, ChatResult, ConversationResponse, ConversationSummary, CreateConversationRequest,
    DeliveryPayload, MarkReadRequest, MessageListEntry, MessageResponse, SendMessageRequest,
    SenderSummary, TypingNotification,
};
