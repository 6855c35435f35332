//! Business logic layer.

pub mod conversation_service;
pub mod message_service;
pub mod transform_service;

pub use conversation_service::ConversationService;
pub use message_service::{MessageService, RECENT_HISTORY_LIMIT};
pub use transform_service::TransformService;
