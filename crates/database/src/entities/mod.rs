//! Persisted entity definitions

pub mod conversation;
pub mod message;
pub mod user;

pub use conversation::Conversation;
pub use message::{Message, NewMessage};
pub use user::{Sender, User};
