//! Maps persisted messages onto the payload pushed to subscribers.

use courier_database::Message;

use crate::types::{ChatError, ChatResult, DeliveryPayload, SenderSummary};

#[derive(Debug, Clone, Copy, Default)]
pub struct TransformService;

impl TransformService {
    pub fn new() -> Self {
        Self
    }

    /// Build the delivery payload for `message`.
    ///
    /// Fails with [`ChatError::InvalidState`] when the message was loaded
    /// without its sender.
    pub fn to_delivery_payload(&self, message: &Message) -> ChatResult<DeliveryPayload> {
        let sender = message.sender.as_ref().ok_or_else(|| {
            ChatError::invalid_state(format!("message {} has no resolved sender", message.id))
        })?;

        Ok(DeliveryPayload {
            id: message.id,
            content: message.content.clone(),
            read: message.read,
            sent_at: message.sent_at,
            sender: SenderSummary::from(sender),
        })
    }
}
