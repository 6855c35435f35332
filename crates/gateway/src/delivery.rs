//! Delivery gateway: funnels both ingress paths through the message service
//! and fans results out to conversation topics.
//!
//! Publishing is best-effort. Once a message is persisted, transform or
//! broker failures are logged and counted but never reported to the caller.

use std::sync::Arc;

use courier_chats::{
    ChatResult, MarkReadRequest, MessageService, SendMessageRequest, TransformService,
    TypingNotification,
};
use courier_database::Message;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::broker::{BrokerClient, DeliveryError};
use crate::metrics::{DeliveryMetrics, DeliveryPath};
use crate::topics::{ConversationTopic, InboundDestination, UnknownTopic};

/// Problems with an inbound frame itself, as opposed to the work it asked for.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error(transparent)]
    UnknownDestination(#[from] UnknownTopic),

    #[error("invalid body for {destination}: {source}")]
    InvalidBody {
        destination: InboundDestination,
        #[source]
        source: serde_json::Error,
    },
}

pub struct DeliveryGateway {
    messages: Arc<MessageService>,
    transform: TransformService,
    broker: Arc<dyn BrokerClient>,
    metrics: Arc<DeliveryMetrics>,
}

impl DeliveryGateway {
    pub fn new(
        messages: Arc<MessageService>,
        transform: TransformService,
        broker: Arc<dyn BrokerClient>,
        metrics: Arc<DeliveryMetrics>,
    ) -> Self {
        Self {
            messages,
            transform,
            broker,
            metrics,
        }
    }

    /// HTTP ingress: persist, then publish the delivery payload.
    ///
    /// Only persistence errors reach the caller.
    pub async fn send_and_broadcast(&self, request: SendMessageRequest) -> ChatResult<Message> {
        let message = self
            .messages
            .send_message(request.conversation_id, request.sender_id, request.content)
            .await?;

        self.broadcast_message(&message, DeliveryPath::Http).await;
        Ok(message)
    }

    /// Pub/sub ingress for `app.sendMessage`. Nothing is returned to the sender.
    pub async fn handle_send(&self, request: SendMessageRequest) {
        let conversation_id = request.conversation_id;
        match self
            .messages
            .send_message(conversation_id, request.sender_id, request.content)
            .await
        {
            Ok(message) => self.broadcast_message(&message, DeliveryPath::PubSub).await,
            Err(error) => {
                warn!(
                    conversation_id,
                    sender_id = request.sender_id,
                    %error,
                    "pub/sub send rejected"
                );
                self.metrics
                    .record_ingress_failure(InboundDestination::SendMessage.as_str(), error.kind());
            }
        }
    }

    /// Relay a typing notification. Nothing is persisted.
    pub async fn handle_typing(&self, notification: TypingNotification) {
        let topic = ConversationTopic::typing(notification.conversation_id);
        self.publish_json(topic, &notification.user_id, DeliveryPath::PubSub)
            .await;
    }

    /// Pub/sub ingress for `app.markRead`.
    pub async fn handle_mark_read(&self, request: MarkReadRequest) {
        if let Err(error) = self.mark_read_and_notify(request, DeliveryPath::PubSub).await {
            warn!(%error, "pub/sub mark read rejected");
            self.metrics
                .record_ingress_failure(InboundDestination::MarkRead.as_str(), error.kind());
        }
    }

    /// Mark messages read, then publish the reader id as a read receipt.
    pub async fn mark_read_and_notify(
        &self,
        request: MarkReadRequest,
        path: DeliveryPath,
    ) -> ChatResult<u64> {
        let updated = self
            .messages
            .mark_read(request.conversation_id, request.user_id)
            .await?;

        let topic = ConversationTopic::read_receipts(request.conversation_id);
        self.publish_json(topic, &request.user_id, path).await;
        Ok(updated)
    }

    /// Route a client frame to its handler.
    ///
    /// Returns an error only when the frame cannot be routed or decoded;
    /// failures of the routed operation are handled inside the handler.
    pub async fn dispatch(&self, destination: &str, body: Value) -> Result<(), InboundError> {
        let destination = match destination.parse::<InboundDestination>() {
            Ok(destination) => destination,
            Err(error) => {
                warn!(destination, "frame for unknown destination");
                self.metrics
                    .record_ingress_failure("unknown", "unknown_destination");
                return Err(error.into());
            }
        };

        debug!(%destination, "dispatching inbound frame");

        let result = match destination {
            InboundDestination::SendMessage => match serde_json::from_value(body) {
                Ok(request) => {
                    self.handle_send(request).await;
                    Ok(())
                }
                Err(source) => Err(source),
            },
            InboundDestination::Typing => match serde_json::from_value(body) {
                Ok(notification) => {
                    self.handle_typing(notification).await;
                    Ok(())
                }
                Err(source) => Err(source),
            },
            InboundDestination::MarkRead => match serde_json::from_value(body) {
                Ok(request) => {
                    self.handle_mark_read(request).await;
                    Ok(())
                }
                Err(source) => Err(source),
            },
        };

        result.map_err(|source| {
            warn!(%destination, error = %source, "frame body could not be decoded");
            self.metrics
                .record_ingress_failure(destination.as_str(), "invalid_body");
            InboundError::InvalidBody {
                destination,
                source,
            }
        })
    }

    async fn broadcast_message(&self, message: &Message, path: DeliveryPath) {
        let topic = ConversationTopic::messages(message.conversation_id);

        let payload = match self.transform.to_delivery_payload(message) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    message_id = message.id,
                    %topic,
                    %error,
                    "message persisted but could not be transformed"
                );
                self.metrics
                    .record_delivery_failure(path, topic.kind.label(), error.kind());
                return;
            }
        };

        self.publish_json(topic, &payload, path).await;
    }

    async fn publish_json<T: Serialize + ?Sized>(
        &self,
        topic: ConversationTopic,
        value: &T,
        path: DeliveryPath,
    ) {
        let name = topic.to_string();
        let result = match serde_json::to_string(value) {
            Ok(payload) => self.broker.publish(&name, payload).await,
            Err(source) => Err(DeliveryError::Encode {
                topic: name.clone(),
                source,
            }),
        };

        match result {
            Ok(()) => {
                debug!(topic = %name, path = path.label(), "payload published");
                self.metrics.record_published(topic.kind.label());
            }
            Err(error) => {
                warn!(
                    topic = %name,
                    path = path.label(),
                    broker = self.broker.name(),
                    %error,
                    "failed to publish payload"
                );
                self.metrics
                    .record_delivery_failure(path, topic.kind.label(), error.kind());
            }
        }
    }
}
