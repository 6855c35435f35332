//! Shared application state for the gateway.
//!
//! Every collaborator is passed in explicitly; nothing is looked up from
//! globals at request time.

use std::sync::Arc;

use anyhow::Context;
use courier_chats::{ConversationService, MessageService, TransformService};
use courier_config::{AppConfig, CorsConfig};
use courier_database::{ConversationRepository, MessageRepository, UserRepository};
use sqlx::SqlitePool;

use crate::broker::BrokerClient;
use crate::delivery::DeliveryGateway;
use crate::metrics::DeliveryMetrics;

#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<MessageService>,
    pub conversations: Arc<ConversationService>,
    pub delivery: Arc<DeliveryGateway>,
    pub broker: Arc<dyn BrokerClient>,
    pub metrics: Arc<DeliveryMetrics>,
    pub cors: CorsConfig,
}

impl AppState {
    pub fn new(
        messages: Arc<MessageService>,
        conversations: Arc<ConversationService>,
        broker: Arc<dyn BrokerClient>,
        metrics: Arc<DeliveryMetrics>,
        cors: CorsConfig,
    ) -> Self {
        let delivery = Arc::new(DeliveryGateway::new(
            messages.clone(),
            TransformService::new(),
            broker.clone(),
            metrics.clone(),
        ));

        Self {
            messages,
            conversations,
            delivery,
            broker,
            metrics,
            cors,
        }
    }

    /// Wire the SQLite repositories behind the chat services.
    pub fn from_pool(
        pool: SqlitePool,
        broker: Arc<dyn BrokerClient>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let message_store = Arc::new(MessageRepository::new(pool.clone()));
        let conversation_store = Arc::new(ConversationRepository::new(pool.clone()));
        let users = Arc::new(UserRepository::new(pool));

        let messages = Arc::new(MessageService::new(
            message_store.clone(),
            conversation_store.clone(),
            users.clone(),
            config.messages.clone(),
        ));
        let conversations = Arc::new(ConversationService::new(
            conversation_store,
            message_store,
            users,
        ));
        let metrics =
            Arc::new(DeliveryMetrics::new().context("failed to register delivery metrics")?);

        Ok(Self::new(
            messages,
            conversations,
            broker,
            metrics,
            config.cors.clone(),
        ))
    }
}
