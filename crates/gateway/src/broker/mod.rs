//! Publish/subscribe broker abstraction.
//!
//! Delivery code only talks to [`BrokerClient`]; the in-process and Redis
//! implementations are interchangeable and selected from configuration.

mod memory;
mod redis_pubsub;

use std::sync::Arc;

use async_trait::async_trait;
use courier_config::{BrokerConfig, BrokerKind};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub use self::memory::InMemoryBroker;
pub use self::redis_pubsub::RedisBroker;

/// A payload as seen by subscribers, tagged with the topic it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub topic: String,
    pub payload: String,
}

pub type Subscription = broadcast::Receiver<BrokerMessage>;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode payload for {topic}: {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("broker unavailable: {0}")]
    Unavailable(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl DeliveryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encode { .. } => "encode",
            Self::Unavailable(_) => "unavailable",
            Self::Redis(_) => "redis",
        }
    }
}

#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Deliver `payload` to every current subscriber of `topic`.
    ///
    /// Publishing to a topic nobody listens to succeeds and drops the payload.
    async fn publish(&self, topic: &str, payload: String) -> Result<(), DeliveryError>;

    async fn subscribe(&self, topic: &str) -> Result<Subscription, DeliveryError>;

    fn name(&self) -> &'static str;
}

/// Build the configured broker. An unreachable Redis falls back to the
/// in-process broker so a single node keeps working.
pub async fn connect(config: &BrokerConfig) -> Arc<dyn BrokerClient> {
    match config.kind {
        BrokerKind::Memory => Arc::new(InMemoryBroker::new(config.channel_capacity)),
        BrokerKind::Redis => {
            match RedisBroker::connect(&config.redis_url, config.channel_capacity).await {
                Ok(broker) => {
                    info!(url = %config.redis_url, "redis broker connected");
                    Arc::new(broker)
                }
                Err(error) => {
                    warn!(
                        url = %config.redis_url,
                        %error,
                        "failed to connect to redis, falling back to in-process broker"
                    );
                    Arc::new(InMemoryBroker::new(config.channel_capacity))
                }
            }
        }
    }
}
