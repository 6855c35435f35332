//! Redis pub/sub broker for multi-node deployments.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{BrokerClient, BrokerMessage, DeliveryError, Subscription};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

pub struct RedisBroker {
    client: redis::Client,
    publisher: ConnectionManager,
    capacity: usize,
}

impl RedisBroker {
    pub async fn connect(url: &str, capacity: usize) -> Result<Self, DeliveryError> {
        let client = redis::Client::open(url)?;

        let publisher = timeout(
            CONNECT_TIMEOUT,
            ConnectionManager::new_with_backoff(client.clone(), 2, 100, 1),
        )
        .await
        .map_err(|_| DeliveryError::Unavailable(format!("timed out connecting to {url}")))??;

        Ok(Self {
            client,
            publisher,
            capacity: capacity.max(1),
        })
    }
}

#[async_trait]
impl BrokerClient for RedisBroker {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), DeliveryError> {
        let mut connection = self.publisher.clone();
        let receivers: i64 = connection.publish(topic, payload).await?;
        debug!(topic, receivers, "payload published to redis");
        Ok(())
    }

    /// Each subscription holds its own pub/sub connection. The forwarding task
    /// ends when the stream closes or every local receiver has been dropped.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, DeliveryError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;

        let (sender, receiver) = broadcast::channel(self.capacity);
        let topic = topic.to_string();

        tokio::spawn(async move {
            let mut messages = Box::pin(pubsub.into_on_message());
            let mut idle_check = tokio::time::interval(IDLE_CHECK_INTERVAL);

            loop {
                tokio::select! {
                    message = messages.next() => {
                        let Some(message) = message else {
                            debug!(%topic, "redis subscription stream closed");
                            break;
                        };
                        let payload: String = match message.get_payload() {
                            Ok(payload) => payload,
                            Err(error) => {
                                warn!(%topic, %error, "dropping undecodable redis payload");
                                continue;
                            }
                        };
                        let forwarded = BrokerMessage {
                            topic: message.get_channel_name().to_string(),
                            payload,
                        };
                        if sender.send(forwarded).is_err() {
                            break;
                        }
                    }
                    _ = idle_check.tick() => {
                        if sender.receiver_count() == 0 {
                            break;
                        }
                    }
                }
            }
        });

        Ok(receiver)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_reports_unreachable_server() {
        let result = RedisBroker::connect("redis://127.0.0.1:1", 8).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let result = RedisBroker::connect("not a redis url", 8).await;
        assert!(matches!(result, Err(DeliveryError::Redis(_))));
    }
}
