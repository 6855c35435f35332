//! In-process broker backed by one tokio broadcast channel per topic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::{BrokerClient, BrokerMessage, DeliveryError, Subscription};

pub struct InMemoryBroker {
    topics: RwLock<HashMap<String, broadcast::Sender<BrokerMessage>>>,
    capacity: usize,
}

impl InMemoryBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .await
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    async fn prune(&self, topic: &str) {
        let mut topics = self.topics.write().await;
        if topics
            .get(topic)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            topics.remove(topic);
            debug!(topic, "pruned idle topic");
        }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl BrokerClient for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), DeliveryError> {
        let sender = self.topics.read().await.get(topic).cloned();

        let Some(sender) = sender else {
            debug!(topic, "no subscribers, payload dropped");
            return Ok(());
        };

        let message = BrokerMessage {
            topic: topic.to_string(),
            payload,
        };

        match sender.send(message) {
            Ok(receivers) => debug!(topic, receivers, "payload published"),
            Err(_) => self.prune(topic).await,
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Subscription, DeliveryError> {
        let mut topics = self.topics.write().await;
        let sender = topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn every_subscriber_receives_each_payload() {
        let broker = InMemoryBroker::new(16);
        let mut first = broker.subscribe("topic.conversation.1").await.unwrap();
        let mut second = broker.subscribe("topic.conversation.1").await.unwrap();

        broker
            .publish("topic.conversation.1", "{\"id\":1}".to_string())
            .await
            .unwrap();

        for receiver in [&mut first, &mut second] {
            let message = timeout(Duration::from_millis(200), receiver.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(message.topic, "topic.conversation.1");
            assert_eq!(message.payload, "{\"id\":1}");
        }
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let broker = InMemoryBroker::new(16);
        let mut typing = broker.subscribe("topic.conversation.1.typing").await.unwrap();

        broker
            .publish("topic.conversation.1", "payload".to_string())
            .await
            .unwrap();

        assert!(timeout(Duration::from_millis(50), typing.recv()).await.is_err());
    }

    #[tokio::test]
    async fn publishing_without_subscribers_succeeds() {
        let broker = InMemoryBroker::default();
        broker
            .publish("topic.conversation.9", "lost".to_string())
            .await
            .unwrap();
        assert_eq!(broker.topic_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned_on_publish() {
        let broker = InMemoryBroker::new(4);
        let receiver = broker.subscribe("topic.conversation.2").await.unwrap();
        assert_eq!(broker.subscriber_count("topic.conversation.2").await, 1);

        drop(receiver);
        broker
            .publish("topic.conversation.2", "late".to_string())
            .await
            .unwrap();

        assert_eq!(broker.topic_count().await, 0);
    }
}
