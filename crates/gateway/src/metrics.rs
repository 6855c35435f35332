//! Delivery counters exposed in the Prometheus text format.

use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};

/// Which ingress path produced a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    Http,
    PubSub,
}

impl DeliveryPath {
    pub fn label(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::PubSub => "pubsub",
        }
    }
}

/// Counters live in their own registry so several gateways (tests, embedded
/// servers) can coexist in one process.
pub struct DeliveryMetrics {
    registry: Registry,
    published: IntCounterVec,
    delivery_failures: IntCounterVec,
    ingress_failures: IntCounterVec,
}

impl DeliveryMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let published = IntCounterVec::new(
            opts!(
                "courier_payloads_published_total",
                "Payloads handed to the broker"
            ),
            &["topic_kind"],
        )?;
        let delivery_failures = IntCounterVec::new(
            opts!(
                "courier_delivery_failures_total",
                "Payloads that could not be built or published"
            ),
            &["path", "topic_kind", "reason"],
        )?;
        let ingress_failures = IntCounterVec::new(
            opts!(
                "courier_ingress_failures_total",
                "Pub/sub frames that failed before anything was published"
            ),
            &["destination", "reason"],
        )?;

        registry.register(Box::new(published.clone()))?;
        registry.register(Box::new(delivery_failures.clone()))?;
        registry.register(Box::new(ingress_failures.clone()))?;

        Ok(Self {
            registry,
            published,
            delivery_failures,
            ingress_failures,
        })
    }

    pub fn record_published(&self, topic_kind: &str) {
        self.published.with_label_values(&[topic_kind]).inc();
    }

    pub fn record_delivery_failure(&self, path: DeliveryPath, topic_kind: &str, reason: &str) {
        self.delivery_failures
            .with_label_values(&[path.label(), topic_kind, reason])
            .inc();
    }

    pub fn record_ingress_failure(&self, destination: &str, reason: &str) {
        self.ingress_failures
            .with_label_values(&[destination, reason])
            .inc();
    }

    pub fn published_total(&self, topic_kind: &str) -> u64 {
        self.published.with_label_values(&[topic_kind]).get()
    }

    pub fn delivery_failures_total(&self, path: DeliveryPath, topic_kind: &str, reason: &str) -> u64 {
        self.delivery_failures
            .with_label_values(&[path.label(), topic_kind, reason])
            .get()
    }

    pub fn ingress_failures_total(&self, destination: &str, reason: &str) -> u64 {
        self.ingress_failures
            .with_label_values(&[destination, reason])
            .get()
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
