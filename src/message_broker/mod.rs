// region:    --- Imports
use crate::project::events::ProjectEvent;
use async_trait::async_trait;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

// endregion: --- Imports

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
}

impl KafkaProducer {
    pub fn new(brokers: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
        })
    }

    pub async fn send_message(&self, topic: &str, key: &str, value: &str) -> Result<(), BrokerError> {
        info!(
            "{:<12} --> Kafka message: topic={}, key={}",
            "Producer", topic, key
        );
        let record = FutureRecord::to(topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| BrokerError::Kafka(e))?;

        Ok(())
    }
}

// endregion: --- Kafka Producer

// region:    --- Notifier
/// Delivers project lifecycle notifications to whoever emails the parties.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &ProjectEvent) -> Result<(), BrokerError>;
}

/// Publishes events to a Kafka topic, keyed by project id.
pub struct KafkaNotifier {
    producer: KafkaProducer,
    topic: String,
}

impl KafkaNotifier {
    pub fn new(producer: KafkaProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Notifier for KafkaNotifier {
    async fn notify(&self, event: &ProjectEvent) -> Result<(), BrokerError> {
        let payload = serde_json::to_string(event)?;
        self.producer
            .send_message(&self.topic, &event.project_id().to_string(), &payload)
            .await
    }
}

/// Development notifier that only writes the event to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &ProjectEvent) -> Result<(), BrokerError> {
        info!("{:<12} --> {} {:?}", "Notify", event.kind(), event);
        Ok(())
    }
}

/// Fire and forget. A failed notification is logged and never reaches the
/// request that triggered it.
pub fn notify_in_background(notifier: Arc<dyn Notifier>, event: ProjectEvent) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&event).await {
            error!(
                "{:<12} --> {} for project {} failed: {}",
                "Notify",
                event.kind(),
                event.project_id(),
                e
            );
        }
    });
}

// endregion: --- Notifier
