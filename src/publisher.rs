//! Post-commit event publication

use async_trait::async_trait;
use thiserror::Error;
use crate::domain::events::OrderEvent;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("nats publish failed: {0}")]
    Nats(String),
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError>;
}

/// Drops every event. Used when no broker is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        tracing::debug!(order_id = event.order_id(), "no event broker configured, dropping event");
        Ok(())
    }
}

pub struct NatsPublisher {
    client: async_nats::Client,
    subject: String,
}

impl NatsPublisher {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self { client, subject: subject.into() }
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(event)?;
        self.client.publish(self.subject.clone(), payload.into()).await.map_err(|e| PublishError::Nats(e.to_string()))
    }
}

/// Keeps published events in memory.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: std::sync::Mutex<Vec<OrderEvent>>,
    fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self { Self { events: Default::default(), fail: true } }

    pub fn events(&self) -> Vec<OrderEvent> {
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &OrderEvent) -> Result<(), PublishError> {
        if self.fail { return Err(PublishError::Nats("broker unavailable".into())); }
        self.events.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(event.clone());
        Ok(())
    }
}
