use async_trait::async_trait;
use serde_json::Value;

use super::{
    errors::{RawRequestStoreError, WebhookError},
    event::WebhookEvent,
    service::WebhookOutcome,
};

#[async_trait]
/// Reacts to one kind of webhook event
pub trait WebhookEventHandler: Send + Sync + 'static {
    async fn handle(&self, event: &WebhookEvent) -> Result<(), anyhow::Error>;
}

#[async_trait]
pub trait EventDispatcher: Send + Sync + 'static {
    /// Runs the handlers registered for the event's name and returns how many
    /// of them ran.
    async fn dispatch(&self, event: &WebhookEvent) -> Result<usize, WebhookError>;
}

/// What gets written for every inbound delivery.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RawRequestRecord {
    pub data: Value,
    pub ip: Option<String>,
}

#[async_trait]
/// Durable sink for raw webhook requests
pub trait RawRequestStore: Send + Sync + 'static {
    /// Stores the record and returns the number of bytes written.
    async fn persist(&self, record: &RawRequestRecord) -> Result<usize, RawRequestStoreError>;
}

#[async_trait]
pub trait WebhookService: Send + Sync + 'static {
    async fn receive(&self, payload: Value, client_ip: Option<String>) -> WebhookOutcome;
}
