use async_trait::async_trait;
use std::sync::Arc;

use super::{
    errors::WebhookError,
    event::WebhookEvent,
    ports::{EventDispatcher, WebhookEventHandler},
};

struct Listener {
    event_name: Option<String>,
    handler: Arc<dyn WebhookEventHandler>,
}

impl Listener {
    fn listens_to(&self, event_name: &str) -> bool {
        match &self.event_name {
            Some(name) => name == event_name,
            None => true,
        }
    }
}

/// Handlers keyed by event name, called in registration order.
/// The first failing handler stops the dispatch.
#[derive(Default)]
pub struct EventManager {
    listeners: Vec<Listener>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events named `event_name`,
    /// e.g. `Mailchimp.Webhook.unsubscribe`.
    pub fn on(mut self, event_name: impl Into<String>, handler: impl WebhookEventHandler) -> Self {
        self.listeners.push(Listener {
            event_name: Some(event_name.into()),
            handler: Arc::new(handler),
        });
        self
    }

    /// Registers `handler` for every event.
    pub fn on_any(mut self, handler: impl WebhookEventHandler) -> Self {
        self.listeners.push(Listener {
            event_name: None,
            handler: Arc::new(handler),
        });
        self
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[async_trait]
impl EventDispatcher for EventManager {
    async fn dispatch(&self, event: &WebhookEvent) -> Result<usize, WebhookError> {
        let mut handled = 0;
        for listener in self
            .listeners
            .iter()
            .filter(|listener| listener.listens_to(event.name()))
        {
            listener
                .handler
                .handle(event)
                .await
                .map_err(|source| WebhookError::HandlerFailed {
                    event: event.name().to_string(),
                    source,
                })?;
            handled += 1;
        }
        Ok(handled)
    }
}

#[async_trait]
impl<F> WebhookEventHandler for F
where
    F: Fn(&WebhookEvent) -> Result<(), anyhow::Error> + Send + Sync + 'static,
{
    async fn handle(&self, event: &WebhookEvent) -> Result<(), anyhow::Error> {
        self(event)
    }
}

/// Records every delivery in the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventHandler;

#[async_trait]
impl WebhookEventHandler for LogEventHandler {
    async fn handle(&self, event: &WebhookEvent) -> Result<(), anyhow::Error> {
        tracing::info!(
            event_name = %event.name(),
            fired_at = event.event_time().unwrap_or_default(),
            list_id = %event.list_id().unwrap_or_default(),
            member_id = %event.member_id().unwrap_or_default(),
            "Mailchimp webhook received"
        );
        Ok(())
    }
}
