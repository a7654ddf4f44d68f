use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

use super::{
    errors::WebhookError,
    event::WebhookEvent,
    ports::{EventDispatcher, RawRequestRecord, RawRequestStore, WebhookService},
};

/// Body returned to Mailchimp for every delivery.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WebhookOutcome {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct WebhookReceiver<D, S>
where
    D: EventDispatcher,
    S: RawRequestStore,
{
    pub dispatcher: Arc<D>,
    pub store: Arc<S>,
}

impl<D, S> WebhookReceiver<D, S>
where
    D: EventDispatcher,
    S: RawRequestStore,
{
    pub fn new(dispatcher: D, store: S) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(store),
        }
    }
}

#[async_trait]
impl<D, S> WebhookService for WebhookReceiver<D, S>
where
    D: EventDispatcher,
    S: RawRequestStore,
{
    #[tracing::instrument(
        name = "Receiving a Mailchimp webhook",
        skip(self, payload),
        fields(event_name = tracing::field::Empty)
    )]
    async fn receive(&self, payload: Value, client_ip: Option<String>) -> WebhookOutcome {
        let event = WebhookEvent::from_payload(&payload);
        tracing::Span::current().record("event_name", &tracing::field::display(event.name()));

        // Detached from the caller: dropping this future (client gone,
        // timeout) does not stop the request from being recorded.
        let dispatcher = Arc::clone(&self.dispatcher);
        let store = Arc::clone(&self.store);
        let delivery = tokio::spawn(
            async move {
                deliver(dispatcher.as_ref(), store.as_ref(), event, payload, client_ip).await
            }
            .instrument(tracing::Span::current()),
        );

        match delivery.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Webhook delivery task failed");
                WebhookOutcome {
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Dispatches the event, then stores the raw request whatever the dispatch
/// outcome.
async fn deliver<D, S>(
    dispatcher: &D,
    store: &S,
    event: WebhookEvent,
    payload: Value,
    client_ip: Option<String>,
) -> WebhookOutcome
where
    D: EventDispatcher,
    S: RawRequestStore,
{
    let dispatched = dispatch(dispatcher, &event).await;

    let record = RawRequestRecord {
        data: payload,
        ip: client_ip,
    };
    let persisted = store.persist(&record).await;

    let mut error = None;
    let mut success = true;

    match dispatched {
        Ok(handled) => tracing::debug!(handled, "Webhook event dispatched"),
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Webhook event handling failed");
            success = false;
            error = Some(handler_message(e));
        }
    }

    match persisted {
        Ok(written) if written > 0 => {}
        Ok(_) => {
            tracing::error!("Webhook request record is empty");
            success = false;
            error.get_or_insert_with(|| "Failed to persist the webhook request".to_string());
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to persist the webhook request");
            success = false;
            error.get_or_insert_with(|| e.to_string());
        }
    }

    WebhookOutcome { success, error }
}

/// Dispatch outcome, with a panicking handler reported like a failing one.
async fn dispatch<D: EventDispatcher>(
    dispatcher: &D,
    event: &WebhookEvent,
) -> Result<usize, WebhookError> {
    AssertUnwindSafe(dispatcher.dispatch(event))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(WebhookError::HandlerPanicked {
                event: event.name().to_string(),
                message: panic_message(panic),
            })
        })
}

/// The handler's own message, without the dispatch context.
fn handler_message(error: WebhookError) -> String {
    match error {
        WebhookError::HandlerFailed { source, .. } => source.to_string(),
        WebhookError::HandlerPanicked { message, .. } => message,
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Webhook handler panicked".to_string()
    }
}
