use crate::domain::webhook::ports::WebhookService;
use std::sync::Arc;

#[derive(Debug)]
pub struct WebhookState<WS: WebhookService> {
    webhook_service: WS,
    trust_proxy: bool,
}

#[derive(Debug)]
pub struct SharedWebhookState<WS: WebhookService>(Arc<WebhookState<WS>>);

impl<WS: WebhookService> SharedWebhookState<WS> {
    pub fn new(webhook_service: WS, trust_proxy: bool) -> Self {
        Self(Arc::new(WebhookState {
            webhook_service,
            trust_proxy,
        }))
    }

    pub fn webhook_service(&self) -> &WS {
        &self.0.webhook_service
    }

    /// Whether `Forwarded`/`X-Forwarded-For` may name the client.
    pub fn trust_proxy(&self) -> bool {
        self.0.trust_proxy
    }
}

impl<WS: WebhookService> Clone for SharedWebhookState<WS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
