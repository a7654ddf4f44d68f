use crate::domain::webhook::ports::WebhookService;
use crate::inbound::http::{payload::parse_payload, state::SharedWebhookState};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

/// Always answers 200 with `{"success": bool, "error": string|null}`;
/// the outcome lives in the body only.
#[tracing::instrument(
    name = "Processing a Mailchimp webhook",
    skip(request, body, state),
    fields(client_ip = tracing::field::Empty)
)]
pub async fn process_webhook<WS: WebhookService>(
    request: HttpRequest,
    body: web::Bytes,
    state: web::Data<SharedWebhookState<WS>>,
) -> HttpResponse {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let payload = parse_payload(content_type, &body);

    let client_ip = client_ip(&request, state.trust_proxy());
    if let Some(ip) = &client_ip {
        tracing::Span::current().record("client_ip", &tracing::field::display(ip));
    }

    let outcome = state.webhook_service().receive(payload, client_ip).await;
    HttpResponse::Ok().json(outcome)
}

/// The socket peer, unless the deployment sits behind a proxy it trusts to
/// report the original caller.
fn client_ip(request: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        request
            .connection_info()
            .realip_remote_addr()
            .map(|ip| ip.to_string())
    } else {
        request.peer_addr().map(|addr| addr.ip().to_string())
    }
}

/// Mailchimp probes the URL with a GET when the webhook is registered.
pub async fn verify_webhook() -> HttpResponse {
    HttpResponse::Ok().finish()
}
