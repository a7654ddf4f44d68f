use crate::configuration::ApplicationSettings;
use crate::domain::webhook::ports::WebhookService;
use crate::inbound::http::handlers::{health_check, process_webhook, verify_webhook};
use crate::inbound::http::state::SharedWebhookState;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

mod handlers;
mod payload;
pub mod state;

pub struct Application {
    port: u16,
    server: Server,
}

fn run<WS: WebhookService>(
    listener: TcpListener,
    base_path: String,
    webhook_state: SharedWebhookState<WS>,
) -> Result<Server, std::io::Error> {
    let webhook_state = web::Data::new(webhook_state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope(&base_path)
                    .app_data(webhook_state.clone())
                    .route("/webhook", web::post().to(process_webhook::<WS>))
                    .route("/webhook", web::get().to(verify_webhook)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

impl Application {
    pub async fn build<WS: WebhookService>(
        webhook_service: WS,
        configuration: ApplicationSettings,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let webhook_state = SharedWebhookState::new(webhook_service, configuration.trust_proxy);
        let base_path = normalize_base_path(&configuration.base_path);

        let server = run(listener, base_path, webhook_state)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// `mailchimp/` and `/mailchimp` both mount under `/mailchimp`.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
