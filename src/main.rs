use mailchimp_integration::configuration::get_configuration;
use mailchimp_integration::domain::webhook::dispatcher::{EventManager, LogEventHandler};
use mailchimp_integration::domain::webhook::service::WebhookReceiver;
use mailchimp_integration::inbound::http::Application;
use mailchimp_integration::outbound::storage::file_store::FileRequestStore;
use mailchimp_integration::outbound::telemetry::init_logger;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let configuration = get_configuration().expect("Failed to read configuration");
    init_logger(
        "mailchimp_integration",
        &configuration.log_level(),
        std::io::stdout,
    );

    // The API key is mandatory even though the receiver itself never calls out.
    configuration
        .mailchimp
        .client_config()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let event_manager = EventManager::new().on_any(LogEventHandler);
    let request_store = FileRequestStore::new(configuration.application.storage_dir());
    let webhook_service = WebhookReceiver::new(event_manager, request_store);
    let application = Application::build(webhook_service, configuration.application).await?;

    application.run_until_stopped().await?;
    Ok(())
}
