use mailchimp_integration::configuration::get_configuration;
use mailchimp_integration::domain::webhook::dispatcher::EventManager;
use mailchimp_integration::domain::webhook::event::WebhookEvent;
use mailchimp_integration::domain::webhook::service::WebhookReceiver;
use mailchimp_integration::inbound::http::Application;
use mailchimp_integration::outbound::storage::file_store::FileRequestStore;
use mailchimp_integration::outbound::telemetry::init_logger;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

static TRACING: Lazy<()> = Lazy::new(|| {
    let c = get_configuration().expect("Failed to read configuration");
    let default_filter_level = c.general.log_level;
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        init_logger(&subscriber_name, &default_filter_level, std::io::stdout);
    } else {
        init_logger(&subscriber_name, &default_filter_level, std::io::sink);
    }
});

pub struct TestApp {
    pub address: String,
    pub base_path: String,
    pub storage_dir: TempDir,
    pub handled_events: Arc<Mutex<Vec<WebhookEvent>>>,
}

impl TestApp {
    fn webhook_url(&self) -> String {
        format!("{}{}/webhook", self.address, self.base_path)
    }

    pub async fn post_webhook_form(&self, body: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(&self.webhook_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_webhook_form_forwarded_for(
        &self,
        body: &str,
        forwarded_for: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(&self.webhook_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("X-Forwarded-For", forwarded_for)
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_webhook_json(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(&self.webhook_url())
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_webhook(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(&self.webhook_url())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Raw request records written so far, oldest file name first.
    pub fn stored_records(&self) -> Vec<serde_json::Value> {
        let mut paths: Vec<_> = std::fs::read_dir(self.storage_dir.path())
            .expect("Failed to read the storage directory")
            .map(|entry| entry.unwrap().path())
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|path| {
                let contents = std::fs::read_to_string(path).unwrap();
                serde_json::from_str(&contents).unwrap()
            })
            .collect()
    }

    pub fn handled_event_names(&self) -> Vec<String> {
        self.handled_events
            .lock()
            .unwrap()
            .iter()
            .map(|event| event.name().to_string())
            .collect()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(EventManager::new()).await
}

pub async fn spawn_app_with(event_manager: EventManager) -> TestApp {
    spawn(event_manager, false).await
}

/// Server configured to take the client address from proxy headers.
pub async fn spawn_app_behind_proxy() -> TestApp {
    spawn(EventManager::new(), true).await
}

/// Starts the server with `event_manager` plus a handler recording every
/// event it sees.
async fn spawn(event_manager: EventManager, trust_proxy: bool) -> TestApp {
    Lazy::force(&TRACING);

    let storage_dir = tempfile::tempdir().expect("Failed to create a storage directory");
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.application.port = 0;
        c.application.host = "127.0.0.1".into();
        c.application.storage_dir = Some(storage_dir.path().to_path_buf());
        c.application.trust_proxy = trust_proxy;
        c
    };

    let handled_events = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&handled_events);
    let event_manager = event_manager.on_any(
        move |event: &WebhookEvent| -> Result<(), anyhow::Error> {
            recorder.lock().unwrap().push(event.clone());
            Ok(())
        },
    );

    let request_store = FileRequestStore::new(configuration.application.storage_dir());
    let webhook_service = WebhookReceiver::new(event_manager, request_store);
    let base_path = configuration.application.base_path.clone();

    let application = Application::build(webhook_service, configuration.application)
        .await
        .expect("Failed to build application");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        base_path,
        storage_dir,
        handled_events,
    }
}
